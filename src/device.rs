//! Thin ADXL345 register driver used by the validation stages.

use crate::axis::AxisReading;
use crate::interface::i2c::{Address, I2cInterface};
use crate::interface::spi::SpiInterface;
use crate::interface::Adxl345Interface;
use crate::registers::{DataFormat, Register, RegisterAccess, REG_DATAX0, REG_DEVID};
use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;

// Number of consecutive bytes spanning X, Y, Z axis samples.
const RAW_AXIS_BYTES: usize = 6;

/// Synchronous register-level driver for the ADXL345 accelerometer.
pub struct Adxl345<IFACE> {
    interface: IFACE,
}

impl<IFACE> Adxl345<IFACE> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver instance from the provided bus interface.
    pub fn new(interface: IFACE) -> Self {
        Self { interface }
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> IFACE {
        self.interface
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }
}

impl<SPI> Adxl345<SpiInterface<SPI>>
where
    SPI: SpiDevice,
{
    /// Convenience constructor for SPI transports.
    pub fn new_spi(spi: SPI) -> Self {
        Self::new(SpiInterface::new(spi))
    }

    /// Releases the driver, returning the SPI device.
    pub fn release_spi(self) -> SPI {
        self.release().release()
    }
}

impl<I2C> Adxl345<I2cInterface<I2C>>
where
    I2C: I2c,
{
    /// Convenience constructor for I2C transports.
    pub fn new_i2c(i2c: I2C, address: Address) -> Self {
        Self::new(I2cInterface::new(i2c, address))
    }

    /// Releases the driver, returning the I2C bus.
    pub fn release_i2c(self) -> I2C {
        self.release().release()
    }
}

impl<IFACE> Adxl345<IFACE>
where
    IFACE: Adxl345Interface,
{
    // ==================================================================
    // == Identification =================================================
    // ==================================================================
    /// Reads the fixed `DEVID` register.
    pub fn device_id(&mut self) -> Result<u8, IFACE::Error> {
        self.interface.read_register(REG_DEVID)
    }

    // ==================================================================
    // == Typed Register Access ==========================================
    // ==================================================================
    /// Reads and decodes register `R`.
    pub fn read<R: Register>(&mut self) -> Result<R, IFACE::Error> {
        debug_assert!(R::ACCESS != RegisterAccess::WriteOnly);
        self.interface.read_register(R::ADDRESS).map(R::from)
    }

    /// Writes register `R` unconditionally.
    pub fn write<R: Register>(&mut self, value: R) -> Result<(), IFACE::Error> {
        debug_assert!(R::ACCESS != RegisterAccess::ReadOnly);
        self.interface.write_register(R::ADDRESS, value.into())
    }

    /// Read-modify-write of register `R`; the write is skipped when nothing changed.
    pub fn update<R, F>(&mut self, mut mutate: F) -> Result<R, IFACE::Error>
    where
        R: Register,
        F: FnMut(&mut R),
    {
        let current = self.interface.read_register(R::ADDRESS)?;

        let mut value = R::from(current);
        mutate(&mut value);

        let updated: u8 = value.into();
        if updated != current {
            self.interface.write_register(R::ADDRESS, updated)?;
        }

        Ok(value)
    }

    // ==================================================================
    // == Self-Test ======================================================
    // ==================================================================
    /// Applies or removes the electrostatic self-test force (`DATA_FORMAT.SELF_TEST`).
    pub fn set_self_test(&mut self, enable: bool) -> Result<(), IFACE::Error> {
        self.update::<DataFormat, _>(|format| format.set_self_test(enable))?;
        Ok(())
    }

    // ==================================================================
    // == Data Acquisition ===============================================
    // ==================================================================
    /// Reads one acceleration triplet from `DATAX0..DATAZ1`.
    ///
    /// A single burst read keeps the three axes from the same conversion.
    pub fn read_axes(&mut self) -> Result<AxisReading, IFACE::Error> {
        let mut raw = [0u8; RAW_AXIS_BYTES];
        self.interface.read_many(REG_DATAX0, &mut raw)?;
        Ok(AxisReading::from_le_bytes(raw))
    }
}
