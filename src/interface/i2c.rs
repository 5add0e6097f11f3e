//! I2C interface implementation built on top of `embedded-hal` `I2c`.

use embedded_hal::i2c::{I2c, Operation};

use super::Adxl345Interface;

/// 7-bit bus address selected by the `ALT ADDRESS` pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
    /// `ALT ADDRESS` tied low (`0x53`). The fixture wiring default.
    #[default]
    AltLow,
    /// `ALT ADDRESS` tied high (`0x1D`).
    AltHigh,
}

impl From<Address> for u8 {
    fn from(address: Address) -> Self {
        match address {
            Address::AltLow => 0x53,
            Address::AltHigh => 0x1D,
        }
    }
}

/// I2C-based interface implementation for the ADXL345 driver.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Creates a new interface talking to the device at `address`.
    pub fn new(i2c: I2C, address: Address) -> Self {
        Self {
            i2c,
            address: address.into(),
        }
    }

    /// Returns the 7-bit device address in use.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Provides mutable access to the wrapped I2C bus.
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the interface and returns the owned I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Adxl345Interface for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error> {
        let mut value = [0u8; 1];
        self.read_many(register, &mut value)?;
        Ok(value[0])
    }

    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        if buf.is_empty() {
            return Ok(());
        }

        self.i2c.write_read(self.address, &[register], buf)
    }

    fn write_many(&mut self, register: u8, data: &[u8]) -> core::result::Result<(), Self::Error> {
        if data.is_empty() {
            return Ok(());
        }

        // Adjacent writes are sent without a repeated start.
        let command = [register];
        let mut operations = [Operation::Write(&command), Operation::Write(data)];
        self.i2c.transaction(self.address, &mut operations)
    }
}
