//! Register map definitions for the ADXL345 accelerometer.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{DataRate, Range, Resolution};

/// Register address of `DEVID`.
pub const REG_DEVID: u8 = 0x00;
/// Register address of `BW_RATE`.
pub const REG_BW_RATE: u8 = 0x2C;
/// Register address of `POWER_CTL`.
pub const REG_POWER_CTL: u8 = 0x2D;
/// Register address of `DATA_FORMAT`.
pub const REG_DATA_FORMAT: u8 = 0x31;
/// Register address of `DATAX0`.
pub const REG_DATAX0: u8 = 0x32;
/// Register address of `DATAX1`.
pub const REG_DATAX1: u8 = 0x33;
/// Register address of `DATAY0`.
pub const REG_DATAY0: u8 = 0x34;
/// Register address of `DATAY1`.
pub const REG_DATAY1: u8 = 0x35;
/// Register address of `DATAZ0`.
pub const REG_DATAZ0: u8 = 0x36;
/// Register address of `DATAZ1`.
pub const REG_DATAZ1: u8 = 0x37;

/// Fixed device ID reported by `DEVID`.
pub const EXPECTED_DEVID: u8 = 0xE5;

/// Access permissions encoded for each register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAccess {
    /// Read-only register.
    ReadOnly,
    /// Write-only register.
    WriteOnly,
    /// Read/write register.
    ReadWrite,
}

/// Minimal metadata exposed by every register value type.
pub trait Register: Copy + From<u8> + Into<u8> {
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
    /// Access permission classification.
    const ACCESS: RegisterAccess;
    /// Reset value defined by the datasheet.
    const RESET_VALUE: u8;
    /// Datasheet mnemonic, used in diagnostics.
    const NAME: &'static str;
}

/// Returns the datasheet mnemonic for a register address, if it is one we model.
pub const fn register_name(address: u8) -> &'static str {
    match address {
        REG_DEVID => "DEVID",
        REG_BW_RATE => BwRate::NAME,
        REG_POWER_CTL => PowerControl::NAME,
        REG_DATA_FORMAT => DataFormat::NAME,
        REG_DATAX0..=REG_DATAZ1 => "DATA",
        _ => "UNKNOWN",
    }
}

/// Bitfield representation of the `BW_RATE` register (address `0x2C`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BwRate {
    // Output data rate code (bits 3:0).
    pub rate: DataRate,
    // Reduced power operation (bit 4).
    pub low_power: bool,
    #[skip]
    __: B3,
}

impl From<u8> for BwRate {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<BwRate> for u8 {
    fn from(value: BwRate) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `POWER_CTL` register (address `0x2D`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerControl {
    // Sleep-mode reading frequency (bits 1:0).
    pub wakeup: B2,
    // Sleep mode enable (bit 2).
    pub sleep: bool,
    // Measurement mode enable (bit 3).
    pub measure: bool,
    // Auto-sleep enable (bit 4).
    pub auto_sleep: bool,
    // Link activity and inactivity detection (bit 5).
    pub link: bool,
    #[skip]
    __: B2,
}

impl From<u8> for PowerControl {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<PowerControl> for u8 {
    fn from(value: PowerControl) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `DATA_FORMAT` register (address `0x31`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFormat {
    // g-range selection (bits 1:0).
    pub range: Range,
    // Left-justified output (bit 2).
    pub justify: bool,
    // Full-resolution output (bit 3).
    pub resolution: Resolution,
    #[skip]
    __: B1,
    // Active-low interrupt outputs (bit 5).
    pub int_invert: bool,
    // 3-wire SPI mode (bit 6).
    pub spi_3wire: bool,
    // Self-test force applied (bit 7).
    pub self_test: bool,
}

impl From<u8> for DataFormat {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<DataFormat> for u8 {
    fn from(value: DataFormat) -> Self {
        value.into_bytes()[0]
    }
}

impl Register for BwRate {
    const ADDRESS: u8 = REG_BW_RATE;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: u8 = 0x0A;
    const NAME: &'static str = "BW_RATE";
}

impl Register for PowerControl {
    const ADDRESS: u8 = REG_POWER_CTL;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: u8 = 0x00;
    const NAME: &'static str = "POWER_CTL";
}

impl Register for DataFormat {
    const ADDRESS: u8 = REG_DATA_FORMAT;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: u8 = 0x00;
    const NAME: &'static str = "DATA_FORMAT";
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The fixture's 800 Hz / 16 g / full-resolution words match the datasheet encodings.
    #[test]
    fn fixture_words_match_datasheet() {
        let bw = BwRate::new().with_rate(DataRate::Hz800);
        assert_eq!(u8::from(bw), 0x0D);

        let format = DataFormat::new()
            .with_range(Range::G16)
            .with_resolution(Resolution::Full);
        assert_eq!(u8::from(format), 0x0B);
        assert_eq!(u8::from(format.with_self_test(true)), 0x8B);

        let power = PowerControl::new().with_measure(true);
        assert_eq!(u8::from(power), 0x08);
    }

    #[test]
    fn data_format_decodes_self_test_bit() {
        let format = DataFormat::from(0x8B);
        assert!(format.self_test());
        assert_eq!(format.range(), Range::G16);
        assert_eq!(format.resolution(), Resolution::Full);
        assert!(!format.justify());
    }

    #[test]
    fn names_resolve_for_modelled_registers() {
        assert_eq!(register_name(REG_DATA_FORMAT), "DATA_FORMAT");
        assert_eq!(register_name(REG_DATAY1), "DATA");
        assert_eq!(register_name(0x1D), "UNKNOWN");
    }
}
