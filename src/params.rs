//! Strongly typed parameter enumerations for the ADXL345 register fields.
//!
//! These enums map directly to datasheet field encodings and are used across
//! [`SensorSettings`](crate::config::SensorSettings) and the register
//! bitfields. Prefer these types over raw integers to keep configuration
//! values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use adxl345_validator::params::{DataRate, Range, Resolution};
//!
//! let rate = DataRate::Hz800;
//! let range = Range::G16;
//! let resolution = Resolution::Full;
//! assert_eq!(rate.period_us(), 1_250);
//! let _ = (range, resolution);
//! ```

use modular_bitfield::prelude::Specifier;

/// Output data rate codes encoded in `BW_RATE[3:0]` (normal power operation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 4]
pub enum DataRate {
    /// 0.10 Hz.
    Hz0_10 = 0b0000,
    /// 0.20 Hz.
    Hz0_20 = 0b0001,
    /// 0.39 Hz.
    Hz0_39 = 0b0010,
    /// 0.78 Hz.
    Hz0_78 = 0b0011,
    /// 1.56 Hz.
    Hz1_56 = 0b0100,
    /// 3.13 Hz.
    Hz3_13 = 0b0101,
    /// 6.25 Hz.
    Hz6_25 = 0b0110,
    /// 12.5 Hz.
    Hz12_5 = 0b0111,
    /// 25 Hz.
    Hz25 = 0b1000,
    /// 50 Hz.
    Hz50 = 0b1001,
    /// 100 Hz (power-on default).
    Hz100 = 0b1010,
    /// 200 Hz.
    Hz200 = 0b1011,
    /// 400 Hz.
    Hz400 = 0b1100,
    /// 800 Hz.
    Hz800 = 0b1101,
    /// 1600 Hz.
    Hz1600 = 0b1110,
    /// 3200 Hz.
    Hz3200 = 0b1111,
}

impl DataRate {
    /// Returns the output data rate in millihertz.
    pub const fn millihz(self) -> u32 {
        match self {
            Self::Hz0_10 => 100,
            Self::Hz0_20 => 200,
            Self::Hz0_39 => 390,
            Self::Hz0_78 => 780,
            Self::Hz1_56 => 1_560,
            Self::Hz3_13 => 3_130,
            Self::Hz6_25 => 6_250,
            Self::Hz12_5 => 12_500,
            Self::Hz25 => 25_000,
            Self::Hz50 => 50_000,
            Self::Hz100 => 100_000,
            Self::Hz200 => 200_000,
            Self::Hz400 => 400_000,
            Self::Hz800 => 800_000,
            Self::Hz1600 => 1_600_000,
            Self::Hz3200 => 3_200_000,
        }
    }

    /// Returns the interval between two consecutive output samples in microseconds.
    pub const fn period_us(self) -> u32 {
        // 1e9 µHz·µs, rounded to the nearest microsecond.
        let millihz = self.millihz();
        (1_000_000_000 + millihz / 2) / millihz
    }
}

/// g-range selection encoded in `DATA_FORMAT[1:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum Range {
    /// ±2 g.
    G2 = 0b00,
    /// ±4 g.
    G4 = 0b01,
    /// ±8 g.
    G8 = 0b10,
    /// ±16 g.
    G16 = 0b11,
}

/// Resolution selection bit (`DATA_FORMAT.FULL_RES`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum Resolution {
    /// Fixed 10-bit output; the scale factor follows the range.
    TenBit = 0,
    /// Full resolution; constant 3.9 mg/LSB across all ranges.
    Full = 1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_matches_output_rate() {
        assert_eq!(DataRate::Hz800.period_us(), 1_250);
        assert_eq!(DataRate::Hz3200.period_us(), 313);
        assert_eq!(DataRate::Hz100.period_us(), 10_000);
    }
}
