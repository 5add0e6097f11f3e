//! Error handling primitives for the validation run.

use core::fmt;

use crate::axis::{Axis, ThresholdRange};
use crate::config::ConfigError;
use crate::profile::ActuatorProfile;
use crate::registers::register_name;

/// Crate-wide result type alias.
pub type Result<T, E, A> = core::result::Result<T, Error<E, A>>;

/// Conditions that end a validation run.
///
/// `E` is the sensor bus error and `A` the actuator transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E, A> {
    /// The sensor bus reported an error.
    Bus(E),
    /// The actuator transport reported an error.
    Actuator(A),
    /// The configuration could not drive a run.
    InvalidConfig(ConfigError),
    /// `DEVID` did not read back as an ADXL345.
    DeviceIdMismatch {
        /// Value read from `DEVID`.
        found: u8,
    },
    /// A programmed register read back a different value.
    ConfigMismatch {
        /// Register address.
        register: u8,
        /// Value written.
        expected: u8,
        /// Value read back.
        actual: u8,
    },
    /// A self-test output change fell outside its window.
    SelfTestOutOfRange {
        /// Failing axis.
        axis: Axis,
        /// Measured output change.
        delta: i32,
        /// Window the change was checked against.
        range: ThresholdRange,
    },
    /// A post-motion reading fell outside the profile's window.
    ProfileOutOfRange {
        /// Profile being validated.
        profile: ActuatorProfile,
        /// Failing axis.
        axis: Axis,
        /// Measured value.
        value: i32,
        /// Window the value was checked against.
        range: ThresholdRange,
    },
    /// The actuator did not report completion in time.
    ActuatorTimeout {
        /// Profile being executed.
        profile: ActuatorProfile,
        /// Timeout that expired, in milliseconds.
        timeout_ms: u32,
    },
}

impl<E, A> Error<E, A> {
    /// Axis implicated by the failure, if any.
    pub fn axis(&self) -> Option<Axis> {
        match self {
            Self::SelfTestOutOfRange { axis, .. } | Self::ProfileOutOfRange { axis, .. } => {
                Some(*axis)
            }
            _ => None,
        }
    }

    /// Returns `true` for adapter I/O failures as opposed to measurement failures.
    pub fn is_communication(&self) -> bool {
        matches!(self, Self::Bus(_) | Self::Actuator(_))
    }
}

impl<E, A> fmt::Display for Error<E, A>
where
    E: fmt::Debug,
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(err) => write!(f, "sensor bus error: {:?}", err),
            Self::Actuator(err) => write!(f, "actuator error: {:?}", err),
            Self::InvalidConfig(err) => write!(f, "invalid configuration: {:?}", err),
            Self::DeviceIdMismatch { found } => {
                write!(f, "DEVID read 0x{:02X}, expected 0xE5", found)
            }
            Self::ConfigMismatch {
                register,
                expected,
                actual,
            } => write!(
                f,
                "{} (0x{:02X}) read back 0x{:02X}, wrote 0x{:02X}",
                register_name(*register),
                register,
                actual,
                expected
            ),
            Self::SelfTestOutOfRange { axis, delta, range } => write!(
                f,
                "self-test failed on {} axis: delta {} not in [{}, {}]",
                axis, delta, range.min, range.max
            ),
            Self::ProfileOutOfRange {
                profile,
                axis,
                value,
                range,
            } => write!(
                f,
                "{}: {} axis {} not in [{}, {}]",
                profile, axis, value, range.min, range.max
            ),
            Self::ActuatorTimeout {
                profile,
                timeout_ms,
            } => write!(f, "{}: actuator did not complete within {} ms", profile, timeout_ms),
        }
    }
}
