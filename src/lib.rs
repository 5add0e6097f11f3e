#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

mod error;

pub mod actuator;
pub mod axis;
pub mod config;
pub mod device;
pub mod interface;
pub mod params;
pub mod profile;
pub mod registers;
pub mod run;
pub mod self_test;
pub mod timing;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use crate::actuator::Actuator;
pub use crate::axis::{Axis, AxisReading, ThresholdRange};
pub use crate::config::{ConfigError, SensorSettings, ValidationConfig};
pub use crate::device::Adxl345;
pub use crate::error::{Error, Result};
pub use crate::profile::{ActuatorProfile, ProfileLimits};
pub use crate::run::{Outcome, RunState, Stage, StageResult, TestRun};
pub use crate::self_test::SelfTestLimits;
pub use crate::timing::Clock;
pub use crate::validator::Validator;
