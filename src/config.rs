//! Configuration primitives for the fixture validation run.

use crate::params::{DataRate, Range, Resolution};
use crate::profile::ProfileLimits;
use crate::registers::{BwRate, DataFormat, PowerControl};
use crate::self_test::SelfTestLimits;

/// Upper bound on [`ValidationConfig::profile_samples`].
pub const MAX_PROFILE_SAMPLES: usize = 64;

/// Upper bound on [`ValidationConfig::actuator_poll_interval_ms`]; one poll
/// step must fit a `u32` microsecond delay.
pub const MAX_POLL_INTERVAL_MS: u32 = u32::MAX / 1_000;

/// Operating mode programmed by the configuration stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSettings {
    /// Output data rate.
    pub data_rate: DataRate,
    /// g-range.
    pub range: Range,
    /// Output resolution.
    pub resolution: Resolution,
}

impl SensorSettings {
    /// `BW_RATE` word for these settings (normal power).
    pub fn bw_rate(&self) -> BwRate {
        BwRate::new().with_rate(self.data_rate)
    }

    /// `DATA_FORMAT` word for these settings with the self-test force off.
    pub fn data_format(&self) -> DataFormat {
        DataFormat::new()
            .with_range(self.range)
            .with_resolution(self.resolution)
    }

    /// `POWER_CTL` word selecting measurement mode.
    pub fn power_control(&self) -> PowerControl {
        PowerControl::new().with_measure(true)
    }
}

impl Default for SensorSettings {
    /// 800 Hz, ±16 g, full resolution.
    fn default() -> Self {
        Self {
            data_rate: DataRate::Hz800,
            range: Range::G16,
            resolution: Resolution::Full,
        }
    }
}

/// User-facing configuration for a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Operating mode programmed by the configuration stage.
    pub sensor: SensorSettings,
    /// Self-test output change windows.
    pub self_test_limits: SelfTestLimits,
    /// Per-profile axis windows.
    pub profile_limits: ProfileLimits,
    /// Wait after programming the operating mode, in milliseconds.
    pub config_settle_ms: u32,
    /// Wait after toggling the self-test force, in milliseconds.
    pub self_test_settle_ms: u32,
    /// Samples averaged into each self-test reading.
    pub self_test_samples: u8,
    /// Samples checked after the actuator motion completes.
    pub profile_samples: u8,
    /// Longest wait for the actuator to report completion, in milliseconds.
    pub actuator_timeout_ms: u32,
    /// Interval between actuator completion polls, in milliseconds.
    pub actuator_poll_interval_ms: u32,
}

impl ValidationConfig {
    /// Begins building a [`ValidationConfig`] using the builder pattern.
    pub fn new() -> ValidationConfigBuilder {
        ValidationConfigBuilder::new()
    }

    /// Checks whether this configuration can drive a run.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if !self.self_test_limits.is_valid() || !self.profile_limits.is_valid() {
            return Err(ConfigError::InvalidRange);
        }

        if self.self_test_samples == 0 || self.profile_samples == 0 {
            return Err(ConfigError::NoSamples);
        }

        if self.profile_samples as usize > MAX_PROFILE_SAMPLES {
            return Err(ConfigError::TooManySamples);
        }

        if self.actuator_timeout_ms == 0
            || self.actuator_poll_interval_ms == 0
            || self.actuator_poll_interval_ms > MAX_POLL_INTERVAL_MS
        {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(())
    }

    /// Interval between consecutive samples at the configured data rate.
    pub fn sample_period_us(&self) -> u32 {
        self.sensor.data_rate.period_us()
    }
}

/// Builder for [`ValidationConfig`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ValidationConfigBuilder {
    config: ValidationConfig,
}

impl ValidationConfigBuilder {
    /// Creates a new builder seeded with [`ValidationConfig::default()`].
    pub fn new() -> Self {
        Self {
            config: ValidationConfig::default(),
        }
    }

    /// Overrides the operating mode.
    pub fn sensor(mut self, sensor: SensorSettings) -> Self {
        self.config.sensor = sensor;
        self
    }

    /// Overrides the self-test windows.
    pub fn self_test_limits(mut self, limits: SelfTestLimits) -> Self {
        self.config.self_test_limits = limits;
        self
    }

    /// Overrides the profile windows.
    pub fn profile_limits(mut self, limits: ProfileLimits) -> Self {
        self.config.profile_limits = limits;
        self
    }

    /// Sets the post-configuration settle time.
    pub fn config_settle_ms(mut self, ms: u32) -> Self {
        self.config.config_settle_ms = ms;
        self
    }

    /// Sets the self-test settle time.
    pub fn self_test_settle_ms(mut self, ms: u32) -> Self {
        self.config.self_test_settle_ms = ms;
        self
    }

    /// Sets how many samples are averaged per self-test reading.
    pub fn self_test_samples(mut self, samples: u8) -> Self {
        self.config.self_test_samples = samples;
        self
    }

    /// Sets how many samples are checked per profile.
    pub fn profile_samples(mut self, samples: u8) -> Self {
        self.config.profile_samples = samples;
        self
    }

    /// Sets the actuator completion timeout.
    pub fn actuator_timeout_ms(mut self, ms: u32) -> Self {
        self.config.actuator_timeout_ms = ms;
        self
    }

    /// Sets the actuator completion poll interval.
    pub fn actuator_poll_interval_ms(mut self, ms: u32) -> Self {
        self.config.actuator_poll_interval_ms = ms;
        self
    }

    /// Finalizes the builder and returns the [`ValidationConfig`].
    pub fn build(self) -> ValidationConfig {
        self.config
    }
}

impl Default for ValidationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            sensor: SensorSettings::default(),
            self_test_limits: SelfTestLimits::default(),
            profile_limits: ProfileLimits::default(),
            config_settle_ms: 100,
            self_test_settle_ms: 100,
            self_test_samples: 1,
            profile_samples: 1,
            actuator_timeout_ms: 10_000,
            actuator_poll_interval_ms: 10,
        }
    }
}

/// Validation errors generated while verifying a [`ValidationConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A window is inverted or tagged with the wrong axis.
    InvalidRange,
    /// A sample count is zero.
    NoSamples,
    /// More profile samples than [`MAX_PROFILE_SAMPLES`] were requested.
    TooManySamples,
    /// The actuator timeout is zero, or the poll interval is zero or above
    /// [`MAX_POLL_INTERVAL_MS`].
    InvalidTimeout,
}
