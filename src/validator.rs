//! Fixture validation stages and the run aggregator.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::actuator::{Actuator, MotionGuard};
use crate::axis::AxisReading;
use crate::config::{SensorSettings, ValidationConfig, MAX_PROFILE_SAMPLES};
use crate::device::Adxl345;
use crate::error::{Error, Result};
use crate::interface::Adxl345Interface;
use crate::profile::{evaluate, ActuatorProfile};
use crate::registers::{DataFormat, Register, EXPECTED_DEVID};
use crate::run::{RunState, Stage, StageResult, TestRun};
use crate::self_test::{SelfTestGuard, SelfTestReport};
use crate::timing::{Clock, Stopwatch};

/// Drives one DUT and one actuator through the validation stages.
///
/// The validator owns every collaborator for its lifetime; [`Validator::release`]
/// hands them back.
pub struct Validator<IFACE, ACT, D, C> {
    device: Adxl345<IFACE>,
    actuator: ACT,
    delay: D,
    clock: C,
    config: ValidationConfig,
}

impl<IFACE, ACT, D, C> Validator<IFACE, ACT, D, C> {
    // ==================================================================
    // == Construction & Ownership ======================================
    // ==================================================================
    /// Creates a validator from its collaborators.
    pub fn new(
        device: Adxl345<IFACE>,
        actuator: ACT,
        delay: D,
        clock: C,
        config: ValidationConfig,
    ) -> Self {
        Self {
            device,
            actuator,
            delay,
            clock,
            config,
        }
    }

    /// Consumes the validator and returns its collaborators.
    pub fn release(self) -> (Adxl345<IFACE>, ACT, D, C) {
        (self.device, self.actuator, self.delay, self.clock)
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Returns a mutable reference to the active configuration.
    pub fn config_mut(&mut self) -> &mut ValidationConfig {
        &mut self.config
    }

    /// Provides mutable access to the sensor driver.
    pub fn device_mut(&mut self) -> &mut Adxl345<IFACE> {
        &mut self.device
    }

    /// Provides mutable access to the actuator.
    pub fn actuator_mut(&mut self) -> &mut ACT {
        &mut self.actuator
    }
}

impl<IFACE, ACT, D, C> Validator<IFACE, ACT, D, C>
where
    IFACE: Adxl345Interface,
    ACT: Actuator,
    D: DelayNs,
    C: Clock,
{
    // ==================================================================
    // == Result Aggregation =============================================
    // ==================================================================
    /// Runs configuration, self-test and `profile` validation in order.
    ///
    /// The first failing stage ends the run; nothing is retried.
    pub fn execute(&mut self, profile: ActuatorProfile) -> TestRun<IFACE::Error, ACT::Error> {
        const STAGES: [(RunState, Stage); 3] = [
            (RunState::Configuring, Stage::Configuration),
            (RunState::SelfTesting, Stage::SelfTest),
            (RunState::ValidatingProfile, Stage::ProfileValidation),
        ];

        let run_watch = Stopwatch::start(&self.clock);
        let mut run = TestRun::new(profile, run_watch.started_us());
        log_info!("validating DUT with {} profile", profile);

        for (state, stage) in STAGES {
            run.advance(state);
            let stage_watch = Stopwatch::start(&self.clock);

            let result = match stage {
                Stage::Configuration => self.configure(),
                Stage::SelfTest => self.run_self_test(),
                Stage::ProfileValidation => self.run_profile(profile),
            };

            match result {
                Ok(stage_result) => {
                    log_info!("{} stage passed", stage);
                    run.record(stage_result);
                }
                Err(error) => {
                    let failing_axis = error.axis();
                    run.record(StageResult::fail(
                        stage,
                        failing_axis,
                        stage_watch.stop(&self.clock),
                    ));
                    let elapsed = run_watch.stop(&self.clock);
                    log_error!("{} stage failed (axis {:?})", stage, failing_axis);
                    run.finish_failed(elapsed, stage, error);
                    return run;
                }
            }
        }

        run.finish_passed(run_watch.stop(&self.clock));
        log_info!("{} profile validated", profile);
        run
    }

    // ==================================================================
    // == Configuration Stage ============================================
    // ==================================================================
    /// Programs the configured operating mode and verifies it latched.
    pub fn configure(&mut self) -> Result<StageResult, IFACE::Error, ACT::Error> {
        let settings = self.config.sensor;
        self.configure_with(settings)
    }

    /// Programs `settings` and verifies every register latched.
    ///
    /// Every register is written unconditionally, so repeating the call with
    /// the same settings produces the same bus traffic.
    pub fn configure_with(
        &mut self,
        settings: SensorSettings,
    ) -> Result<StageResult, IFACE::Error, ACT::Error> {
        let watch = Stopwatch::start(&self.clock);
        self.config.validate().map_err(Error::InvalidConfig)?;

        let found = self.device.device_id().map_err(Error::Bus)?;
        if found != EXPECTED_DEVID {
            log_error!("unexpected DEVID {}", found);
            return Err(Error::DeviceIdMismatch { found });
        }

        let bw_rate = settings.bw_rate();
        let data_format = settings.data_format();
        let power_control = settings.power_control();

        self.device.write(bw_rate).map_err(Error::Bus)?;
        self.device.write(data_format).map_err(Error::Bus)?;
        self.device.write(power_control).map_err(Error::Bus)?;

        self.verify_register(bw_rate)?;
        self.verify_register(data_format)?;
        self.verify_register(power_control)?;

        self.delay.delay_ms(self.config.config_settle_ms);
        Ok(StageResult::pass(Stage::Configuration, watch.stop(&self.clock)))
    }

    fn verify_register<R: Register>(
        &mut self,
        requested: R,
    ) -> Result<(), IFACE::Error, ACT::Error> {
        let expected: u8 = requested.into();
        let actual: u8 = self.device.read::<R>().map_err(Error::Bus)?.into();

        if actual != expected {
            log_error!("{} read back {}, wrote {}", R::NAME, actual, expected);
            return Err(Error::ConfigMismatch {
                register: R::ADDRESS,
                expected,
                actual,
            });
        }

        Ok(())
    }

    // ==================================================================
    // == Self-Test Stage ================================================
    // ==================================================================
    /// Runs the datasheet self-test and checks the output change per axis.
    ///
    /// The self-test force is removed before this returns, pass or fail.
    pub fn run_self_test(&mut self) -> Result<StageResult, IFACE::Error, ACT::Error> {
        let watch = Stopwatch::start(&self.clock);
        self.config.validate().map_err(Error::InvalidConfig)?;

        let report = self.capture_self_test()?;
        log_debug!(
            "self-test baseline {} excited {} delta {}",
            report.baseline,
            report.excited,
            report.delta()
        );

        if let Some((range, delta)) = report.evaluate(&self.config.self_test_limits) {
            log_error!("self-test delta {} outside {}", delta, range);
            return Err(Error::SelfTestOutOfRange {
                axis: range.axis,
                delta,
                range,
            });
        }

        Ok(StageResult::pass(Stage::SelfTest, watch.stop(&self.clock)))
    }

    fn capture_self_test(&mut self) -> Result<SelfTestReport, IFACE::Error, ACT::Error> {
        let settle_ms = self.config.self_test_settle_ms;
        let samples = self.config.self_test_samples;
        let period_us = self.config.sample_period_us();

        self.device.set_self_test(false).map_err(Error::Bus)?;
        self.delay.delay_ms(settle_ms);
        let baseline =
            average_axes(&mut self.device, &mut self.delay, samples, period_us).map_err(Error::Bus)?;

        let (mut guard, engaged) = SelfTestGuard::engage(&mut self.device);
        engaged.map_err(Error::Bus)?;
        self.delay.delay_ms(settle_ms);
        let excited = average_axes(guard.device(), &mut self.delay, samples, period_us);
        let restored = guard.restore();

        let excited = excited.map_err(Error::Bus)?;
        restored.map_err(Error::Bus)?;

        let format = self.device.read::<DataFormat>().map_err(Error::Bus)?;
        if format.self_test() {
            log_error!("self-test bit still set after restore");
            return Err(Error::ConfigMismatch {
                register: DataFormat::ADDRESS,
                expected: format.with_self_test(false).into(),
                actual: format.into(),
            });
        }

        Ok(SelfTestReport { baseline, excited })
    }

    // ==================================================================
    // == Profile Validation Stage =======================================
    // ==================================================================
    /// Moves the DUT through `profile` and checks the profile's constrained axes.
    pub fn run_profile(
        &mut self,
        profile: ActuatorProfile,
    ) -> Result<StageResult, IFACE::Error, ACT::Error> {
        let watch = Stopwatch::start(&self.clock);
        self.config.validate().map_err(Error::InvalidConfig)?;

        self.await_motion(profile)?;

        let period_us = self.config.sample_period_us();
        let mut samples: Vec<AxisReading, MAX_PROFILE_SAMPLES> = Vec::new();
        for index in 0..self.config.profile_samples {
            if index > 0 {
                self.delay.delay_us(period_us);
            }
            let reading = self.device.read_axes().map_err(Error::Bus)?;
            log_trace!("{} sample {}: {} mg", profile, index, reading.to_mg());
            if samples.push(reading).is_err() {
                break;
            }
        }

        let ranges = self.config.profile_limits.ranges(profile);
        if let Some(violation) = evaluate(ranges, &samples) {
            log_error!(
                "{} sample {} outside {}: {}",
                profile,
                violation.sample,
                violation.range,
                violation.value
            );
            return Err(Error::ProfileOutOfRange {
                profile,
                axis: violation.range.axis,
                value: violation.value,
                range: violation.range,
            });
        }

        Ok(StageResult::pass(
            Stage::ProfileValidation,
            watch.stop(&self.clock),
        ))
    }

    /// Starts `profile` and blocks until the actuator reports completion.
    ///
    /// The actuator is halted if the timeout expires or an error cuts the wait short.
    fn await_motion(&mut self, profile: ActuatorProfile) -> Result<(), IFACE::Error, ACT::Error> {
        let timeout_ms = self.config.actuator_timeout_ms;
        let timeout = Duration::from_millis(timeout_ms as u64);
        let poll = Duration::from_millis(self.config.actuator_poll_interval_ms as u64);

        let (mut motion, started) = MotionGuard::begin(&mut self.actuator, profile);
        started.map_err(Error::Actuator)?;
        let motion_watch = Stopwatch::start(&self.clock);

        loop {
            if motion.is_complete().map_err(Error::Actuator)? {
                motion.complete();
                return Ok(());
            }

            let waited = motion_watch.elapsed(&self.clock);
            if waited >= timeout {
                log_error!("{} did not complete within {} ms", profile, timeout_ms);
                if motion.halt().is_err() {
                    log_error!("actuator halt after timeout failed");
                }
                return Err(Error::ActuatorTimeout {
                    profile,
                    timeout_ms,
                });
            }

            // bounded by MAX_POLL_INTERVAL_MS
            let step = poll.min(timeout - waited);
            self.delay.delay_us(step.as_micros() as u32);
        }
    }
}

/// Reads `count` consecutive samples spaced `period_us` apart and averages them.
fn average_axes<IFACE, D>(
    device: &mut Adxl345<IFACE>,
    delay: &mut D,
    count: u8,
    period_us: u32,
) -> core::result::Result<AxisReading, IFACE::Error>
where
    IFACE: Adxl345Interface,
    D: DelayNs,
{
    let count = count.max(1);
    let mut sum = AxisReading::default();

    for index in 0..count {
        if index > 0 {
            delay.delay_us(period_us);
        }
        let reading = device.read_axes()?;
        sum.x += reading.x;
        sum.y += reading.y;
        sum.z += reading.z;
    }

    let n = count as i32;
    Ok(AxisReading::new(sum.x / n, sum.y / n, sum.z / n))
}
