//! In-crate fakes for the sensor, the actuator and the bench clock.

use std::cell::Cell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::actuator::Actuator;
use crate::axis::AxisReading;
use crate::interface::Adxl345Interface;
use crate::profile::ActuatorProfile;
use crate::registers::{
    BwRate, DataFormat, PowerControl, Register, EXPECTED_DEVID, REG_DATAX0, REG_DATA_FORMAT,
    REG_DEVID,
};
use crate::timing::Clock;

/// Error injected by the fakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

/// Shared simulated time and posture of the fixture.
#[derive(Default)]
pub struct Bench {
    now_ns: Cell<u64>,
    moved: Cell<bool>,
}

impl Bench {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn now_us(&self) -> u64 {
        self.now_ns.get() / 1_000
    }

    fn advance_ns(&self, ns: u64) {
        self.now_ns.set(self.now_ns.get() + ns);
    }
}

/// Clock reading the bench time.
pub struct FakeClock(pub Rc<Bench>);

impl Clock for FakeClock {
    fn now_us(&self) -> u64 {
        self.0.now_us()
    }
}

/// Delay that advances the bench time instead of sleeping.
pub struct FakeDelay(pub Rc<Bench>);

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.advance_ns(ns as u64);
    }

    fn delay_us(&mut self, us: u32) {
        self.0.advance_ns(us as u64 * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.advance_ns(ms as u64 * 1_000_000);
    }
}

/// Register-map simulation of an ADXL345 at rest on the fixture.
///
/// The output is `baseline` (plus `self_test_delta` while the self-test bit is
/// set) until the actuator finishes a motion, then the queued motion samples
/// in order, repeating the last one.
pub struct FakeAdxl345 {
    bench: Rc<Bench>,
    registers: [u8; 0x40],
    baseline: AxisReading,
    self_test_delta: AxisReading,
    motion: Vec<AxisReading>,
    motion_index: usize,
    latch_override: Option<(u8, u8)>,
    failing_read: Option<u8>,
    fail_excited_reads: bool,
    writes: Vec<(u8, u8)>,
}

impl FakeAdxl345 {
    pub fn new() -> Self {
        Self::on_bench(Bench::new())
    }

    pub fn on_bench(bench: Rc<Bench>) -> Self {
        let mut registers = [0u8; 0x40];
        registers[REG_DEVID as usize] = EXPECTED_DEVID;
        registers[BwRate::ADDRESS as usize] = BwRate::RESET_VALUE;
        registers[PowerControl::ADDRESS as usize] = PowerControl::RESET_VALUE;
        registers[DataFormat::ADDRESS as usize] = DataFormat::RESET_VALUE;

        Self {
            bench,
            registers,
            baseline: AxisReading::new(3, -6, 256),
            self_test_delta: AxisReading::new(85, -82, 130),
            motion: Vec::new(),
            motion_index: 0,
            latch_override: None,
            failing_read: None,
            fail_excited_reads: false,
            writes: Vec::new(),
        }
    }

    pub fn with_self_test_delta(mut self, delta: AxisReading) -> Self {
        self.self_test_delta = delta;
        self
    }

    pub fn with_motion(mut self, samples: &[AxisReading]) -> Self {
        self.motion = samples.to_vec();
        self
    }

    pub fn with_devid(mut self, devid: u8) -> Self {
        self.registers[REG_DEVID as usize] = devid;
        self
    }

    /// Writes to `register` latch `value` instead of what was written.
    pub fn latching(mut self, register: u8, value: u8) -> Self {
        self.latch_override = Some((register, value));
        self
    }

    pub fn fail_reads_of(&mut self, register: u8) {
        self.failing_read = Some(register);
    }

    /// Output reads fail while the self-test bit is set.
    pub fn failing_excited_reads(mut self) -> Self {
        self.fail_excited_reads = true;
        self
    }

    pub fn register(&self, address: u8) -> u8 {
        self.registers[address as usize]
    }

    pub fn self_test_enabled(&self) -> bool {
        DataFormat::from(self.register(REG_DATA_FORMAT)).self_test()
    }

    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    pub fn data_format_writes(&self) -> usize {
        self.writes
            .iter()
            .filter(|(register, _)| *register == REG_DATA_FORMAT)
            .count()
    }

    fn current_output(&mut self) -> AxisReading {
        let mut reading = if self.bench.moved.get() && !self.motion.is_empty() {
            let index = self.motion_index.min(self.motion.len() - 1);
            self.motion_index += 1;
            self.motion[index]
        } else {
            self.baseline
        };

        if self.self_test_enabled() {
            reading = AxisReading::new(
                reading.x + self.self_test_delta.x,
                reading.y + self.self_test_delta.y,
                reading.z + self.self_test_delta.z,
            );
        }
        reading
    }
}

impl Adxl345Interface for FakeAdxl345 {
    type Error = BusFault;

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.writes.push((register, value));
        let latched = match self.latch_override {
            Some((target, forced)) if target == register => forced,
            _ => value,
        };
        self.registers[(register & 0x3F) as usize] = latched;
        Ok(())
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
        let mut value = [0u8; 1];
        self.read_many(register, &mut value)?;
        Ok(value[0])
    }

    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        if self.failing_read == Some(register) {
            return Err(BusFault);
        }

        if register == REG_DATAX0 && buf.len() == 6 {
            if self.fail_excited_reads && self.self_test_enabled() {
                return Err(BusFault);
            }
            let reading = self.current_output();
            let clamp = |v: i32| v.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
            buf[0..2].copy_from_slice(&clamp(reading.x).to_le_bytes());
            buf[2..4].copy_from_slice(&clamp(reading.y).to_le_bytes());
            buf[4..6].copy_from_slice(&clamp(reading.z).to_le_bytes());
            return Ok(());
        }

        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.registers[(register as usize + offset) & 0x3F];
        }
        Ok(())
    }

    fn write_many(&mut self, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        for (offset, value) in data.iter().enumerate() {
            self.write_register(register + offset as u8, *value)?;
        }
        Ok(())
    }
}

/// Scripted fixture actuator.
pub struct FakeActuator {
    bench: Rc<Bench>,
    completes_after: Option<u32>,
    fail_begin: bool,
    polls: u32,
    started: Option<ActuatorProfile>,
    halts: u32,
}

impl FakeActuator {
    /// Reports completion on the `polls`-th poll.
    pub fn completes_after(polls: u32) -> Self {
        Self::on_bench(Bench::new(), Some(polls))
    }

    pub fn never_completes() -> Self {
        Self::on_bench(Bench::new(), None)
    }

    pub fn on_bench(bench: Rc<Bench>, completes_after: Option<u32>) -> Self {
        Self {
            bench,
            completes_after,
            fail_begin: false,
            polls: 0,
            started: None,
            halts: 0,
        }
    }

    pub fn failing_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    pub fn started(&self) -> Option<ActuatorProfile> {
        self.started
    }

    pub fn halts(&self) -> u32 {
        self.halts
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }
}

impl Actuator for FakeActuator {
    type Error = BusFault;

    fn begin(&mut self, profile: ActuatorProfile) -> Result<(), Self::Error> {
        self.started = Some(profile);
        if self.fail_begin {
            return Err(BusFault);
        }
        Ok(())
    }

    fn is_complete(&mut self) -> Result<bool, Self::Error> {
        self.polls += 1;
        let done = matches!(self.completes_after, Some(after) if self.polls >= after);
        if done {
            self.bench.moved.set(true);
        }
        Ok(done)
    }

    fn halt(&mut self) -> Result<(), Self::Error> {
        self.halts += 1;
        Ok(())
    }
}
