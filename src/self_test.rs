//! Self-test limits, evaluation and the self-test bit guard.

use crate::axis::{Axis, AxisReading, ThresholdRange};
use crate::device::Adxl345;
use crate::interface::Adxl345Interface;

/// Accepted self-test output change per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SelfTestLimits {
    /// X-axis window.
    pub x: ThresholdRange,
    /// Y-axis window.
    pub y: ThresholdRange,
    /// Z-axis window.
    pub z: ThresholdRange,
}

impl SelfTestLimits {
    /// Builds limits from `(min, max)` pairs in full-resolution counts.
    pub const fn new(x: (i32, i32), y: (i32, i32), z: (i32, i32)) -> Self {
        Self {
            x: ThresholdRange::new(Axis::X, x.0, x.1),
            y: ThresholdRange::new(Axis::Y, y.0, y.1),
            z: ThresholdRange::new(Axis::Z, z.0, z.1),
        }
    }

    /// Windows in evaluation order: x, y, z.
    pub const fn ranges(&self) -> [ThresholdRange; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns `true` when every window is ordered and tagged with its own axis.
    pub fn is_valid(&self) -> bool {
        self.ranges()
            .iter()
            .zip(Axis::ALL)
            .all(|(range, axis)| range.axis == axis && range.is_ordered())
    }
}

impl Default for SelfTestLimits {
    /// Datasheet self-test output change at full resolution, in LSB.
    fn default() -> Self {
        Self::new((50, 540), (-540, -50), (75, 875))
    }
}

/// Readings captured by one self-test pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SelfTestReport {
    /// Output with the self-test force off.
    pub baseline: AxisReading,
    /// Output with the self-test force applied.
    pub excited: AxisReading,
}

impl SelfTestReport {
    /// Per-axis output change caused by the self-test force.
    pub const fn delta(&self) -> AxisReading {
        self.excited.delta_from(&self.baseline)
    }

    /// Checks the delta against `limits` in x, y, z order.
    ///
    /// Returns the first window the delta falls outside of, with the offending delta.
    pub fn evaluate(&self, limits: &SelfTestLimits) -> Option<(ThresholdRange, i32)> {
        let delta = self.delta();
        limits
            .ranges()
            .into_iter()
            .find_map(|range| range.check(&delta).map(|value| (range, value)))
    }
}

/// Holds the self-test force on and clears it again when dropped.
///
/// Call [`SelfTestGuard::restore`] on the normal path to observe bus errors;
/// the drop path clears the bit on a best-effort basis.
pub struct SelfTestGuard<'a, IFACE>
where
    IFACE: Adxl345Interface,
{
    device: &'a mut Adxl345<IFACE>,
    armed: bool,
}

impl<'a, IFACE> SelfTestGuard<'a, IFACE>
where
    IFACE: Adxl345Interface,
{
    /// Sets the self-test bit. The guard is armed even if the write fails.
    pub fn engage(device: &'a mut Adxl345<IFACE>) -> (Self, Result<(), IFACE::Error>) {
        let result = device.set_self_test(true);
        (Self { device, armed: true }, result)
    }

    /// Access to the driver while the force is applied.
    pub fn device(&mut self) -> &mut Adxl345<IFACE> {
        self.device
    }

    /// Clears the self-test bit and disarms the guard.
    pub fn restore(mut self) -> Result<(), IFACE::Error> {
        self.armed = false;
        self.device.set_self_test(false)
    }
}

impl<IFACE> Drop for SelfTestGuard<'_, IFACE>
where
    IFACE: Adxl345Interface,
{
    fn drop(&mut self) {
        if self.armed && self.device.set_self_test(false).is_err() {
            log_error!("self-test bit could not be cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeAdxl345;

    fn report(delta: AxisReading) -> SelfTestReport {
        let baseline = AxisReading::new(4, -8, 252);
        SelfTestReport {
            baseline,
            excited: AxisReading::new(
                baseline.x + delta.x,
                baseline.y + delta.y,
                baseline.z + delta.z,
            ),
        }
    }

    fn fixture_limits() -> SelfTestLimits {
        SelfTestLimits::new((60, 140), (-140, -60), (60, 140))
    }

    #[test]
    fn deltas_inside_windows_pass() {
        let report = report(AxisReading::new(85, -82, 130));
        assert_eq!(report.evaluate(&fixture_limits()), None);
    }

    #[test]
    fn reports_y_when_x_passes() {
        let report = report(AxisReading::new(85, -40, 130));
        let (range, delta) = report.evaluate(&fixture_limits()).unwrap();
        assert_eq!(range, ThresholdRange::new(Axis::Y, -140, -60));
        assert_eq!(delta, -40);
    }

    #[test]
    fn first_failing_axis_wins() {
        let silent = report(AxisReading::new(0, 0, 0));
        let (range, _) = silent.evaluate(&fixture_limits()).unwrap();
        assert_eq!(range.axis, Axis::X);

        let x_only = report(AxisReading::new(85, 0, 0));
        let (range, _) = x_only.evaluate(&fixture_limits()).unwrap();
        assert_eq!(range.axis, Axis::Y);
    }

    #[test]
    fn z_above_window_fails() {
        let report = report(AxisReading::new(85, -82, 150));
        let (range, delta) = report.evaluate(&fixture_limits()).unwrap();
        assert_eq!(range.axis, Axis::Z);
        assert_eq!(delta, 150);
    }

    #[test]
    fn default_limits_are_valid() {
        assert!(SelfTestLimits::default().is_valid());
        let mut limits = SelfTestLimits::default();
        limits.y = ThresholdRange::new(Axis::X, -140, -60);
        assert!(!limits.is_valid());
    }

    #[test]
    fn guard_clears_bit_when_dropped() {
        let mut device = Adxl345::new(FakeAdxl345::new());
        {
            let (mut guard, engaged) = SelfTestGuard::engage(&mut device);
            engaged.unwrap();
            assert!(guard.device().interface_mut().self_test_enabled());
        }
        assert!(!device.interface_mut().self_test_enabled());
    }

    #[test]
    fn restore_disarms_guard() {
        let mut device = Adxl345::new(FakeAdxl345::new());
        let (guard, engaged) = SelfTestGuard::engage(&mut device);
        engaged.unwrap();
        guard.restore().unwrap();

        let interface = device.interface_mut();
        assert!(!interface.self_test_enabled());
        // engage + restore, nothing from drop
        assert_eq!(interface.data_format_writes(), 2);
    }
}
