//! Actuator motion profiles and their axis limits.

use core::fmt;
use core::str::FromStr;

use crate::axis::{mg_to_lsb_ceil, mg_to_lsb_floor, Axis, AxisReading, ThresholdRange};

/// Largest count the sensor reports at 16 g full resolution.
const FULL_SCALE_MAX: i32 = 4_095;
/// Smallest count the sensor reports at 16 g full resolution.
const FULL_SCALE_MIN: i32 = -4_096;

/// Physical motion the fixture applies to the DUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorProfile {
    /// Gentle pitch-up; constrains y then z.
    SlowClimb,
    /// Hard lateral turn; constrains x then y.
    SharpTurn,
    /// Free-fall drop; constrains z.
    QuickDrop,
}

impl ActuatorProfile {
    /// Every profile the fixture supports.
    pub const ALL: [ActuatorProfile; 3] = [Self::SlowClimb, Self::SharpTurn, Self::QuickDrop];

    /// Name understood by the actuator controller and the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SlowClimb => "slow_climb",
            Self::SharpTurn => "sharp_turn",
            Self::QuickDrop => "quick_drop",
        }
    }

    /// Axes checked for this profile, in evaluation order.
    pub const fn constrained_axes(self) -> &'static [Axis] {
        match self {
            Self::SlowClimb => &[Axis::Y, Axis::Z],
            Self::SharpTurn => &[Axis::X, Axis::Y],
            Self::QuickDrop => &[Axis::Z],
        }
    }
}

impl fmt::Display for ActuatorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a profile name is not recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownProfile;

impl fmt::Display for UnknownProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected one of slow_climb, sharp_turn, quick_drop")
    }
}

impl FromStr for ActuatorProfile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.name() == s)
            .ok_or(UnknownProfile)
    }
}

/// Threshold table for every profile.
///
/// Each entry stores one [`ThresholdRange`] per constrained axis, kept in the
/// profile's evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileLimits {
    slow_climb: [ThresholdRange; 2],
    sharp_turn: [ThresholdRange; 2],
    quick_drop: [ThresholdRange; 1],
}

impl ProfileLimits {
    /// Ranges for `profile`, in evaluation order.
    pub fn ranges(&self, profile: ActuatorProfile) -> &[ThresholdRange] {
        match profile {
            ActuatorProfile::SlowClimb => &self.slow_climb,
            ActuatorProfile::SharpTurn => &self.sharp_turn,
            ActuatorProfile::QuickDrop => &self.quick_drop,
        }
    }

    fn ranges_mut(&mut self, profile: ActuatorProfile) -> &mut [ThresholdRange] {
        match profile {
            ActuatorProfile::SlowClimb => &mut self.slow_climb,
            ActuatorProfile::SharpTurn => &mut self.sharp_turn,
            ActuatorProfile::QuickDrop => &mut self.quick_drop,
        }
    }

    /// Replaces the window for `range.axis` under `profile`.
    ///
    /// Returns `None` when the profile does not constrain that axis.
    pub fn with_range(mut self, profile: ActuatorProfile, range: ThresholdRange) -> Option<Self> {
        let slot = self
            .ranges_mut(profile)
            .iter_mut()
            .find(|existing| existing.axis == range.axis)?;
        *slot = range;
        Some(self)
    }

    /// Returns `true` when every window is ordered and sits on a constrained axis.
    pub fn is_valid(&self) -> bool {
        ActuatorProfile::ALL.into_iter().all(|profile| {
            let ranges = self.ranges(profile);
            ranges.len() == profile.constrained_axes().len()
                && ranges
                    .iter()
                    .zip(profile.constrained_axes())
                    .all(|(range, axis)| range.axis == *axis && range.is_ordered())
        })
    }
}

impl Default for ProfileLimits {
    fn default() -> Self {
        Self {
            // |y| <= 1 g, 6 g <= z <= 8 g
            slow_climb: [
                ThresholdRange::from_mg(Axis::Y, -1_000, 1_000),
                ThresholdRange::from_mg(Axis::Z, 6_000, 8_000),
            ],
            // x > 5 g and y > 5 g
            sharp_turn: [
                ThresholdRange::new(Axis::X, mg_to_lsb_floor(5_000) + 1, FULL_SCALE_MAX),
                ThresholdRange::new(Axis::Y, mg_to_lsb_floor(5_000) + 1, FULL_SCALE_MAX),
            ],
            // z < -8 g
            quick_drop: [ThresholdRange::new(Axis::Z, FULL_SCALE_MIN, mg_to_lsb_ceil(-8_000) - 1)],
        }
    }
}

/// First sample that left a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Violation {
    /// Window that was violated.
    pub range: ThresholdRange,
    /// Offending value.
    pub value: i32,
    /// Index of the offending sample.
    pub sample: usize,
}

/// Checks `samples` against `ranges`.
///
/// Ranges are walked in order and, within a range, samples in order; the first
/// miss is returned. Axes without a range are never looked at.
pub fn evaluate(ranges: &[ThresholdRange], samples: &[AxisReading]) -> Option<Violation> {
    ranges.iter().find_map(|range| {
        samples.iter().enumerate().find_map(|(index, reading)| {
            range.check(reading).map(|value| Violation {
                range: *range,
                value,
                sample: index,
            })
        })
    })
}
