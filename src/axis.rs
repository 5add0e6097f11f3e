//! Axis readings and inclusive threshold windows.

use core::fmt;

/// Nominal full-resolution scale factor, in tenths of a milli-g per LSB (3.9 mg/LSB).
pub const SCALE_DECI_MG_PER_LSB: i32 = 39;

/// Converts a full-resolution count to milli-g.
pub const fn lsb_to_mg(lsb: i32) -> i32 {
    lsb * SCALE_DECI_MG_PER_LSB / 10
}

/// Largest full-resolution count not above `mg`.
pub const fn mg_to_lsb_floor(mg: i32) -> i32 {
    let scaled = mg * 10;
    let count = scaled / SCALE_DECI_MG_PER_LSB;
    if scaled % SCALE_DECI_MG_PER_LSB != 0 && scaled < 0 {
        count - 1
    } else {
        count
    }
}

/// Smallest full-resolution count not below `mg`.
pub const fn mg_to_lsb_ceil(mg: i32) -> i32 {
    let scaled = mg * 10;
    let count = scaled / SCALE_DECI_MG_PER_LSB;
    if scaled % SCALE_DECI_MG_PER_LSB != 0 && scaled > 0 {
        count + 1
    } else {
        count
    }
}

/// Sensor axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// All axes in evaluation order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Lower-case axis label.
    pub const fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One acceleration sample, in full-resolution counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisReading {
    /// X-axis reading.
    pub x: i32,
    /// Y-axis reading.
    pub y: i32,
    /// Z-axis reading.
    pub z: i32,
}

impl AxisReading {
    /// Creates a reading from its components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Decodes the six little-endian bytes of `DATAX0..DATAZ1`.
    pub fn from_le_bytes(raw: [u8; 6]) -> Self {
        Self {
            x: i16::from_le_bytes([raw[0], raw[1]]) as i32,
            y: i16::from_le_bytes([raw[2], raw[3]]) as i32,
            z: i16::from_le_bytes([raw[4], raw[5]]) as i32,
        }
    }

    /// Returns the component for `axis`.
    pub const fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Per-axis difference `self - baseline`.
    pub const fn delta_from(&self, baseline: &AxisReading) -> AxisReading {
        AxisReading {
            x: self.x - baseline.x,
            y: self.y - baseline.y,
            z: self.z - baseline.z,
        }
    }

    /// Returns the reading converted to milli-g.
    pub const fn to_mg(&self) -> AxisReading {
        AxisReading {
            x: lsb_to_mg(self.x),
            y: lsb_to_mg(self.y),
            z: lsb_to_mg(self.z),
        }
    }
}

impl fmt::Display for AxisReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{x: {}, y: {}, z: {}}}", self.x, self.y, self.z)
    }
}

/// Inclusive acceptable window for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThresholdRange {
    /// Axis the window applies to.
    pub axis: Axis,
    /// Smallest accepted value.
    pub min: i32,
    /// Largest accepted value.
    pub max: i32,
}

impl ThresholdRange {
    /// Creates a window in full-resolution counts.
    pub const fn new(axis: Axis, min: i32, max: i32) -> Self {
        Self { axis, min, max }
    }

    /// Creates a window from inclusive bounds expressed in milli-g.
    ///
    /// Bounds round inward so no accepted count lies outside `[min_mg, max_mg]`.
    pub const fn from_mg(axis: Axis, min_mg: i32, max_mg: i32) -> Self {
        Self::new(axis, mg_to_lsb_ceil(min_mg), mg_to_lsb_floor(max_mg))
    }

    /// Returns `true` when `value` lies within `[min, max]`.
    pub const fn contains(&self, value: i32) -> bool {
        self.min <= value && value <= self.max
    }

    /// Returns `true` when `min <= max`.
    pub const fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    /// Checks this window's axis of `reading`.
    pub const fn check(&self, reading: &AxisReading) -> Option<i32> {
        let value = reading.get(self.axis);
        if self.contains(value) { None } else { Some(value) }
    }
}

impl fmt::Display for ThresholdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}, {}]", self.axis, self.min, self.max)
    }
}
