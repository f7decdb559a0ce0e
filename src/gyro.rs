use crate::sample::AxisSample;

/// Raw gyro readings vector, in two's-complement counts.
/// Also used to represent zero-rate calibration offsets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gyro {
    pub(crate) x: i16,
    pub(crate) y: i16,
    pub(crate) z: i16,
}

impl Gyro {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Build from three combined low/high register pairs.
    pub fn from_words(x: u16, y: u16, z: u16) -> Self {
        Self {
            x: x as i16,
            y: y as i16,
            z: z as i16,
        }
    }

    pub fn x(&self) -> i16 {
        self.x
    }

    pub fn y(&self) -> i16 {
        self.y
    }

    pub fn z(&self) -> i16 {
        self.z
    }

    /// Subtract `offsets` and convert to physical units.
    pub fn scaled(&self, scale: GyroFullScale, offsets: &Gyro, unit: AngularUnit) -> AxisSample {
        AxisSample::new(
            unit.from_dps(scale.scale_value(self.x as i32 - offsets.x as i32)),
            unit.from_dps(scale.scale_value(self.y as i32 - offsets.y as i32)),
            unit.from_dps(scale.scale_value(self.z as i32 - offsets.z as i32)),
        )
    }
}

/// Full-scale selection (CTRL_REG4 bits 5:4).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GyroFullScale {
    Dps245 = 0,
    Dps500 = 1,
    Dps2000 = 2,
}

impl GyroFullScale {
    /// Sensitivity in millidegrees per second per LSB.
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::Dps245 => 8.75,
            Self::Dps500 => 17.50,
            Self::Dps2000 => 70.00,
        }
    }

    pub const fn bits(self) -> u8 {
        (self as u8) << 4
    }

    /// Counts to degrees per second.
    pub fn scale_value(self, value: i32) -> f32 {
        (value as f32) * self.sensitivity() / 1000.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AngularUnit {
    #[default]
    DegreesPerSecond,
    RadiansPerSecond,
}

impl AngularUnit {
    pub fn from_dps(self, dps: f32) -> f32 {
        match self {
            Self::DegreesPerSecond => dps,
            Self::RadiansPerSecond => dps * core::f32::consts::PI / 180.0,
        }
    }
}
