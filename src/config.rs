//! I3G4250D Control Register Configuration
//!
//! The four control registers written at start-up select:
//! - Output data rate and bandwidth (CTRL_REG1)
//! - Power mode and which axes are active (CTRL_REG1)
//! - High-pass filter mode and cut-off (CTRL_REG2)
//! - Data endianness and full-scale range (CTRL_REG4)
//! - High-pass filter enable (CTRL_REG5)
//!
//! [`DeviceConfig`] gathers these together with the conversion settings used
//! when turning raw counts into angular velocity.

use crate::gyro::{AngularUnit, Gyro, GyroFullScale};

/// Output data rate selection (CTRL_REG1 bits 7:6).
///
/// Nominal rates are 100, 200, 400 and 800 Hz.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputDataRate {
    Odr100 = 0x00,
    Odr200 = 0x40,
    Odr400 = 0x80,
    Odr800 = 0xC0,
}

/// Bandwidth selection (CTRL_REG1 bits 5:4).
///
/// The actual cut-off depends on the selected data rate, `Bw4` is always
/// the widest.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bandwidth {
    Bw1 = 0x00,
    Bw2 = 0x10,
    Bw3 = 0x20,
    Bw4 = 0x30,
}

/// Power mode (CTRL_REG1 bit 3).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PowerMode {
    PowerDown = 0x00,
    Active = 0x08,
}

/// Axis enable flags (CTRL_REG1 bits 2:0).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Axes {
    flags: u8,
}

impl Axes {
    const X: u8 = 1 << 0;
    const Y: u8 = 1 << 1;
    const Z: u8 = 1 << 2;

    pub const fn all() -> Self {
        Self {
            flags: Self::X | Self::Y | Self::Z,
        }
    }

    pub const fn none() -> Self {
        Self { flags: 0 }
    }

    pub const fn with_x(self, value: bool) -> Self {
        self.with_flag(value, Self::X)
    }

    pub const fn with_y(self, value: bool) -> Self {
        self.with_flag(value, Self::Y)
    }

    pub const fn with_z(self, value: bool) -> Self {
        self.with_flag(value, Self::Z)
    }

    const fn with_flag(self, value: bool, flag: u8) -> Self {
        Self {
            flags: if value {
                self.flags | flag
            } else {
                self.flags & !flag
            },
        }
    }

    pub const fn bits(self) -> u8 {
        self.flags
    }
}

/// High-pass filter mode (CTRL_REG2 bits 5:4).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HighPassMode {
    /// Normal mode, reset by reading the reference register
    NormalReset = 0x00,
    /// Reference signal for filtering
    Reference = 0x10,
    /// Normal mode
    Normal = 0x20,
    /// Autoreset on interrupt event
    AutoResetOnInterrupt = 0x30,
}

/// High-pass filter cut-off selection (CTRL_REG2 bits 3:0).
///
/// The cut-off frequency in Hz depends on the output data rate; lower
/// values are higher cut-offs. Only 0 through 9 are defined.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HighPassCutoff(u8);

impl HighPassCutoff {
    pub const MAX: u8 = 9;

    /// Returns `None` for undefined selections.
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl Default for HighPassCutoff {
    fn default() -> Self {
        Self(0)
    }
}

/// Output byte order (CTRL_REG4 bit 6).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endianness {
    LsbAtLowerAddress = 0x00,
    MsbAtLowerAddress = 0x40,
}

impl Endianness {
    /// Fix up a register pair combined with the lower address as low byte.
    pub const fn to_native(self, word: u16) -> u16 {
        match self {
            Self::LsbAtLowerAddress => word,
            Self::MsbAtLowerAddress => word.swap_bytes(),
        }
    }
}

/// High-pass filter enable (CTRL_REG5 bit 4).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HighPassFilter {
    Disabled = 0x00,
    Enabled = 0x10,
}

/// Everything the device session needs: control register contents plus the
/// raw-to-physical conversion settings.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    pub data_rate: OutputDataRate,
    pub bandwidth: Bandwidth,
    pub power_mode: PowerMode,
    pub axes: Axes,
    pub high_pass_mode: HighPassMode,
    pub high_pass_cutoff: HighPassCutoff,
    pub endianness: Endianness,
    pub full_scale: GyroFullScale,
    pub high_pass_filter: HighPassFilter,
    /// Zero-rate offsets in raw counts, subtracted before scaling
    pub offsets: Gyro,
    /// Unit of the converted samples
    pub unit: AngularUnit,
}

/// Zero-rate offsets measured on the reference board.
pub const DEFAULT_OFFSETS: Gyro = Gyro::new(11, -3, -20);

impl DeviceConfig {
    /// 100 Hz, widest bandwidth, all axes active, 500 dps, high-pass filter
    /// enabled in normal-with-reset mode.
    pub const fn new() -> Self {
        Self {
            data_rate: OutputDataRate::Odr100,
            bandwidth: Bandwidth::Bw4,
            power_mode: PowerMode::Active,
            axes: Axes::all(),
            high_pass_mode: HighPassMode::NormalReset,
            high_pass_cutoff: HighPassCutoff(0),
            endianness: Endianness::LsbAtLowerAddress,
            full_scale: GyroFullScale::Dps500,
            high_pass_filter: HighPassFilter::Enabled,
            offsets: DEFAULT_OFFSETS,
            unit: AngularUnit::DegreesPerSecond,
        }
    }

    /// Change zero-rate offsets
    /// (consumes and returns `Self` to be callable in a "builder-like" pattern)
    pub const fn with_offsets(self, offsets: Gyro) -> Self {
        Self { offsets, ..self }
    }

    /// Change output unit
    pub const fn with_unit(self, unit: AngularUnit) -> Self {
        Self { unit, ..self }
    }

    /// Change full-scale range
    pub const fn with_full_scale(self, full_scale: GyroFullScale) -> Self {
        Self { full_scale, ..self }
    }

    /// Change output data rate and bandwidth
    pub const fn with_data_rate(self, data_rate: OutputDataRate, bandwidth: Bandwidth) -> Self {
        Self {
            data_rate,
            bandwidth,
            ..self
        }
    }

    /// Change output byte order
    pub const fn with_endianness(self, endianness: Endianness) -> Self {
        Self { endianness, ..self }
    }

    /// Change high-pass filter settings
    pub const fn with_high_pass(
        self,
        filter: HighPassFilter,
        mode: HighPassMode,
        cutoff: HighPassCutoff,
    ) -> Self {
        Self {
            high_pass_filter: filter,
            high_pass_mode: mode,
            high_pass_cutoff: cutoff,
            ..self
        }
    }

    pub const fn ctrl_reg1(&self) -> u8 {
        self.data_rate as u8 | self.bandwidth as u8 | self.power_mode as u8 | self.axes.bits()
    }

    pub const fn ctrl_reg2(&self) -> u8 {
        self.high_pass_mode as u8 | self.high_pass_cutoff.bits()
    }

    pub const fn ctrl_reg4(&self) -> u8 {
        self.endianness as u8 | self.full_scale.bits()
    }

    pub const fn ctrl_reg5(&self) -> u8 {
        self.high_pass_filter as u8
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_register_values() {
        let config = DeviceConfig::default();
        assert_eq!(config.ctrl_reg1(), 0x3F);
        assert_eq!(config.ctrl_reg2(), 0x00);
        assert_eq!(config.ctrl_reg4(), 0x10);
        assert_eq!(config.ctrl_reg5(), 0x10);
    }

    #[test]
    fn axis_flags() {
        let axes = Axes::all().with_y(false);
        assert_eq!(axes.bits(), 0b101);
        assert_eq!(Axes::none().with_z(true).bits(), 0b100);
    }

    #[test]
    fn cutoff_rejects_undefined_values() {
        assert!(HighPassCutoff::new(9).is_some());
        assert!(HighPassCutoff::new(10).is_none());
    }

    #[test]
    fn big_endian_output_sets_ctrl4_and_swaps_words() {
        let config = DeviceConfig::new().with_endianness(Endianness::MsbAtLowerAddress);
        assert_eq!(config.ctrl_reg4(), 0x50);
        assert_eq!(config.endianness.to_native(0x3412), 0x1234);
        assert_eq!(Endianness::LsbAtLowerAddress.to_native(0x3412), 0x3412);
    }

    #[test]
    fn builder_changes_full_scale_bits() {
        let config = DeviceConfig::new().with_full_scale(GyroFullScale::Dps2000);
        assert_eq!(config.ctrl_reg4(), 0x20);
    }
}
