//! End-of-run distance estimation.
//!
//! Every stored velocity is multiplied by the sample period to get a
//! per-axis displacement. One scalar contribution per tick is derived from
//! it (see [`DistanceModel`]) and summed in tick order. The sum is then
//! calibrated exactly once:
//!
//! ```text
//! distance = max(raw - offset, 0) / scale
//! ```

use heapless::Vec;
use log::info;

use crate::{sample::VelocitySample, window::SampleWindow, window::TICKS_PER_RUN};

/// Seconds between two sampling ticks.
///
/// A [`crate::controller::RunController`] replaces the period with the one
/// derived from its [`crate::controller::RunTiming`].
pub const DEFAULT_SAMPLE_PERIOD: f32 = 0.5;

/// How a tick's three displacements collapse into one contribution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceModel {
    /// `|dx|`; the y and z displacements are ignored.
    ///
    /// The calibration constants of the reference rig were tuned against
    /// this model, so it stays the default even though it throws away two
    /// thirds of the sensor.
    #[default]
    FirstAxis,
    /// `sqrt(dx² + dy² + dz²)`
    Euclidean,
}

impl DistanceModel {
    pub fn contribution(self, displacement: [f32; 3]) -> f32 {
        let [dx, dy, dz] = displacement;
        match self {
            Self::FirstAxis => libm::sqrtf(dx * dx),
            Self::Euclidean => libm::sqrtf(dx * dx + dy * dy + dz * dz),
        }
    }
}

/// Empirical offset and scale applied to the summed distance.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceCalibration {
    offset: f64,
    scale: f64,
}

impl DistanceCalibration {
    /// Values fitted on the reference rig.
    pub const fn new() -> Self {
        Self {
            offset: 0.035,
            scale: 0.165,
        }
    }

    /// No adjustment.
    pub const fn identity() -> Self {
        Self {
            offset: 0.0,
            scale: 1.0,
        }
    }

    /// Returns `None` unless `scale` is finite and positive.
    pub fn try_new(offset: f64, scale: f64) -> Option<Self> {
        if scale > 0.0 && scale.is_finite() && offset.is_finite() {
            Some(Self { offset, scale })
        } else {
            None
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn apply(&self, raw: f64) -> f64 {
        let shifted = raw - self.offset;
        let clamped = if shifted < 0.0 { 0.0 } else { shifted };
        clamped / self.scale
    }
}

impl Default for DistanceCalibration {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregatorConfig {
    /// Time between ticks, in the unit the distance is reported per
    pub sample_period: f32,
    pub model: DistanceModel,
    pub calibration: DistanceCalibration,
}

impl AggregatorConfig {
    pub const fn new() -> Self {
        Self {
            sample_period: DEFAULT_SAMPLE_PERIOD,
            model: DistanceModel::FirstAxis,
            calibration: DistanceCalibration::new(),
        }
    }

    pub const fn with_sample_period(self, sample_period: f32) -> Self {
        Self {
            sample_period,
            ..self
        }
    }

    pub const fn with_model(self, model: DistanceModel) -> Self {
        Self { model, ..self }
    }

    pub const fn with_calibration(self, calibration: DistanceCalibration) -> Self {
        Self {
            calibration,
            ..self
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-tick contributions of one run plus their calibrated total.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DistanceSeries<const N: usize = TICKS_PER_RUN> {
    contributions: Vec<f32, N>,
    raw_cumulative: f64,
    cumulative_distance: f64,
}

impl<const N: usize> DistanceSeries<N> {
    /// Uncalibrated per-tick contributions, in tick order.
    pub fn contributions(&self) -> &[f32] {
        &self.contributions
    }

    /// Sum of the contributions before calibration.
    pub fn raw_cumulative(&self) -> f64 {
        self.raw_cumulative
    }

    /// Calibrated total, never negative.
    pub fn cumulative_distance(&self) -> f64 {
        self.cumulative_distance
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct DistanceAggregator {
    config: AggregatorConfig,
}

impl DistanceAggregator {
    pub const fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Same aggregator integrating over `sample_period` seconds per tick.
    pub fn with_sample_period(self, sample_period: f32) -> Self {
        Self {
            config: self.config.with_sample_period(sample_period),
        }
    }

    fn displacement(&self, velocity: &VelocitySample) -> [f32; 3] {
        let period = self.config.sample_period;
        velocity.to_array().map(|v| v * period)
    }

    /// Integrate every stored velocity and calibrate the total.
    pub fn finalize<const N: usize>(&self, window: &SampleWindow<N>) -> DistanceSeries<N> {
        let mut series = DistanceSeries::<N>::default();
        for velocity in window.velocities() {
            let contribution = self.config.model.contribution(self.displacement(velocity));
            // The window never holds more than N velocities.
            let _ = series.contributions.push(contribution);
            series.raw_cumulative += contribution as f64;
        }
        series.cumulative_distance = self.config.calibration.apply(series.raw_cumulative);
        info!(
            "distance over {} ticks: raw {} calibrated {}",
            series.contributions.len(),
            series.raw_cumulative,
            series.cumulative_distance
        );
        series
    }
}
