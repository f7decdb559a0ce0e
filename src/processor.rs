//! Per-tick sample validation and velocity derivation.
//!
//! Readings whose magnitude exceeds the threshold are sensor glitches and are
//! zeroed, not rejected. Linear velocity is a finite difference of consecutive
//! angular readings scaled by a fixed per-axis radius:
//!
//! ```text
//! velocity[axis] = (previous[axis] - current[axis]) * radius[axis]
//! ```
//!
//! The first tick of a run has no previous reading and its velocity is zero.

use log::debug;

use crate::{
    error::Error,
    sample::{AxisSample, VelocitySample},
    window::MeasurementRun,
};

/// Glitch threshold in the session's output unit.
pub const DEFAULT_THRESHOLD: f32 = 500.0;

/// Radius per axis (x, y, z) of the reference rig.
pub const DEFAULT_RADIUS: [f32; 3] = [1.0, 1.0, 0.548];

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessorConfig {
    /// Symmetric validity bound, values with a larger magnitude become zero
    pub threshold: f32,
    /// Assumed radius per axis
    pub radius: [f32; 3],
}

impl ProcessorConfig {
    pub const fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            radius: DEFAULT_RADIUS,
        }
    }

    pub const fn with_threshold(self, threshold: f32) -> Self {
        Self { threshold, ..self }
    }

    pub const fn with_radius(self, radius: [f32; 3]) -> Self {
        Self { radius, ..self }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of one processing step.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Processed {
    /// Input sample with out-of-range axes zeroed
    pub sample: AxisSample,
    pub velocity: VelocitySample,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct SampleProcessor {
    config: ProcessorConfig,
}

impl SampleProcessor {
    pub const fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Zero any axis outside `[-threshold, threshold]`.
    pub fn validate(&self, raw: AxisSample) -> AxisSample {
        let threshold = self.config.threshold;
        AxisSample::from_array(raw.to_array().map(|v| {
            // NaN fails the comparison and is zeroed as well.
            if libm::fabsf(v) <= threshold { v } else { 0.0 }
        }))
    }

    /// Validate `raw` and derive its velocity from `prior`.
    ///
    /// `prior` is ignored at tick 0.
    pub fn process(&self, raw: AxisSample, tick: usize, prior: Option<&AxisSample>) -> Processed {
        let sample = self.validate(raw);
        let velocity = match prior {
            Some(prior) if tick > 0 => {
                let previous = prior.to_array();
                let current = sample.to_array();
                let radius = self.config.radius;
                VelocitySample::new(
                    (previous[0] - current[0]) * radius[0],
                    (previous[1] - current[1]) * radius[1],
                    (previous[2] - current[2]) * radius[2],
                )
            }
            _ => VelocitySample::zero(),
        };
        Processed { sample, velocity }
    }

    /// Process `raw` against the run's previous sample and record the result.
    ///
    /// Fails with [`Error::CapacityExceeded`] once the window is full; nothing
    /// is recorded in that case.
    pub fn process_into<E, const N: usize>(
        &self,
        run: &mut MeasurementRun<N>,
        raw: AxisSample,
        tick: usize,
    ) -> Result<Processed, Error<E>> {
        let prior = tick
            .checked_sub(1)
            .and_then(|previous| run.window().sample(previous))
            .copied();
        let Processed { sample, velocity } = self.process(raw, tick, prior.as_ref());
        debug!(
            "tick {}: gyro [{} {} {}] velocity [{} {} {}]",
            tick,
            sample.x(),
            sample.y(),
            sample.z(),
            velocity.x(),
            velocity.y(),
            velocity.z()
        );
        run.window_mut().record::<E>(tick, sample, velocity)?;
        Ok(Processed { sample, velocity })
    }
}
