use crate::gyro::Gyro;

/// Number of warmup iterations (when values are discarded)
pub(crate) const WARMUP_ITERATIONS: usize = 30;
/// Number of iterations for average computation
pub(crate) const ITERATIONS: usize = 200;
/// Delay between measurements
pub(crate) const DELAY_MS: u32 = 2;

/// Zero-rate measurement parameters.
/// (the device must stay still while they are in effect)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZeroRateParameters {
    /// Readings discarded before averaging starts
    pub warmup_iterations: usize,
    /// Readings averaged into the offsets
    pub iterations: usize,
    /// Pause between readings
    pub delay_ms: u32,
}

impl ZeroRateParameters {
    pub const fn new() -> Self {
        Self {
            warmup_iterations: WARMUP_ITERATIONS,
            iterations: ITERATIONS,
            delay_ms: DELAY_MS,
        }
    }

    /// Change warmup iterations count
    /// (consumes and returns `Self` to be callable in a "builder-like" pattern)
    pub fn with_warmup_iterations(self, warmup_iterations: usize) -> Self {
        Self {
            warmup_iterations,
            ..self
        }
    }

    /// Change iterations count
    /// (consumes and returns `Self` to be callable in a "builder-like" pattern)
    pub fn with_iterations(self, iterations: usize) -> Self {
        Self { iterations, ..self }
    }

    pub fn with_delay_ms(self, delay_ms: u32) -> Self {
        Self { delay_ms, ..self }
    }
}

impl Default for ZeroRateParameters {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds temporary sums during mean computation
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct MeanAccumulator {
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub count: i64,
}

impl MeanAccumulator {
    pub const fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            z: 0,
            count: 0,
        }
    }

    pub fn add(&mut self, gyro: &Gyro) {
        self.x += gyro.x() as i64;
        self.y += gyro.y() as i64;
        self.z += gyro.z() as i64;
        self.count += 1;
    }

    /// Compute average values (consumes `self` because the computation is done).
    /// An empty accumulator yields zero offsets.
    pub fn means(self) -> Gyro {
        if self.count == 0 {
            return Gyro::default();
        }
        Gyro::new(
            (self.x / self.count) as i16,
            (self.y / self.count) as i16,
            (self.z / self.count) as i16,
        )
    }
}
