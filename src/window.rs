//! Bounded per-run storage.
//!
//! A [`SampleWindow`] holds one run's validated samples and the velocities
//! derived from them, indexed by tick. A [`MeasurementRun`] owns the window
//! together with the distance series computed at the end of the run.

use heapless::Vec;
use log::warn;

use crate::{
    aggregator::DistanceSeries,
    error::Error,
    sample::{AxisSample, VelocitySample},
};

/// Ticks in one measurement run.
pub const TICKS_PER_RUN: usize = 40;

/// Fixed-capacity parallel sequences of samples and velocities.
///
/// Entries are appended strictly in tick order. Writing at or beyond the
/// capacity fails with [`Error::CapacityExceeded`] and leaves the window
/// unchanged.
#[derive(Clone, Debug, Default)]
pub struct SampleWindow<const N: usize = TICKS_PER_RUN> {
    samples: Vec<AxisSample, N>,
    velocities: Vec<VelocitySample, N>,
}

impl<const N: usize> SampleWindow<N> {
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
            velocities: Vec::new(),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.is_full()
    }

    /// Store the pair for `tick`, which must be the next free slot.
    pub fn record<E>(
        &mut self,
        tick: usize,
        sample: AxisSample,
        velocity: VelocitySample,
    ) -> Result<(), Error<E>> {
        if tick >= N {
            warn!("discarding sample for tick {}, window holds {}", tick, N);
            return Err(Error::CapacityExceeded {
                index: tick,
                capacity: N,
            });
        }
        if tick != self.len() {
            return Err(Error::OutOfOrder {
                expected: self.len(),
                got: tick,
            });
        }
        // Both vectors have the same length and tick < N, so neither push can fail.
        let pushed = self.samples.push(sample).is_ok() && self.velocities.push(velocity).is_ok();
        if pushed {
            Ok(())
        } else {
            Err(Error::CapacityExceeded {
                index: tick,
                capacity: N,
            })
        }
    }

    pub fn sample(&self, tick: usize) -> Option<&AxisSample> {
        self.samples.get(tick)
    }

    pub fn velocity(&self, tick: usize) -> Option<&VelocitySample> {
        self.velocities.get(tick)
    }

    /// The most recently recorded sample.
    pub fn last_sample(&self) -> Option<&AxisSample> {
        self.samples.last()
    }

    pub fn samples(&self) -> &[AxisSample] {
        &self.samples
    }

    pub fn velocities(&self) -> &[VelocitySample] {
        &self.velocities
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.velocities.clear();
    }
}

/// State owned by one measurement run.
#[derive(Clone, Debug, Default)]
pub struct MeasurementRun<const N: usize = TICKS_PER_RUN> {
    window: SampleWindow<N>,
    series: Option<DistanceSeries<N>>,
}

impl<const N: usize> MeasurementRun<N> {
    pub const fn new() -> Self {
        Self {
            window: SampleWindow::new(),
            series: None,
        }
    }

    pub fn window(&self) -> &SampleWindow<N> {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut SampleWindow<N> {
        &mut self.window
    }

    pub fn series(&self) -> Option<&DistanceSeries<N>> {
        self.series.as_ref()
    }

    pub fn set_series(&mut self, series: DistanceSeries<N>) {
        self.series = Some(series);
    }

    /// Calibrated distance of the finished run, zero while sampling.
    pub fn cumulative_distance(&self) -> f64 {
        self.series
            .as_ref()
            .map_or(0.0, |series| series.cumulative_distance())
    }

    /// Empty all buffers and zero the distance.
    pub fn reset(&mut self) {
        self.window.clear();
        self.series = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    fn sample(v: f32) -> AxisSample {
        AxisSample::new(v, v, v)
    }

    #[test]
    fn records_in_tick_order_until_full() {
        let mut window: SampleWindow<3> = SampleWindow::new();
        for tick in 0..3 {
            window
                .record::<Infallible>(tick, sample(tick as f32), VelocitySample::zero())
                .unwrap();
        }
        assert!(window.is_full());
        assert_eq!(window.len(), 3);
        assert_eq!(window.sample(2), Some(&sample(2.0)));
    }

    #[test]
    fn writes_past_capacity_fail_and_leave_window_unchanged() {
        let mut window: SampleWindow<2> = SampleWindow::new();
        window
            .record::<Infallible>(0, sample(1.0), VelocitySample::zero())
            .unwrap();
        window
            .record::<Infallible>(1, sample(2.0), VelocitySample::zero())
            .unwrap();

        let result = window.record::<Infallible>(2, sample(3.0), VelocitySample::zero());
        assert_eq!(
            result,
            Err(Error::CapacityExceeded {
                index: 2,
                capacity: 2
            })
        );
        assert_eq!(window.len(), 2);
        assert_eq!(window.last_sample(), Some(&sample(2.0)));
    }

    #[test]
    fn non_sequential_tick_is_rejected() {
        let mut window: SampleWindow<4> = SampleWindow::new();
        let result = window.record::<Infallible>(1, sample(1.0), VelocitySample::zero());
        assert_eq!(result, Err(Error::OutOfOrder { expected: 0, got: 1 }));
        assert!(window.is_empty());
    }

    #[test]
    fn reset_clears_buffers_and_distance() {
        let mut run: MeasurementRun = MeasurementRun::new();
        run.window_mut()
            .record::<Infallible>(0, sample(1.0), VelocitySample::zero())
            .unwrap();
        run.set_series(DistanceSeries::default());
        run.reset();
        assert!(run.window().is_empty());
        assert!(run.series().is_none());
        assert_eq!(run.cumulative_distance(), 0.0);
    }
}
