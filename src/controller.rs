//! Measurement run state machine.
//!
//! ```text
//! Idle --start--> Sampling{0} --on_sample x N--> Summarizing
//!                      ^                              |
//!                      |                          summarize
//!                   restart                           v
//!                      +------------------------ AwaitingRestart
//! ```
//!
//! [`RunController`] does no I/O. The runners in [`crate::run_blocking`] and
//! [`crate::run_async`] feed it readings, pace it and forward its output to a
//! dashboard.

use log::info;

use crate::{
    aggregator::{AggregatorConfig, DistanceAggregator},
    error::Error,
    presentation::{LiveReading, RunSummary},
    processor::{Processed, ProcessorConfig, SampleProcessor},
    sample::AxisSample,
    window::{MeasurementRun, TICKS_PER_RUN},
};

/// Interval between sampling ticks
pub const SAMPLE_INTERVAL_MS: u32 = 500;
/// Interval between trigger polls
pub const POLL_INTERVAL_MS: u32 = 3;
/// Pause between the start trigger and the first tick
pub const START_SETTLE_MS: u32 = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum RunState {
    /// Waiting for the first start trigger
    Idle,
    /// Collecting readings, `tick` is the next one to record
    Sampling { tick: usize },
    /// All ticks recorded, distance not computed yet
    Summarizing,
    /// Summary shown, waiting for the restart trigger
    AwaitingRestart,
}

/// Run cadence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunTiming {
    pub sample_interval_ms: u32,
    pub poll_interval_ms: u32,
    pub start_settle_ms: u32,
}

impl RunTiming {
    pub const fn new() -> Self {
        Self {
            sample_interval_ms: SAMPLE_INTERVAL_MS,
            poll_interval_ms: POLL_INTERVAL_MS,
            start_settle_ms: START_SETTLE_MS,
        }
    }

    pub const fn with_sample_interval_ms(self, sample_interval_ms: u32) -> Self {
        Self {
            sample_interval_ms,
            ..self
        }
    }

    pub const fn with_poll_interval_ms(self, poll_interval_ms: u32) -> Self {
        Self {
            poll_interval_ms,
            ..self
        }
    }

    pub const fn with_start_settle_ms(self, start_settle_ms: u32) -> Self {
        Self {
            start_settle_ms,
            ..self
        }
    }

    /// Seconds between two sampling ticks.
    pub fn sample_period(&self) -> f32 {
        self.sample_interval_ms as f32 / 1000.0
    }

    /// Seconds elapsed at the start of `tick`.
    pub fn elapsed(&self, tick: usize) -> f32 {
        tick as f32 * self.sample_interval_ms as f32 / 1000.0
    }
}

impl Default for RunTiming {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives one [`MeasurementRun`] of `N` ticks at a time.
pub struct RunController<const N: usize = TICKS_PER_RUN> {
    processor: SampleProcessor,
    aggregator: DistanceAggregator,
    timing: RunTiming,
    run: MeasurementRun<N>,
    state: RunState,
}

impl<const N: usize> RunController<N> {
    /// The aggregator integrates over the sampling interval of `timing`.
    pub fn new(
        processor: SampleProcessor,
        aggregator: DistanceAggregator,
        timing: RunTiming,
    ) -> Self {
        Self {
            processor,
            aggregator: aggregator.with_sample_period(timing.sample_period()),
            timing,
            run: MeasurementRun::new(),
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn run(&self) -> &MeasurementRun<N> {
        &self.run
    }

    pub fn timing(&self) -> &RunTiming {
        &self.timing
    }

    pub const fn ticks_per_run(&self) -> usize {
        N
    }

    fn invalid<E>(&self) -> Error<E> {
        Error::InvalidState { state: self.state }
    }

    /// Leave `Idle` and begin the first run.
    pub fn start<E>(&mut self) -> Result<(), Error<E>> {
        if self.state != RunState::Idle {
            return Err(self.invalid());
        }
        self.run.reset();
        self.state = RunState::Sampling { tick: 0 };
        info!("measurement run started");
        Ok(())
    }

    /// Process and record the reading for the current tick.
    ///
    /// After the last tick the controller moves to `Summarizing`.
    pub fn on_sample<E>(&mut self, raw: AxisSample) -> Result<LiveReading, Error<E>> {
        let RunState::Sampling { tick } = self.state else {
            return Err(self.invalid());
        };
        let Processed { sample, velocity } = self
            .processor
            .process_into::<E, N>(&mut self.run, raw, tick)?;
        let next = tick + 1;
        self.state = if next >= N {
            RunState::Summarizing
        } else {
            RunState::Sampling { tick: next }
        };
        Ok(LiveReading {
            tick,
            axes: sample,
            velocity,
            elapsed: self.timing.elapsed(tick),
        })
    }

    /// Compute the run's distance. Allowed once per run.
    pub fn summarize<E>(&mut self) -> Result<RunSummary<'_>, Error<E>> {
        if self.state != RunState::Summarizing {
            return Err(self.invalid());
        }
        let series = self.aggregator.finalize(self.run.window());
        self.run.set_series(series);
        self.state = RunState::AwaitingRestart;
        info!(
            "measurement run finished: {} m",
            self.run.cumulative_distance()
        );
        Ok(self.summary_of_run())
    }

    /// Summary of the finished run, if there is one.
    pub fn summary(&self) -> Option<RunSummary<'_>> {
        match self.state {
            RunState::AwaitingRestart => Some(self.summary_of_run()),
            _ => None,
        }
    }

    fn summary_of_run(&self) -> RunSummary<'_> {
        RunSummary {
            series: self
                .run
                .series()
                .map_or(&[][..], |series| series.contributions()),
            total_distance: self.run.cumulative_distance(),
        }
    }

    /// Clear the finished run and begin the next one.
    pub fn restart<E>(&mut self) -> Result<(), Error<E>> {
        if self.state != RunState::AwaitingRestart {
            return Err(self.invalid());
        }
        self.run.reset();
        self.state = RunState::Sampling { tick: 0 };
        info!("measurement run restarted");
        Ok(())
    }
}

impl<const N: usize> Default for RunController<N> {
    fn default() -> Self {
        Self::new(
            SampleProcessor::new(ProcessorConfig::new()),
            DistanceAggregator::new(AggregatorConfig::new()),
            RunTiming::new(),
        )
    }
}
