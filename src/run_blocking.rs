//! Blocking Control Loop
//!
//! Owns every collaborator of the odometer and runs the measurement cycle:
//! - show the prompt and wait for the start trigger (first cycle only)
//! - settle, then sample one reading per tick and show it live
//! - compute and show the summary
//! - wait for the restart trigger
//!
//! The trigger input is polled; pressed reads as high.

use core::convert::Infallible;

use embedded_hal::{delay::DelayNs, digital::InputPin};
use log::{info, warn};

use crate::{
    controller::{RunController, RunState},
    device::Device,
    error::Error,
    presentation::Dashboard,
    transport::RegisterTransport,
    window::TICKS_PER_RUN,
};

pub struct Runner<T, P, D, W, const N: usize = TICKS_PER_RUN> {
    device: Device<T>,
    trigger: P,
    dashboard: D,
    delay: W,
    controller: RunController<N>,
}

impl<T, P, D, W, const N: usize> Runner<T, P, D, W, N>
where
    T: RegisterTransport,
    P: InputPin,
    D: Dashboard,
    W: DelayNs,
{
    pub fn new(
        device: Device<T>,
        trigger: P,
        dashboard: D,
        delay: W,
        controller: RunController<N>,
    ) -> Self {
        Self {
            device,
            trigger,
            dashboard,
            delay,
            controller,
        }
    }

    pub fn controller(&self) -> &RunController<N> {
        &self.controller
    }

    pub fn device(&mut self) -> &mut Device<T> {
        &mut self.device
    }

    /// Returns the collaborators, consuming this runner.
    pub fn release(self) -> (Device<T>, P, D, W) {
        (self.device, self.trigger, self.dashboard, self.delay)
    }

    /// Poll the trigger until it reads pressed.
    pub fn wait_for_trigger(&mut self) -> Result<(), Error<T::Error>> {
        loop {
            if self.trigger.is_high().map_err(|_| Error::<T::Error>::Trigger)? {
                return Ok(());
            }
            self.delay.delay_ms(self.controller.timing().poll_interval_ms);
        }
    }

    fn sample_until_full(&mut self) -> Result<(), Error<T::Error>> {
        while let RunState::Sampling { .. } = self.controller.state() {
            let axes = self.device.read_axes()?;
            let reading = self.controller.on_sample::<T::Error>(axes)?;
            self.dashboard
                .show_live(&reading)
                .map_err(|_| Error::<T::Error>::Dashboard)?;
            self.delay
                .delay_ms(self.controller.timing().sample_interval_ms);
        }
        Ok(())
    }

    /// Run one cycle from the trigger to the summary.
    ///
    /// Returns the calibrated distance of the completed run.
    pub fn run_cycle(&mut self) -> Result<f64, Error<T::Error>> {
        match self.controller.state() {
            RunState::Idle => {
                self.dashboard.show_prompt().map_err(|_| Error::<T::Error>::Dashboard)?;
                self.wait_for_trigger()?;
                self.controller.start::<T::Error>()?;
            }
            RunState::AwaitingRestart => {
                self.wait_for_trigger()?;
                self.controller.restart::<T::Error>()?;
            }
            state => warn!("resuming interrupted run in state {:?}", state),
        }
        if self.controller.state() == (RunState::Sampling { tick: 0 }) {
            self.delay.delay_ms(self.controller.timing().start_settle_ms);
        }

        self.sample_until_full()?;

        let summary = self.controller.summarize::<T::Error>()?;
        let distance = summary.total_distance;
        self.dashboard
            .show_summary(&summary)
            .map_err(|_| Error::<T::Error>::Dashboard)?;
        info!("distance travelled: {} m", distance);
        Ok(distance)
    }

    /// Run cycles forever. Only returns on error.
    pub fn run(&mut self) -> Result<Infallible, Error<T::Error>> {
        loop {
            self.run_cycle()?;
        }
    }
}
