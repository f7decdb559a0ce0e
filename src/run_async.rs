//! Async Control Loop
//!
//! The cycle of [`crate::run_blocking::Runner`] for async firmware: bus
//! access and every pause are awaited, the trigger pin is still polled.

use core::convert::Infallible;

use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;
use log::{info, warn};

use crate::{
    controller::{RunController, RunState},
    device_async::Device,
    error::Error,
    presentation::Dashboard,
    transport_async::RegisterTransport,
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

    pub async fn wait_for_trigger(&mut self) -> Result<(), Error<T::Error>> {
        let poll_interval_ms = self.controller.timing().poll_interval_ms;
        while !self.trigger.is_high().map_err(|_| Error::<T::Error>::Trigger)? {
            self.delay.delay_ms(poll_interval_ms).await;
        }
        Ok(())
    }

    async fn sample_until_full(&mut self) -> Result<(), Error<T::Error>> {
        let interval_ms = self.controller.timing().sample_interval_ms;
        while let RunState::Sampling { .. } = self.controller.state() {
            let axes = self.device.read_axes().await?;
            let reading = self.controller.on_sample::<T::Error>(axes)?;
            self.dashboard
                .show_live(&reading)
                .map_err(|_| Error::<T::Error>::Dashboard)?;
            self.delay.delay_ms(interval_ms).await;
        }
        Ok(())
    }

    /// Run one cycle from the trigger to the summary.
    pub async fn run_cycle(&mut self) -> Result<f64, Error<T::Error>> {
        match self.controller.state() {
            RunState::Idle => {
                self.dashboard.show_prompt().map_err(|_| Error::<T::Error>::Dashboard)?;
                self.wait_for_trigger().await?;
                self.controller.start::<T::Error>()?;
            }
            RunState::AwaitingRestart => {
                self.wait_for_trigger().await?;
                self.controller.restart::<T::Error>()?;
            }
            state => warn!("resuming interrupted run in state {:?}", state),
        }
        if self.controller.state() == (RunState::Sampling { tick: 0 }) {
            let settle_ms = self.controller.timing().start_settle_ms;
            self.delay.delay_ms(settle_ms).await;
        }

        self.sample_until_full().await?;

        let summary = self.controller.summarize::<T::Error>()?;
        let distance = summary.total_distance;
        self.dashboard
            .show_summary(&summary)
            .map_err(|_| Error::<T::Error>::Dashboard)?;
        info!("distance travelled: {} m", distance);
        Ok(distance)
    }

    /// Run cycles forever. Only returns on error.
    pub async fn run(&mut self) -> Result<Infallible, Error<T::Error>> {
        loop {
            self.run_cycle().await?;
        }
    }
}
