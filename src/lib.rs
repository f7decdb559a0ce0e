//! Gyroscope odometer for the ST I3G4250D.
//!
//! Reads angular rate over SPI on a fixed cadence, derives per-axis linear
//! velocity, integrates it into a calibrated distance at the end of each
//! run and hands everything to a [`presentation::Dashboard`].

#![no_std]

#[cfg(test)]
extern crate std;

pub mod aggregator;
pub mod calibration;
pub mod calibration_async;
pub mod calibration_blocking;
pub mod config;
pub mod controller;
pub mod device;
pub mod device_async;
pub mod error;
pub mod gyro;
pub mod presentation;
pub mod processor;
pub mod registers;
pub mod run_async;
pub mod run_blocking;
pub mod sample;
pub mod transport;
pub mod transport_async;
pub mod window;

#[cfg(test)]
mod testing;
