//! Blocking Zero-Rate Calibration
//!
//! Averages raw readings of a gyroscope at rest. The mean is the zero-rate
//! level that [`crate::device::Device::read_axes`] subtracts from every
//! reading.

use crate::{
    calibration::{MeanAccumulator, ZeroRateParameters},
    device::Device,
    error::Error,
    gyro::Gyro,
    transport::RegisterTransport,
};
use embedded_hal::delay::DelayNs;

/// Discard the warmup readings, then average the rest
pub fn collect_zero_rate<T>(
    device: &mut Device<T>,
    delay: &mut impl DelayNs,
    parameters: &ZeroRateParameters,
) -> Result<Gyro, Error<T::Error>>
where
    T: RegisterTransport,
{
    let mut accumulator = MeanAccumulator::new();

    for _ in 0..parameters.warmup_iterations {
        _ = device.read_raw()?;
        delay.delay_ms(parameters.delay_ms);
    }

    for _ in 0..parameters.iterations {
        let gyro = device.read_raw()?;
        accumulator.add(&gyro);
        delay.delay_ms(parameters.delay_ms);
    }

    Ok(accumulator.means())
}
