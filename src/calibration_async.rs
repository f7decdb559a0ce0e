//! Async Zero-Rate Calibration
//!
//! Same procedure as [`crate::calibration_blocking`], awaiting the bus and
//! the delay between readings.

use crate::{
    calibration::{MeanAccumulator, ZeroRateParameters},
    device_async::Device,
    error::Error,
    gyro::Gyro,
    transport_async::RegisterTransport,
};
use embedded_hal_async::delay::DelayNs;

/// Discard the warmup readings, then average the rest
pub async fn collect_zero_rate<T>(
    device: &mut Device<T>,
    delay: &mut impl DelayNs,
    parameters: &ZeroRateParameters,
) -> Result<Gyro, Error<T::Error>>
where
    T: RegisterTransport,
{
    let mut accumulator = MeanAccumulator::new();

    for _ in 0..parameters.warmup_iterations {
        _ = device.read_raw().await?;
        delay.delay_ms(parameters.delay_ms).await;
    }

    for _ in 0..parameters.iterations {
        let gyro = device.read_raw().await?;
        accumulator.add(&gyro);
        delay.delay_ms(parameters.delay_ms).await;
    }

    Ok(accumulator.means())
}
