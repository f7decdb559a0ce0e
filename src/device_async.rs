//! I3G4250D Asynchronous Driver
//!
//! Mirrors the blocking [`crate::device::Device`] on top of an async
//! [`RegisterTransport`], for firmware running on an async executor.

use embedded_hal_async::delay::DelayNs;
use log::{debug, info, warn};

use crate::{
    calibration::ZeroRateParameters,
    calibration_async::collect_zero_rate,
    config::DeviceConfig,
    error::{Error, InitError},
    gyro::Gyro,
    registers::{Register, DEVICE_ID},
    sample::AxisSample,
    transport_async::RegisterTransport,
};

/// ST I3G4250D driver
pub struct Device<T> {
    transport: T,
    config: DeviceConfig,
}

impl<T> Device<T>
where
    T: RegisterTransport,
{
    pub fn new(transport: T, config: DeviceConfig) -> Self {
        Self { transport, config }
    }

    /// Construct a driver after checking WHO_AM_I.
    pub async fn probe(
        transport: T,
        config: DeviceConfig,
    ) -> Result<Self, InitError<T, T::Error>> {
        let mut device = Self::new(transport, config);
        match device.verify().await {
            Ok(_) => Ok(device),
            Err(error) => Err(InitError {
                error,
                bus: device.transport,
            }),
        }
    }

    /// Returns the underlying transport, consuming this driver.
    pub fn release(self) -> T {
        self.transport
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn set_offsets(&mut self, offsets: Gyro) {
        self.config.offsets = offsets;
    }

    pub async fn device_id(&mut self) -> Result<u8, Error<T::Error>> {
        self.transport.read_register(Register::WhoAmI).await
    }

    pub async fn verify(&mut self) -> Result<u8, Error<T::Error>> {
        let found = self.device_id().await?;
        if found == DEVICE_ID {
            info!("Device verified: I3G4250D (WHO_AM_I: 0x{:02X})", found);
            Ok(found)
        } else {
            Err(Error::WrongDevice {
                expected: DEVICE_ID,
                found,
            })
        }
    }

    pub async fn initialize(&mut self) -> Result<u8, Error<T::Error>> {
        let id = self.device_id().await?;
        if id != DEVICE_ID {
            warn!(
                "unexpected WHO_AM_I 0x{:02X}, expected 0x{:02X}",
                id, DEVICE_ID
            );
        }
        let writes = [
            (Register::CtrlReg1, self.config.ctrl_reg1()),
            (Register::CtrlReg2, self.config.ctrl_reg2()),
            (Register::CtrlReg4, self.config.ctrl_reg4()),
            (Register::CtrlReg5, self.config.ctrl_reg5()),
        ];
        for (reg, value) in writes {
            self.transport.write_register(reg, value).await?;
        }
        info!("gyroscope configured");
        Ok(id)
    }

    pub async fn read_raw(&mut self) -> Result<Gyro, Error<T::Error>> {
        let order = self.config.endianness;
        let x = order.to_native(self.transport.read_pair(Register::OutX_L).await?);
        let y = order.to_native(self.transport.read_pair(Register::OutY_L).await?);
        let z = order.to_native(self.transport.read_pair(Register::OutZ_L).await?);
        let raw = Gyro::from_words(x, y, z);
        debug!("Raw gyro: x={}, y={}, z={}", raw.x(), raw.y(), raw.z());
        Ok(raw)
    }

    pub async fn read_axes(&mut self) -> Result<AxisSample, Error<T::Error>> {
        let raw = self.read_raw().await?;
        Ok(raw.scaled(
            self.config.full_scale,
            &self.config.offsets,
            self.config.unit,
        ))
    }

    /// Average the resting output and use it as the zero-rate offsets.
    pub async fn calibrate_zero_rate(
        &mut self,
        delay: &mut impl DelayNs,
        parameters: &ZeroRateParameters,
    ) -> Result<Gyro, Error<T::Error>> {
        let offsets = collect_zero_rate(self, delay, parameters).await?;
        self.set_offsets(offsets);
        Ok(offsets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Endianness,
        testing::FakeSpi,
        transport::TransportConfig,
        transport_async::SpiTransport,
    };
    use futures::executor::block_on;

    #[test]
    fn async_initialize_and_read() {
        let mut spi = FakeSpi::gyroscope();
        spi.queue(Gyro::new(11, -3 + 1000, -20));
        let mut device = Device::new(
            SpiTransport::new(spi, TransportConfig::default()),
            DeviceConfig::default(),
        );

        assert_eq!(block_on(device.initialize()), Ok(DEVICE_ID));
        let sample = block_on(device.read_axes()).unwrap();
        assert_eq!(sample.x(), 0.0);
        assert!(libm::fabsf(sample.y() - 17.5) < 1e-5);

        let spi = device.release().release();
        assert_eq!(spi.get(Register::CtrlReg1), 0x3F);
        assert_eq!(spi.get(Register::CtrlReg5), 0x10);
    }

    #[test]
    fn async_read_honours_big_endian_output() {
        let mut spi = FakeSpi::gyroscope();
        spi.queue(Gyro::new(0x0100, -256, 0x7F00));
        let mut device = Device::new(
            SpiTransport::new(spi, TransportConfig::default()),
            DeviceConfig::new().with_endianness(Endianness::MsbAtLowerAddress),
        );
        assert_eq!(block_on(device.read_raw()), Ok(Gyro::new(1, 255, 0x7F)));
    }

    #[test]
    fn async_probe_rejects_missing_device() {
        let transport = SpiTransport::new(FakeSpi::new(), TransportConfig::default());
        let result = block_on(Device::probe(transport, DeviceConfig::default()));
        assert!(matches!(
            result.map(|_| ()).map_err(|e| e.error),
            Err(Error::WrongDevice { found: 0, .. })
        ));
    }
}
