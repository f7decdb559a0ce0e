//! I3G4250D Blocking Driver
//!
//! A [`Device`] is one gyroscope session on top of a [`RegisterTransport`]:
//! - `initialize` writes the control registers and reports the device id
//! - `read_raw` fetches the three angular-rate register pairs
//! - `read_axes` converts them to physical units using the configured
//!   full scale, zero-rate offsets and unit

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::{
    calibration::ZeroRateParameters,
    calibration_blocking::collect_zero_rate,
    config::DeviceConfig,
    error::{Error, InitError},
    gyro::Gyro,
    registers::{Register, DEVICE_ID},
    sample::AxisSample,
    transport::RegisterTransport,
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
    /// Wrap a transport without touching the bus.
    pub fn new(transport: T, config: DeviceConfig) -> Self {
        Self { transport, config }
    }

    /// Construct a driver after checking WHO_AM_I.
    pub fn probe(transport: T, config: DeviceConfig) -> Result<Self, InitError<T, T::Error>> {
        let mut device = Self::new(transport, config);
        match device.verify() {
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

    pub fn offsets(&self) -> Gyro {
        self.config.offsets
    }

    pub fn set_offsets(&mut self, offsets: Gyro) {
        self.config.offsets = offsets;
    }

    pub fn device_id(&mut self) -> Result<u8, Error<T::Error>> {
        self.transport.read_register(Register::WhoAmI)
    }

    /// Read WHO_AM_I and fail unless it identifies an I3G4250D.
    pub fn verify(&mut self) -> Result<u8, Error<T::Error>> {
        let found = self.device_id()?;
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

    /// Read the device id and write all control registers.
    ///
    /// An unexpected id is logged, not rejected; use [`Device::verify`] for a
    /// strict check.
    pub fn initialize(&mut self) -> Result<u8, Error<T::Error>> {
        let id = self.device_id()?;
        if id != DEVICE_ID {
            warn!(
                "unexpected WHO_AM_I 0x{:02X}, expected 0x{:02X}",
                id, DEVICE_ID
            );
        }
        self.transport
            .write_register(Register::CtrlReg1, self.config.ctrl_reg1())?;
        self.transport
            .write_register(Register::CtrlReg2, self.config.ctrl_reg2())?;
        self.transport
            .write_register(Register::CtrlReg4, self.config.ctrl_reg4())?;
        self.transport
            .write_register(Register::CtrlReg5, self.config.ctrl_reg5())?;
        info!(
            "gyroscope configured: CTRL1=0x{:02X} CTRL2=0x{:02X} CTRL4=0x{:02X} CTRL5=0x{:02X}",
            self.config.ctrl_reg1(),
            self.config.ctrl_reg2(),
            self.config.ctrl_reg4(),
            self.config.ctrl_reg5()
        );
        Ok(id)
    }

    pub fn read_raw(&mut self) -> Result<Gyro, Error<T::Error>> {
        let order = self.config.endianness;
        let x = order.to_native(self.transport.read_pair(Register::OutX_L)?);
        let y = order.to_native(self.transport.read_pair(Register::OutY_L)?);
        let z = order.to_native(self.transport.read_pair(Register::OutZ_L)?);
        let raw = Gyro::from_words(x, y, z);
        debug!("Raw gyro: x={}, y={}, z={}", raw.x(), raw.y(), raw.z());
        Ok(raw)
    }

    /// Current angular velocity in the configured unit.
    pub fn read_axes(&mut self) -> Result<AxisSample, Error<T::Error>> {
        let raw = self.read_raw()?;
        Ok(raw.scaled(
            self.config.full_scale,
            &self.config.offsets,
            self.config.unit,
        ))
    }

    /// Average the resting output and use it as the zero-rate offsets.
    ///
    /// The device must be still for the whole measurement.
    pub fn calibrate_zero_rate(
        &mut self,
        delay: &mut impl DelayNs,
        parameters: &ZeroRateParameters,
    ) -> Result<Gyro, Error<T::Error>> {
        let offsets = collect_zero_rate(self, delay, parameters)?;
        info!(
            "zero-rate offsets: x={}, y={}, z={}",
            offsets.x(),
            offsets.y(),
            offsets.z()
        );
        self.set_offsets(offsets);
        Ok(offsets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Endianness,
        gyro::AngularUnit,
        testing::FakeSpi,
        transport::{SpiTransport, TransportConfig},
    };
    use std::vec;

    fn device(spi: FakeSpi) -> Device<SpiTransport<FakeSpi>> {
        Device::new(
            SpiTransport::new(spi, TransportConfig::default()),
            DeviceConfig::default(),
        )
    }

    #[test]
    fn initialize_writes_the_four_control_registers() {
        let mut device = device(FakeSpi::gyroscope());
        assert_eq!(device.initialize(), Ok(DEVICE_ID));

        let spi = device.release().release();
        assert_eq!(
            spi.writes(),
            vec![(0x20, 0x3F), (0x21, 0x00), (0x23, 0x10), (0x24, 0x10)]
        );
    }

    #[test]
    fn initialize_tolerates_an_unknown_id() {
        let mut spi = FakeSpi::new();
        spi.set(Register::WhoAmI, 0x42);
        let mut device = device(spi);
        assert_eq!(device.initialize(), Ok(0x42));
    }

    #[test]
    fn probe_rejects_wrong_device_and_returns_the_bus() {
        let mut spi = FakeSpi::new();
        spi.set(Register::WhoAmI, 0x68);
        let transport = SpiTransport::new(spi, TransportConfig::default());
        let error = match Device::probe(transport, DeviceConfig::default()) {
            Ok(_) => panic!("probe accepted a foreign device"),
            Err(error) => error,
        };
        assert_eq!(
            error.error,
            Error::WrongDevice {
                expected: DEVICE_ID,
                found: 0x68
            }
        );
        assert_eq!(error.bus.release().get(Register::WhoAmI), 0x68);
    }

    #[test]
    fn read_axes_applies_offsets_and_sensitivity() {
        let mut spi = FakeSpi::gyroscope();
        spi.queue(Gyro::new(11 + 200, -3 - 400, -20));
        let mut device = device(spi);

        let sample = device.read_axes().unwrap();
        assert!(libm::fabsf(sample.x() - 3.5) < 1e-5);
        assert!(libm::fabsf(sample.y() + 7.0) < 1e-5);
        assert_eq!(sample.z(), 0.0);
    }

    #[test]
    fn big_endian_output_is_swapped_back() {
        let mut spi = FakeSpi::gyroscope();
        spi.queue(Gyro::new(0x0100, 0x0200, -256));
        let mut device = Device::new(
            SpiTransport::new(spi, TransportConfig::default()),
            DeviceConfig::new().with_endianness(Endianness::MsbAtLowerAddress),
        );
        assert_eq!(device.read_raw(), Ok(Gyro::new(1, 2, 255)));
    }

    #[test]
    fn read_axes_in_radians() {
        let mut spi = FakeSpi::gyroscope();
        spi.queue(Gyro::new(0, 0, 0));
        let mut device = Device::new(
            SpiTransport::new(spi, TransportConfig::default()),
            DeviceConfig::new()
                .with_offsets(Gyro::new(-1000, 0, 0))
                .with_unit(AngularUnit::RadiansPerSecond),
        );
        let sample = device.read_axes().unwrap();
        // 1000 counts * 17.5 mdps = 17.5 dps
        assert!(libm::fabsf(sample.x() - 17.5 * core::f32::consts::PI / 180.0) < 1e-5);
    }
}
