//! Async register access over SPI.
//!
//! Frames every operation exactly like the blocking
//! [`crate::transport::SpiTransport`], using `embedded-hal-async`.

use embedded_hal_async::spi::{Operation, SpiDevice};

use crate::{error::Error, registers::Register, transport::TransportConfig};

/// Register-level access to the gyroscope.
#[allow(async_fn_in_trait)]
pub trait RegisterTransport {
    type Error;

    async fn read_register(&mut self, reg: Register) -> Result<u8, Error<Self::Error>>;

    async fn write_register(&mut self, reg: Register, value: u8) -> Result<(), Error<Self::Error>>;

    /// Read `base` and the register after it and combine them little endian.
    async fn read_pair(&mut self, base: Register) -> Result<u16, Error<Self::Error>>;
}

/// [`RegisterTransport`] over an async [`SpiDevice`].
pub struct SpiTransport<S> {
    spi: S,
    config: TransportConfig,
}

impl<S> SpiTransport<S>
where
    S: SpiDevice,
{
    pub fn new(spi: S, config: TransportConfig) -> Self {
        Self { spi, config }
    }

    /// Returns the underlying SPI device, consuming this transport.
    pub fn release(self) -> S {
        self.spi
    }

    async fn read_byte(&mut self, command: u8) -> Result<u8, Error<S::Error>> {
        let mut buf = [0; 1];
        self.spi
            .transaction(&mut [
                Operation::Write(&[command]),
                Operation::DelayNs(self.config.settle_ns),
                Operation::Read(&mut buf),
            ])
            .await
            .map_err(Error::Transport)?;
        Ok(buf[0])
    }
}

impl<S> RegisterTransport for SpiTransport<S>
where
    S: SpiDevice,
{
    type Error = S::Error;

    async fn read_register(&mut self, reg: Register) -> Result<u8, Error<S::Error>> {
        let mut buf = [0; 1];
        self.spi
            .transaction(&mut [
                Operation::Write(&[reg.read_command()]),
                Operation::Read(&mut buf),
                Operation::DelayNs(self.config.settle_ns),
            ])
            .await
            .map_err(Error::Transport)?;
        Ok(buf[0])
    }

    async fn write_register(&mut self, reg: Register, value: u8) -> Result<(), Error<S::Error>> {
        self.spi
            .transaction(&mut [
                Operation::Write(&[reg.addr(), value]),
                Operation::DelayNs(self.config.settle_ns),
            ])
            .await
            .map_err(Error::Transport)
    }

    async fn read_pair(&mut self, base: Register) -> Result<u16, Error<S::Error>> {
        let lower = self
            .read_byte(Register::pair_read_command(base.addr()))
            .await?;
        let upper = self
            .read_byte(Register::pair_read_command(base.addr() + 1))
            .await?;
        Ok(u16::from_le_bytes([lower, upper]))
    }
}
