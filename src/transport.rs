//! Blocking register access over SPI.
//!
//! Every register operation is one `SpiDevice` transaction, so chip select
//! is asserted for its duration and released afterwards. A settle delay is
//! issued inside each transaction before chip select is released.

use embedded_hal::spi::{Operation, SpiDevice};

use crate::{error::Error, registers::Register};

/// Settle delay issued inside every transaction.
pub const DEFAULT_SETTLE_NS: u32 = 1_000_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportConfig {
    pub settle_ns: u32,
}

impl TransportConfig {
    pub const fn new() -> Self {
        Self {
            settle_ns: DEFAULT_SETTLE_NS,
        }
    }

    pub const fn with_settle_ns(self, settle_ns: u32) -> Self {
        Self { settle_ns }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Register-level access to the gyroscope.
pub trait RegisterTransport {
    type Error;

    fn read_register(&mut self, reg: Register) -> Result<u8, Error<Self::Error>>;

    fn write_register(&mut self, reg: Register, value: u8) -> Result<(), Error<Self::Error>>;

    /// Read `base` and the register after it and combine them little endian.
    fn read_pair(&mut self, base: Register) -> Result<u16, Error<Self::Error>>;
}

/// [`RegisterTransport`] over a blocking [`SpiDevice`].
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

    fn read_byte(&mut self, command: u8) -> Result<u8, Error<S::Error>> {
        let mut buf = [0; 1];
        self.spi
            .transaction(&mut [
                Operation::Write(&[command]),
                Operation::DelayNs(self.config.settle_ns),
                Operation::Read(&mut buf),
            ])
            .map_err(Error::Transport)?;
        Ok(buf[0])
    }
}

impl<S> RegisterTransport for SpiTransport<S>
where
    S: SpiDevice,
{
    type Error = S::Error;

    fn read_register(&mut self, reg: Register) -> Result<u8, Error<S::Error>> {
        let mut buf = [0; 1];
        self.spi
            .transaction(&mut [
                Operation::Write(&[reg.read_command()]),
                Operation::Read(&mut buf),
                Operation::DelayNs(self.config.settle_ns),
            ])
            .map_err(Error::Transport)?;
        Ok(buf[0])
    }

    fn write_register(&mut self, reg: Register, value: u8) -> Result<(), Error<S::Error>> {
        self.spi
            .transaction(&mut [
                Operation::Write(&[reg.addr(), value]),
                Operation::DelayNs(self.config.settle_ns),
            ])
            .map_err(Error::Transport)
    }

    fn read_pair(&mut self, base: Register) -> Result<u16, Error<S::Error>> {
        let lower = self.read_byte(Register::pair_read_command(base.addr()))?;
        let upper = self.read_byte(Register::pair_read_command(base.addr() + 1))?;
        Ok(u16::from_le_bytes([lower, upper]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeError, FakeSpi, Op};
    use std::vec;

    #[test]
    fn read_register_frames_a_single_transaction() {
        let mut spi = FakeSpi::new();
        spi.set(Register::WhoAmI, 0xD3);
        let mut transport = SpiTransport::new(spi, TransportConfig::default());

        assert_eq!(transport.read_register(Register::WhoAmI), Ok(0xD3));

        let spi = transport.release();
        assert_eq!(
            spi.transactions,
            vec![vec![Op::Write(vec![0x8F]), Op::Read(1), Op::Delay(1_000_000)]]
        );
    }

    #[test]
    fn write_register_sends_address_then_value() {
        let mut transport =
            SpiTransport::new(FakeSpi::new(), TransportConfig::new().with_settle_ns(10));
        transport.write_register(Register::CtrlReg4, 0x10).unwrap();

        let spi = transport.release();
        assert_eq!(spi.get(Register::CtrlReg4), 0x10);
        assert_eq!(
            spi.transactions,
            vec![vec![Op::Write(vec![0x23, 0x10]), Op::Delay(10)]]
        );
    }

    #[test]
    fn read_pair_combines_two_transactions_little_endian() {
        let mut spi = FakeSpi::new();
        spi.set(Register::OutY_L, 0xFE);
        spi.set(Register::OutY_H, 0xFF);
        let mut transport = SpiTransport::new(spi, TransportConfig::default());

        assert_eq!(transport.read_pair(Register::OutY_L), Ok(0xFFFE));

        let spi = transport.release();
        assert_eq!(spi.transactions.len(), 2);
        assert_eq!(spi.transactions[0][0], Op::Write(vec![0xEA]));
        assert_eq!(spi.transactions[1][0], Op::Write(vec![0xEB]));
    }

    #[test]
    fn bus_failures_surface_as_transport_errors() {
        let mut spi = FakeSpi::new();
        spi.fail = true;
        let mut transport = SpiTransport::new(spi, TransportConfig::default());
        assert_eq!(
            transport.read_register(Register::WhoAmI),
            Err(Error::Transport(FakeError))
        );
    }
}
