//! Host-side doubles for the bus, delay, trigger pin and dashboard.

use std::{collections::VecDeque, vec::Vec};

use embedded_hal::{digital, spi::Operation};

use crate::{
    gyro::Gyro,
    presentation::{Dashboard, LiveReading, RunSummary},
    registers::{Register, READ},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FakeError;

impl embedded_hal::spi::Error for FakeError {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other
    }
}

impl digital::Error for FakeError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

/// One recorded SPI operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Write(Vec<u8>),
    Read(usize),
    Delay(u32),
    Other,
}

/// Register-file model of the gyroscope.
///
/// Reading `OUT_X_L` loads the next queued sample into the output registers
/// first, so a full `read_raw` sees one consistent sample.
pub struct FakeSpi {
    registers: [u8; 64],
    samples: VecDeque<Gyro>,
    pub transactions: Vec<Vec<Op>>,
    pub fail: bool,
}

impl FakeSpi {
    pub fn new() -> Self {
        Self {
            registers: [0; 64],
            samples: VecDeque::new(),
            transactions: Vec::new(),
            fail: false,
        }
    }

    /// A device that identifies as an I3G4250D.
    pub fn gyroscope() -> Self {
        let mut spi = Self::new();
        spi.set(Register::WhoAmI, crate::registers::DEVICE_ID);
        spi
    }

    pub fn set(&mut self, reg: Register, value: u8) {
        self.registers[reg.addr() as usize] = value;
    }

    pub fn get(&self, reg: Register) -> u8 {
        self.registers[reg.addr() as usize]
    }

    pub fn queue(&mut self, sample: Gyro) {
        self.samples.push_back(sample);
    }

    fn load_next_sample(&mut self) {
        if let Some(sample) = self.samples.pop_front() {
            let base = Register::OutX_L.addr() as usize;
            for (i, word) in [sample.x(), sample.y(), sample.z()].iter().enumerate() {
                let bytes = word.to_le_bytes();
                self.registers[base + 2 * i] = bytes[0];
                self.registers[base + 2 * i + 1] = bytes[1];
            }
        }
    }

    fn run(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), FakeError> {
        if self.fail {
            return Err(FakeError);
        }
        let mut log = Vec::new();
        let mut read_address = 0usize;
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    log.push(Op::Write(bytes.to_vec()));
                    if let Some((command, values)) = bytes.split_first() {
                        let addr = (command & 0x3F) as usize;
                        if command & READ != 0 {
                            read_address = addr;
                            if addr == Register::OutX_L.addr() as usize {
                                self.load_next_sample();
                            }
                        } else {
                            for (i, value) in values.iter().enumerate() {
                                self.registers[(addr + i) & 0x3F] = *value;
                            }
                        }
                    }
                }
                Operation::Read(buf) => {
                    log.push(Op::Read(buf.len()));
                    for (i, byte) in buf.iter_mut().enumerate() {
                        *byte = self.registers[(read_address + i) & 0x3F];
                    }
                }
                Operation::DelayNs(ns) => log.push(Op::Delay(*ns)),
                _ => log.push(Op::Other),
            }
        }
        self.transactions.push(log);
        Ok(())
    }

    /// Register writes (address, value) in bus order.
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.transactions
            .iter()
            .flatten()
            .filter_map(|op| match op {
                Op::Write(bytes) if bytes.len() == 2 && bytes[0] & READ == 0 => {
                    Some((bytes[0], bytes[1]))
                }
                _ => None,
            })
            .collect()
    }
}

impl embedded_hal::spi::ErrorType for FakeSpi {
    type Error = FakeError;
}

impl embedded_hal::spi::SpiDevice for FakeSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), FakeError> {
        self.run(operations)
    }
}

impl embedded_hal_async::spi::SpiDevice for FakeSpi {
    async fn transaction(
        &mut self,
        operations: &mut [Operation<'_, u8>],
    ) -> Result<(), FakeError> {
        self.run(operations)
    }
}

/// Records requested delays without sleeping.
#[derive(Default)]
pub struct FakeDelay {
    pub total_ns: u64,
}

impl FakeDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl embedded_hal::delay::DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

impl embedded_hal_async::delay::DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// Trigger input driven from a script of levels.
///
/// Once the script runs out the pin either stays pressed or reports an
/// error, which is how tests stop a forever loop.
pub struct FakePin {
    levels: VecDeque<bool>,
    error_when_exhausted: bool,
    pub polls: usize,
}

impl FakePin {
    pub fn always_pressed() -> Self {
        Self {
            levels: VecDeque::new(),
            error_when_exhausted: false,
            polls: 0,
        }
    }

    pub fn scripted(levels: &[bool]) -> Self {
        Self {
            levels: levels.iter().copied().collect(),
            error_when_exhausted: true,
            polls: 0,
        }
    }
}

impl digital::ErrorType for FakePin {
    type Error = FakeError;
}

impl digital::InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, FakeError> {
        self.polls += 1;
        match self.levels.pop_front() {
            Some(level) => Ok(level),
            None if self.error_when_exhausted => Err(FakeError),
            None => Ok(true),
        }
    }

    fn is_low(&mut self) -> Result<bool, FakeError> {
        self.is_high().map(|high| !high)
    }
}

#[derive(Default)]
pub struct FakeDashboard {
    pub prompts: usize,
    pub live: Vec<LiveReading>,
    pub summaries: Vec<(Vec<f32>, f64)>,
    pub fail: bool,
}

impl Dashboard for FakeDashboard {
    type Error = FakeError;

    fn show_prompt(&mut self) -> Result<(), FakeError> {
        self.prompts += 1;
        Ok(())
    }

    fn show_live(&mut self, reading: &LiveReading) -> Result<(), FakeError> {
        if self.fail {
            return Err(FakeError);
        }
        self.live.push(*reading);
        Ok(())
    }

    fn show_summary(&mut self, summary: &RunSummary<'_>) -> Result<(), FakeError> {
        self.summaries
            .push((summary.series.to_vec(), summary.total_distance));
        Ok(())
    }
}
