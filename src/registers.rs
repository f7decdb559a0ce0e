//! I3G4250D Register Map
//!
//! The I3G4250D is controlled through 8-bit registers grouped as:
//! - Identification: WHO_AM_I
//! - Control registers: output data rate, filters, full scale, endianness
//! - Output registers: angular rate, one low/high byte pair per axis
//!
//! Over SPI the first byte of every transaction carries the register
//! address in its low six bits plus two command bits:
//! - bit 7 (`READ`): set for reads, clear for writes
//! - bit 6 (`MULTI_BYTE`): auto-increment the address on consecutive transfers

/// Read command bit, OR-ed into the address byte.
pub const READ: u8 = 0x80;

/// Address auto-increment bit, OR-ed into the address byte.
pub const MULTI_BYTE: u8 = 0x40;

/// Value of WHO_AM_I on a genuine I3G4250D.
pub const DEVICE_ID: u8 = 0xD3;

#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Register {
    /// Device identification register (0x0F)
    WhoAmI = 0x0F,

    /// Control register 1 (0x20)
    /// Output data rate, bandwidth, power mode and axis enable
    CtrlReg1 = 0x20,

    /// Control register 2 (0x21)
    /// High-pass filter mode and cut-off frequency
    CtrlReg2 = 0x21,

    /// Control register 3 (0x22)
    /// Interrupt and data-ready routing
    CtrlReg3 = 0x22,

    /// Control register 4 (0x23)
    /// Data endianness, full-scale selection and SPI mode
    CtrlReg4 = 0x23,

    /// Control register 5 (0x24)
    /// Boot, FIFO and high-pass filter enable
    CtrlReg5 = 0x24,

    // Angular Rate Data Registers
    /// Low byte of X-axis angular rate
    OutX_L = 0x28,
    /// High byte of X-axis angular rate
    OutX_H = 0x29,
    /// Low byte of Y-axis angular rate
    OutY_L = 0x2A,
    /// High byte of Y-axis angular rate
    OutY_H = 0x2B,
    /// Low byte of Z-axis angular rate
    OutZ_L = 0x2C,
    /// High byte of Z-axis angular rate
    OutZ_H = 0x2D,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Address byte for a single-register read.
    pub const fn read_command(self) -> u8 {
        self.addr() | READ
    }

    /// Address byte for one half of a paired (low/high) read.
    pub const fn pair_read_command(addr: u8) -> u8 {
        addr | READ | MULTI_BYTE
    }
}

#[cfg(test)]
mod tests {
    use super::Register;

    #[test]
    fn command_bits_are_or_ed_into_the_address() {
        assert_eq!(Register::WhoAmI.read_command(), 0x8F);
        assert_eq!(Register::pair_read_command(Register::OutX_L.addr()), 0xE8);
        assert_eq!(Register::pair_read_command(Register::OutX_H.addr()), 0xE9);
    }

    #[test]
    fn output_pairs_are_adjacent() {
        assert_eq!(Register::OutX_L.addr() + 1, Register::OutX_H.addr());
        assert_eq!(Register::OutY_L.addr() + 1, Register::OutY_H.addr());
        assert_eq!(Register::OutZ_L.addr() + 1, Register::OutZ_H.addr());
    }
}
