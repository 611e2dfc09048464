//! Operand addressing model.
//!
//! Sources and destinations are plain values bound at decode time. Reading
//! or writing one never moves `PC`; immediates are located relative to the
//! opcode byte at `PC`.

use crate::bus::{Bus, BusError};
use crate::state::{Reg16, Reg8, RegisterBank};
use crate::word::Word;

/// 8-bit readable operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Src8 {
    /// Register half.
    Reg(Reg8),
    /// Byte at `PC + 1`.
    Immediate,
    /// Byte at the address held in a register pair.
    Indirect(Reg16),
    /// Byte at the address stored at `PC + 1`.
    ImmediateIndirect,
}

/// 8-bit writable operand. Every destination is also a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dst8 {
    /// Register half.
    Reg(Reg8),
    /// Byte at the address held in a register pair.
    Indirect(Reg16),
    /// Byte at the address stored at `PC + 1`.
    ImmediateIndirect,
}

/// 16-bit readable operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Src16 {
    /// Register or register pair.
    Reg(Reg16),
    /// Little-endian word at `PC + 1`.
    Immediate,
    /// Word at the address held in a register pair.
    Indirect(Reg16),
    /// Word at the address stored at `PC + 1`.
    ImmediateIndirect,
}

/// 16-bit writable operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dst16 {
    /// Register or register pair.
    Reg(Reg16),
    /// Word at the address held in a register pair.
    Indirect(Reg16),
    /// Word at the address stored at `PC + 1`.
    ImmediateIndirect,
}

fn immediate_address(regs: &RegisterBank) -> u16 {
    regs.pc().increment()
}

fn absolute_address<B: Bus + ?Sized>(regs: &RegisterBank, bus: &mut B) -> Result<u16, BusError> {
    bus.read_word(immediate_address(regs))
}

impl Src8 {
    /// Same location viewed as a source.
    #[must_use]
    pub const fn from_dst(dst: Dst8) -> Self {
        match dst {
            Dst8::Reg(reg) => Self::Reg(reg),
            Dst8::Indirect(pair) => Self::Indirect(pair),
            Dst8::ImmediateIndirect => Self::ImmediateIndirect,
        }
    }

    /// Bytes this operand adds to the instruction encoding.
    #[must_use]
    pub const fn encoded_bytes(self) -> u8 {
        match self {
            Self::Reg(_) | Self::Indirect(_) => 0,
            Self::Immediate => 1,
            Self::ImmediateIndirect => 2,
        }
    }

    /// True when reading the operand touches the bus.
    #[must_use]
    pub const fn is_memory(self) -> bool {
        !matches!(self, Self::Reg(_))
    }

    /// Reads the operand.
    ///
    /// # Errors
    ///
    /// Propagates bus failures.
    pub fn read<B: Bus + ?Sized>(self, regs: &RegisterBank, bus: &mut B) -> Result<u8, BusError> {
        match self {
            Self::Reg(reg) => Ok(regs.reg8(reg)),
            Self::Immediate => bus.read(immediate_address(regs)),
            Self::Indirect(pair) => bus.read(regs.reg16(pair)),
            Self::ImmediateIndirect => {
                let addr = absolute_address(regs, bus)?;
                bus.read(addr)
            }
        }
    }
}

impl Dst8 {
    /// Bytes this operand adds to the instruction encoding.
    #[must_use]
    pub const fn encoded_bytes(self) -> u8 {
        Src8::from_dst(self).encoded_bytes()
    }

    /// True when accessing the operand touches the bus.
    #[must_use]
    pub const fn is_memory(self) -> bool {
        !matches!(self, Self::Reg(_))
    }

    /// Reads the current value.
    ///
    /// # Errors
    ///
    /// Propagates bus failures.
    pub fn read<B: Bus + ?Sized>(self, regs: &RegisterBank, bus: &mut B) -> Result<u8, BusError> {
        Src8::from(self).read(regs, bus)
    }

    /// Stores `value`.
    ///
    /// # Errors
    ///
    /// Propagates bus failures.
    pub fn write<B: Bus + ?Sized>(
        self,
        regs: &mut RegisterBank,
        bus: &mut B,
        value: u8,
    ) -> Result<(), BusError> {
        match self {
            Self::Reg(reg) => {
                regs.set_reg8(reg, value);
                Ok(())
            }
            Self::Indirect(pair) => bus.write(regs.reg16(pair), value),
            Self::ImmediateIndirect => {
                let addr = absolute_address(regs, bus)?;
                bus.write(addr, value)
            }
        }
    }
}

impl From<Dst8> for Src8 {
    fn from(dst: Dst8) -> Self {
        Self::from_dst(dst)
    }
}

impl Src16 {
    /// Bytes this operand adds to the instruction encoding.
    #[must_use]
    pub const fn encoded_bytes(self) -> u8 {
        match self {
            Self::Reg(_) | Self::Indirect(_) => 0,
            Self::Immediate | Self::ImmediateIndirect => 2,
        }
    }

    /// Reads the operand.
    ///
    /// # Errors
    ///
    /// Propagates bus failures.
    pub fn read<B: Bus + ?Sized>(self, regs: &RegisterBank, bus: &mut B) -> Result<u16, BusError> {
        match self {
            Self::Reg(reg) => Ok(regs.reg16(reg)),
            Self::Immediate => bus.read_word(immediate_address(regs)),
            Self::Indirect(pair) => bus.read_word(regs.reg16(pair)),
            Self::ImmediateIndirect => {
                let addr = absolute_address(regs, bus)?;
                bus.read_word(addr)
            }
        }
    }
}

impl Dst16 {
    /// Bytes this operand adds to the instruction encoding.
    #[must_use]
    pub const fn encoded_bytes(self) -> u8 {
        match self {
            Self::Reg(_) | Self::Indirect(_) => 0,
            Self::ImmediateIndirect => 2,
        }
    }

    /// Reads the current value.
    ///
    /// # Errors
    ///
    /// Propagates bus failures.
    pub fn read<B: Bus + ?Sized>(self, regs: &RegisterBank, bus: &mut B) -> Result<u16, BusError> {
        Src16::from(self).read(regs, bus)
    }

    /// Stores `value` (little-endian for memory targets).
    ///
    /// # Errors
    ///
    /// Propagates bus failures.
    pub fn write<B: Bus + ?Sized>(
        self,
        regs: &mut RegisterBank,
        bus: &mut B,
        value: u16,
    ) -> Result<(), BusError> {
        match self {
            Self::Reg(reg) => {
                regs.set_reg16(reg, value);
                Ok(())
            }
            Self::Indirect(pair) => bus.write_word(regs.reg16(pair), value),
            Self::ImmediateIndirect => {
                let addr = absolute_address(regs, bus)?;
                bus.write_word(addr, value)
            }
        }
    }
}

impl From<Dst16> for Src16 {
    fn from(dst: Dst16) -> Self {
        match dst {
            Dst16::Reg(reg) => Self::Reg(reg),
            Dst16::Indirect(pair) => Self::Indirect(pair),
            Dst16::ImmediateIndirect => Self::ImmediateIndirect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Dst16, Dst8, Src16, Src8};
    use crate::bus::Bus;
    use crate::memory::FlatBus;
    use crate::state::{Reg16, Reg8, RegisterBank};

    fn fixture() -> (RegisterBank, FlatBus) {
        let mut regs = RegisterBank::default();
        regs.set_pc(0x0100);
        regs.set_reg16(Reg16::HL, 0x4000);
        let mut bus = FlatBus::new();
        bus.load(0x0100, &[0x3A, 0x34, 0x12]);
        bus.load(0x1234, &[0x5A, 0xA5]);
        bus.load(0x4000, &[0x77]);
        (regs, bus)
    }

    #[test]
    fn immediate_reads_byte_after_opcode_without_moving_pc() {
        let (regs, mut bus) = fixture();
        assert_eq!(Src8::Immediate.read(&regs, &mut bus), Ok(0x34));
        assert_eq!(Src16::Immediate.read(&regs, &mut bus), Ok(0x1234));
        assert_eq!(regs.pc(), 0x0100);
    }

    #[test]
    fn indirect_forms_follow_their_address() {
        let (regs, mut bus) = fixture();
        assert_eq!(Src8::Indirect(Reg16::HL).read(&regs, &mut bus), Ok(0x77));
        assert_eq!(Src8::ImmediateIndirect.read(&regs, &mut bus), Ok(0x5A));
        assert_eq!(Src16::ImmediateIndirect.read(&regs, &mut bus), Ok(0xA55A));
    }

    #[test]
    fn destinations_write_registers_and_memory() {
        let (mut regs, mut bus) = fixture();
        Dst8::Reg(Reg8::B)
            .write(&mut regs, &mut bus, 0x42)
            .expect("register write");
        assert_eq!(regs.reg8(Reg8::B), 0x42);

        Dst8::Indirect(Reg16::HL)
            .write(&mut regs, &mut bus, 0x99)
            .expect("memory write");
        assert_eq!(bus.peek(0x4000), 0x99);

        Dst16::ImmediateIndirect
            .write(&mut regs, &mut bus, 0xBEEF)
            .expect("word write");
        assert_eq!(bus.read_word(0x1234), Ok(0xBEEF));
        assert_eq!(bus.peek(0x1234), 0xEF);
    }

    #[test]
    fn encoded_bytes_follow_addressing_form() {
        assert_eq!(Src8::Reg(Reg8::A).encoded_bytes(), 0);
        assert_eq!(Src8::Immediate.encoded_bytes(), 1);
        assert_eq!(Dst8::ImmediateIndirect.encoded_bytes(), 2);
        assert_eq!(Src16::Immediate.encoded_bytes(), 2);
        assert_eq!(Dst16::Reg(Reg16::SP).encoded_bytes(), 0);
        assert!(Src8::Indirect(Reg16::BC).is_memory());
        assert!(!Dst8::Reg(Reg8::L).is_memory());
    }

    #[test]
    fn destination_converts_to_equivalent_source() {
        assert_eq!(
            Src8::from(Dst8::Indirect(Reg16::DE)),
            Src8::Indirect(Reg16::DE)
        );
        assert_eq!(Src16::from(Dst16::Reg(Reg16::HL)), Src16::Reg(Reg16::HL));
    }
}
