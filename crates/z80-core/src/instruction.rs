//! Closed instruction set.
//!
//! Each variant carries its pre-bound operands and knows its encoded size
//! and T-cycle cost, so executing it needs no further decoding.

use std::fmt;

use crate::flags::{FLAG_C, FLAG_PV, FLAG_S, FLAG_Z};
use crate::operand::{Dst16, Dst8, Src16, Src8};
use crate::state::{InterruptMode, Reg16, Reg8};
use crate::timing::{cycle_cost, CycleCostKind};

/// Branch condition encoded in the `cc` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// `NZ`
    NonZero,
    /// `Z`
    Zero,
    /// `NC`
    NoCarry,
    /// `C`
    Carry,
    /// `PO`
    ParityOdd,
    /// `PE`
    ParityEven,
    /// `P`
    Positive,
    /// `M`
    Negative,
}

impl Condition {
    /// Decodes a 3-bit `cc` field.
    #[must_use]
    pub const fn from_cc_field(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::NonZero),
            1 => Some(Self::Zero),
            2 => Some(Self::NoCarry),
            3 => Some(Self::Carry),
            4 => Some(Self::ParityOdd),
            5 => Some(Self::ParityEven),
            6 => Some(Self::Positive),
            7 => Some(Self::Negative),
            _ => None,
        }
    }

    /// Evaluates the condition against a flags byte.
    #[must_use]
    pub const fn holds(self, flags: u8) -> bool {
        let (mask, expect_set) = match self {
            Self::NonZero => (FLAG_Z, false),
            Self::Zero => (FLAG_Z, true),
            Self::NoCarry => (FLAG_C, false),
            Self::Carry => (FLAG_C, true),
            Self::ParityOdd => (FLAG_PV, false),
            Self::ParityEven => (FLAG_PV, true),
            Self::Positive => (FLAG_S, false),
            Self::Negative => (FLAG_S, true),
        };
        (flags & mask != 0) == expect_set
    }

    const fn mnemonic(self) -> &'static str {
        match self {
            Self::NonZero => "NZ",
            Self::Zero => "Z",
            Self::NoCarry => "NC",
            Self::Carry => "C",
            Self::ParityOdd => "PO",
            Self::ParityEven => "PE",
            Self::Positive => "P",
            Self::Negative => "M",
        }
    }
}

/// Accumulator ALU operation selected by bits 5..3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    /// Decodes the 3-bit ALU field.
    #[must_use]
    pub const fn from_field(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Add),
            1 => Some(Self::Adc),
            2 => Some(Self::Sub),
            3 => Some(Self::Sbc),
            4 => Some(Self::And),
            5 => Some(Self::Xor),
            6 => Some(Self::Or),
            7 => Some(Self::Cp),
            _ => None,
        }
    }

    const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD A,",
            Self::Adc => "ADC A,",
            Self::Sub => "SUB ",
            Self::Sbc => "SBC A,",
            Self::And => "AND ",
            Self::Xor => "XOR ",
            Self::Or => "OR ",
            Self::Cp => "CP ",
        }
    }
}

/// Single-byte accumulator rotate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum RotateOp {
    Rlca,
    Rrca,
    Rla,
    Rra,
}

/// Register-set exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeKind {
    /// `EX AF,AF'`
    AfShadow,
    /// `EXX`
    AllShadow,
    /// `EX DE,HL`
    DeHl,
}

/// Decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// `NOP`
    Nop,
    /// `HALT`
    Halt,
    /// 8-bit load.
    Ld8 {
        /// Target.
        dst: Dst8,
        /// Value source.
        src: Src8,
    },
    /// 16-bit load.
    Ld16 {
        /// Target.
        dst: Dst16,
        /// Value source.
        src: Src16,
    },
    /// `INC r` / `INC (HL)`.
    Inc8(Dst8),
    /// `DEC r` / `DEC (HL)`.
    Dec8(Dst8),
    /// `INC rr`.
    Inc16(Reg16),
    /// `DEC rr`.
    Dec16(Reg16),
    /// Accumulator ALU operation.
    Alu {
        /// Operation.
        op: AluOp,
        /// Right-hand operand.
        src: Src8,
    },
    /// `ADD HL,rr`.
    AddHl(Reg16),
    /// `ADC HL,rr`.
    AdcHl(Reg16),
    /// `SBC HL,rr`.
    SbcHl(Reg16),
    /// Accumulator rotate.
    RotateA(RotateOp),
    /// `CPL`
    Cpl,
    /// `SCF`
    Scf,
    /// `CCF`
    Ccf,
    /// `NEG`
    Neg,
    /// Register-set exchange.
    Exchange(ExchangeKind),
    /// `EX (SP),HL`
    ExSpHl,
    /// `JP nn` / `JP cc,nn`.
    Jp(Option<Condition>),
    /// `JP (HL)`
    JpHl,
    /// `JR e` / `JR cc,e` (only `NZ`, `Z`, `NC`, `C`).
    Jr(Option<Condition>),
    /// `DJNZ e`
    Djnz,
    /// `CALL nn` / `CALL cc,nn`.
    Call(Option<Condition>),
    /// `RET` / `RET cc`.
    Ret(Option<Condition>),
    /// `RETN`
    Retn,
    /// `RETI`
    Reti,
    /// `RST p`; carries the target address.
    Rst(u8),
    /// `PUSH rr`.
    Push(Reg16),
    /// `POP rr`.
    Pop(Reg16),
    /// `DI`
    Di,
    /// `EI`
    Ei,
    /// `IM n`
    Im(InterruptMode),
    /// `LD I,A`
    LdIA,
    /// `LD A,I`
    LdAI,
    /// Opcode with no assigned instruction.
    Illegal {
        /// Page prefix, if any.
        prefix: Option<u8>,
        /// Offending opcode byte.
        opcode: u8,
    },
}

impl Instruction {
    /// Encoded length in bytes, prefix included.
    #[must_use]
    pub const fn size(self) -> u8 {
        match self {
            Self::Ld8 { dst, src } => 1 + dst.encoded_bytes() + src.encoded_bytes(),
            Self::Ld16 { dst, src } => 1 + dst.encoded_bytes() + src.encoded_bytes(),
            Self::Alu { src, .. } => 1 + src.encoded_bytes(),
            Self::Jp(_) | Self::Call(_) => 3,
            Self::Jr(_)
            | Self::Djnz
            | Self::AdcHl(_)
            | Self::SbcHl(_)
            | Self::Neg
            | Self::Retn
            | Self::Reti
            | Self::Im(_)
            | Self::LdIA
            | Self::LdAI => 2,
            Self::Illegal { prefix, .. } => {
                if prefix.is_some() {
                    2
                } else {
                    1
                }
            }
            _ => 1,
        }
    }

    /// Cost kind charged when a conditional form is taken (or always, for
    /// unconditional forms).
    #[must_use]
    pub const fn cost_kind(self) -> CycleCostKind {
        match self {
            Self::Nop | Self::Halt | Self::Illegal { .. } => CycleCostKind::Nop,
            Self::Ld8 { dst, src } => ld8_cost(dst, src),
            Self::Ld16 { dst, src } => match (dst, src) {
                (Dst16::Reg(Reg16::SP), Src16::Reg(_)) => CycleCostKind::LoadStackPointer,
                (Dst16::Reg(_), Src16::Immediate) => CycleCostKind::LoadPairImmediate,
                _ => CycleCostKind::LoadPairAbsolute,
            },
            Self::Inc8(dst) | Self::Dec8(dst) => {
                if dst.is_memory() {
                    CycleCostKind::IncDecIndirect
                } else {
                    CycleCostKind::IncDecRegister
                }
            }
            Self::Inc16(_) | Self::Dec16(_) => CycleCostKind::IncDecPair,
            Self::Alu { src, .. } => {
                if src.is_memory() {
                    CycleCostKind::AluMemory
                } else {
                    CycleCostKind::AluRegister
                }
            }
            Self::AddHl(_) => CycleCostKind::AddPair,
            Self::AdcHl(_) | Self::SbcHl(_) => CycleCostKind::AdcSbcPair,
            Self::RotateA(_) | Self::Cpl | Self::Scf | Self::Ccf => CycleCostKind::Accumulator,
            Self::Neg => CycleCostKind::Negate,
            Self::Exchange(_) => CycleCostKind::Exchange,
            Self::ExSpHl => CycleCostKind::ExchangeStack,
            Self::Jp(_) => CycleCostKind::Jump,
            Self::JpHl => CycleCostKind::JumpIndirect,
            Self::Jr(_) => CycleCostKind::RelativeTaken,
            Self::Djnz => CycleCostKind::DjnzTaken,
            Self::Call(_) => CycleCostKind::Call,
            Self::Ret(None) => CycleCostKind::Ret,
            Self::Ret(Some(_)) => CycleCostKind::RetConditionalTaken,
            Self::Retn | Self::Reti => CycleCostKind::ReturnFromInterrupt,
            Self::Rst(_) => CycleCostKind::Restart,
            Self::Push(_) => CycleCostKind::Push,
            Self::Pop(_) => CycleCostKind::Pop,
            Self::Di | Self::Ei => CycleCostKind::InterruptEnable,
            Self::Im(_) => CycleCostKind::InterruptModeSelect,
            Self::LdIA | Self::LdAI => CycleCostKind::LoadInterruptVector,
        }
    }

    /// Cost kind charged when a conditional form falls through.
    #[must_use]
    pub const fn not_taken_cost_kind(self) -> CycleCostKind {
        match self {
            Self::Jr(_) => CycleCostKind::RelativeNotTaken,
            Self::Djnz => CycleCostKind::DjnzNotTaken,
            Self::Call(_) => CycleCostKind::CallNotTaken,
            Self::Ret(_) => CycleCostKind::RetConditionalNotTaken,
            other => other.cost_kind(),
        }
    }

    /// T-cycles for this instruction given whether its branch was taken.
    #[must_use]
    pub fn cycles(self, taken: bool) -> u32 {
        if taken {
            cycle_cost(self.cost_kind())
        } else {
            cycle_cost(self.not_taken_cost_kind())
        }
    }

    /// True for the undecodable sentinel.
    #[must_use]
    pub const fn is_illegal(self) -> bool {
        matches!(self, Self::Illegal { .. })
    }
}

const fn ld8_cost(dst: Dst8, src: Src8) -> CycleCostKind {
    match (dst, src) {
        (Dst8::ImmediateIndirect, _) | (_, Src8::ImmediateIndirect) => CycleCostKind::LoadAbsolute,
        (Dst8::Indirect(_), Src8::Immediate) => CycleCostKind::StoreImmediateIndirect,
        (Dst8::Indirect(_), _) | (_, Src8::Indirect(_)) => CycleCostKind::LoadIndirect,
        (Dst8::Reg(_), Src8::Immediate) => CycleCostKind::LoadImmediate,
        (Dst8::Reg(_), Src8::Reg(_)) => CycleCostKind::LoadRegister,
    }
}

const fn reg8_name(reg: Reg8) -> &'static str {
    match reg {
        Reg8::A => "A",
        Reg8::F => "F",
        Reg8::B => "B",
        Reg8::C => "C",
        Reg8::D => "D",
        Reg8::E => "E",
        Reg8::H => "H",
        Reg8::L => "L",
    }
}

const fn reg16_name(reg: Reg16) -> &'static str {
    match reg {
        Reg16::AF => "AF",
        Reg16::BC => "BC",
        Reg16::DE => "DE",
        Reg16::HL => "HL",
        Reg16::SP => "SP",
        Reg16::PC => "PC",
    }
}

impl fmt::Display for Src8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reg(reg) => f.write_str(reg8_name(*reg)),
            Self::Immediate => f.write_str("n"),
            Self::Indirect(pair) => write!(f, "({})", reg16_name(*pair)),
            Self::ImmediateIndirect => f.write_str("(nn)"),
        }
    }
}

impl fmt::Display for Dst8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Src8::from(*self), f)
    }
}

impl fmt::Display for Src16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reg(reg) => f.write_str(reg16_name(*reg)),
            Self::Immediate => f.write_str("nn"),
            Self::Indirect(pair) => write!(f, "({})", reg16_name(*pair)),
            Self::ImmediateIndirect => f.write_str("(nn)"),
        }
    }
}

impl fmt::Display for Dst16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Src16::from(*self), f)
    }
}

fn write_conditional(
    f: &mut fmt::Formatter<'_>,
    mnemonic: &str,
    condition: Option<Condition>,
    target: &str,
) -> fmt::Result {
    match (condition, target.is_empty()) {
        (Some(cc), true) => write!(f, "{mnemonic} {}", cc.mnemonic()),
        (Some(cc), false) => write!(f, "{mnemonic} {},{target}", cc.mnemonic()),
        (None, true) => f.write_str(mnemonic),
        (None, false) => write!(f, "{mnemonic} {target}"),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nop => f.write_str("NOP"),
            Self::Halt => f.write_str("HALT"),
            Self::Ld8 { dst, src } => write!(f, "LD {dst},{src}"),
            Self::Ld16 { dst, src } => write!(f, "LD {dst},{src}"),
            Self::Inc8(dst) => write!(f, "INC {dst}"),
            Self::Dec8(dst) => write!(f, "DEC {dst}"),
            Self::Inc16(reg) => write!(f, "INC {}", reg16_name(*reg)),
            Self::Dec16(reg) => write!(f, "DEC {}", reg16_name(*reg)),
            Self::Alu { op, src } => write!(f, "{}{src}", op.mnemonic()),
            Self::AddHl(reg) => write!(f, "ADD HL,{}", reg16_name(*reg)),
            Self::AdcHl(reg) => write!(f, "ADC HL,{}", reg16_name(*reg)),
            Self::SbcHl(reg) => write!(f, "SBC HL,{}", reg16_name(*reg)),
            Self::RotateA(op) => f.write_str(match op {
                RotateOp::Rlca => "RLCA",
                RotateOp::Rrca => "RRCA",
                RotateOp::Rla => "RLA",
                RotateOp::Rra => "RRA",
            }),
            Self::Cpl => f.write_str("CPL"),
            Self::Scf => f.write_str("SCF"),
            Self::Ccf => f.write_str("CCF"),
            Self::Neg => f.write_str("NEG"),
            Self::Exchange(kind) => f.write_str(match kind {
                ExchangeKind::AfShadow => "EX AF,AF'",
                ExchangeKind::AllShadow => "EXX",
                ExchangeKind::DeHl => "EX DE,HL",
            }),
            Self::ExSpHl => f.write_str("EX (SP),HL"),
            Self::Jp(cc) => write_conditional(f, "JP", *cc, "nn"),
            Self::JpHl => f.write_str("JP (HL)"),
            Self::Jr(cc) => write_conditional(f, "JR", *cc, "e"),
            Self::Djnz => f.write_str("DJNZ e"),
            Self::Call(cc) => write_conditional(f, "CALL", *cc, "nn"),
            Self::Ret(cc) => write_conditional(f, "RET", *cc, ""),
            Self::Retn => f.write_str("RETN"),
            Self::Reti => f.write_str("RETI"),
            Self::Rst(target) => write!(f, "RST {target:#04x}"),
            Self::Push(reg) => write!(f, "PUSH {}", reg16_name(*reg)),
            Self::Pop(reg) => write!(f, "POP {}", reg16_name(*reg)),
            Self::Di => f.write_str("DI"),
            Self::Ei => f.write_str("EI"),
            Self::Im(mode) => write!(f, "IM {}", mode.number()),
            Self::LdIA => f.write_str("LD I,A"),
            Self::LdAI => f.write_str("LD A,I"),
            Self::Illegal {
                prefix: Some(prefix),
                opcode,
            } => write!(f, "ILLEGAL {prefix:#04x} {opcode:#04x}"),
            Self::Illegal {
                prefix: None,
                opcode,
            } => write!(f, "ILLEGAL {opcode:#04x}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{AluOp, Condition, Instruction};
    use crate::flags::{FLAG_C, FLAG_PV, FLAG_S, FLAG_Z};
    use crate::operand::{Dst16, Dst8, Src16, Src8};
    use crate::state::{Reg16, Reg8};

    #[rstest]
    #[case(Condition::NonZero, 0, true)]
    #[case(Condition::Zero, FLAG_Z, true)]
    #[case(Condition::NoCarry, FLAG_C, false)]
    #[case(Condition::Carry, FLAG_C, true)]
    #[case(Condition::ParityOdd, FLAG_PV, false)]
    #[case(Condition::ParityEven, FLAG_PV, true)]
    #[case(Condition::Positive, FLAG_S, false)]
    #[case(Condition::Negative, FLAG_S, true)]
    fn conditions_test_their_flag(
        #[case] condition: Condition,
        #[case] flags: u8,
        #[case] expected: bool,
    ) {
        assert_eq!(condition.holds(flags), expected);
    }

    #[rstest]
    #[case(Instruction::Nop, 1, 4)]
    #[case(Instruction::Ld8 { dst: Dst8::Reg(Reg8::B), src: Src8::Reg(Reg8::C) }, 1, 4)]
    #[case(Instruction::Ld8 { dst: Dst8::Reg(Reg8::B), src: Src8::Immediate }, 2, 7)]
    #[case(Instruction::Ld8 { dst: Dst8::Indirect(Reg16::HL), src: Src8::Immediate }, 2, 10)]
    #[case(Instruction::Ld8 { dst: Dst8::ImmediateIndirect, src: Src8::Reg(Reg8::A) }, 3, 13)]
    #[case(Instruction::Ld16 { dst: Dst16::Reg(Reg16::BC), src: Src16::Immediate }, 3, 10)]
    #[case(Instruction::Ld16 { dst: Dst16::ImmediateIndirect, src: Src16::Reg(Reg16::HL) }, 3, 16)]
    #[case(Instruction::Ld16 { dst: Dst16::Reg(Reg16::SP), src: Src16::Reg(Reg16::HL) }, 1, 6)]
    #[case(Instruction::Inc8(Dst8::Indirect(Reg16::HL)), 1, 11)]
    #[case(Instruction::Alu { op: AluOp::Cp, src: Src8::Immediate }, 2, 7)]
    #[case(Instruction::Jp(None), 3, 10)]
    #[case(Instruction::Call(Some(Condition::Zero)), 3, 17)]
    #[case(Instruction::SbcHl(Reg16::DE), 2, 15)]
    #[case(Instruction::Rst(0x38), 1, 11)]
    fn size_and_taken_cost(
        #[case] instruction: Instruction,
        #[case] size: u8,
        #[case] cycles: u32,
    ) {
        assert_eq!(instruction.size(), size);
        assert_eq!(instruction.cycles(true), cycles);
    }

    #[test]
    fn conditional_forms_charge_less_when_not_taken() {
        assert_eq!(Instruction::Jr(Some(Condition::Carry)).cycles(false), 7);
        assert_eq!(Instruction::Djnz.cycles(false), 8);
        assert_eq!(Instruction::Call(Some(Condition::Zero)).cycles(false), 10);
        assert_eq!(Instruction::Ret(Some(Condition::Zero)).cycles(false), 5);
        assert_eq!(Instruction::Jp(Some(Condition::Zero)).cycles(false), 10);
    }

    #[test]
    fn display_renders_assembly_mnemonics() {
        let load = Instruction::Ld8 {
            dst: Dst8::Indirect(Reg16::HL),
            src: Src8::Reg(Reg8::A),
        };
        assert_eq!(load.to_string(), "LD (HL),A");
        assert_eq!(
            Instruction::Jr(Some(Condition::NonZero)).to_string(),
            "JR NZ,e"
        );
        assert_eq!(Instruction::Ret(None).to_string(), "RET");
        assert_eq!(
            Instruction::Alu {
                op: AluOp::Sub,
                src: Src8::Reg(Reg8::B)
            }
            .to_string(),
            "SUB B"
        );
        assert_eq!(
            Instruction::Illegal {
                prefix: Some(0xED),
                opcode: 0x00
            }
            .to_string(),
            "ILLEGAL 0xed 0x00"
        );
    }
}
