//! Opcode dispatch tables.
//!
//! The base page and the `ED` page are each decoded once per process into a
//! 256-entry table. Opcodes are split into the usual `x`/`y`/`z` (`p`/`q`)
//! fields:
//!
//! ```text
//!   7 6 | 5 4 3 | 2 1 0
//!    x  |   y   |   z
//!       | p | q |
//! ```
//!
//! Entries with no assigned instruction hold [`Instruction::Illegal`].

use std::sync::OnceLock;

use crate::bus::{Bus, BusError};
use crate::instruction::{AluOp, Condition, ExchangeKind, Instruction, RotateOp};
use crate::operand::{Dst16, Dst8, Src16, Src8};
use crate::state::{InterruptMode, Reg16, Reg8};
use crate::word::Word;

/// Prefix selecting the extended (`ED`) page.
pub const ED_PREFIX: u8 = 0xED;

type DispatchTable = [Instruction; 256];

/// Opcode fields shared by both pages.
#[derive(Debug, Clone, Copy)]
struct Fields {
    x: u8,
    y: u8,
    z: u8,
    p: u8,
    q: bool,
}

impl Fields {
    const fn split(opcode: u8) -> Self {
        let y = (opcode >> 3) & 0b111;
        Self {
            x: opcode >> 6,
            y,
            z: opcode & 0b111,
            p: y >> 1,
            q: y & 1 == 1,
        }
    }
}

/// Stateless front end over the dispatch tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder;

impl Decoder {
    /// Decodes the instruction starting at `pc`.
    ///
    /// An `ED` prefix pulls one more byte from `pc + 1`.
    ///
    /// # Errors
    ///
    /// Propagates bus failures from the opcode fetch.
    pub fn decode<B: Bus + ?Sized>(bus: &mut B, pc: u16) -> Result<Instruction, BusError> {
        let opcode = bus.read(pc)?;
        Self::decode_fetched(bus, pc, opcode)
    }

    /// Finishes decoding once the first byte at `pc` has been fetched.
    ///
    /// # Errors
    ///
    /// Propagates bus failures from the prefix fetch.
    pub fn decode_fetched<B: Bus + ?Sized>(
        bus: &mut B,
        pc: u16,
        opcode: u8,
    ) -> Result<Instruction, BusError> {
        if opcode == ED_PREFIX {
            let extended = bus.read(pc.increment())?;
            return Ok(Self::decode_extended(extended));
        }
        Ok(Self::decode_opcode(opcode))
    }

    /// Looks up a base-page opcode.
    #[must_use]
    pub fn decode_opcode(opcode: u8) -> Instruction {
        base_table()[usize::from(opcode)]
    }

    /// Looks up the byte following an `ED` prefix.
    #[must_use]
    pub fn decode_extended(opcode: u8) -> Instruction {
        extended_table()[usize::from(opcode)]
    }
}

fn base_table() -> &'static DispatchTable {
    static TABLE: OnceLock<DispatchTable> = OnceLock::new();
    TABLE.get_or_init(|| build_table(decode_base))
}

fn extended_table() -> &'static DispatchTable {
    static TABLE: OnceLock<DispatchTable> = OnceLock::new();
    TABLE.get_or_init(|| build_table(decode_ed))
}

fn build_table(decode: fn(u8) -> Instruction) -> DispatchTable {
    let mut table = [Instruction::Nop; 256];
    for opcode in 0..=u8::MAX {
        table[usize::from(opcode)] = decode(opcode);
    }
    table
}

const fn illegal(opcode: u8) -> Instruction {
    Instruction::Illegal {
        prefix: None,
        opcode,
    }
}

const fn illegal_ed(opcode: u8) -> Instruction {
    Instruction::Illegal {
        prefix: Some(ED_PREFIX),
        opcode,
    }
}

/// `r` field operand; code 6 is `(HL)`.
const fn r_operand(bits: u8) -> Dst8 {
    match Reg8::from_r_field(bits) {
        Some(reg) => Dst8::Reg(reg),
        None => Dst8::Indirect(Reg16::HL),
    }
}

const fn rp(bits: u8) -> Reg16 {
    match Reg16::from_rp_field(bits) {
        Some(reg) => reg,
        None => Reg16::SP,
    }
}

const fn rp2(bits: u8) -> Reg16 {
    match Reg16::from_rp2_field(bits) {
        Some(reg) => reg,
        None => Reg16::AF,
    }
}

const fn cc(bits: u8) -> Condition {
    match Condition::from_cc_field(bits) {
        Some(condition) => condition,
        None => Condition::Negative,
    }
}

const fn alu(bits: u8) -> AluOp {
    match AluOp::from_field(bits) {
        Some(op) => op,
        None => AluOp::Cp,
    }
}

const fn to_a(src: Src8) -> Instruction {
    Instruction::Ld8 {
        dst: Dst8::Reg(Reg8::A),
        src,
    }
}

const fn from_a(dst: Dst8) -> Instruction {
    Instruction::Ld8 {
        dst,
        src: Src8::Reg(Reg8::A),
    }
}

const fn decode_base(opcode: u8) -> Instruction {
    let f = Fields::split(opcode);
    match f.x {
        0 => decode_block0(opcode, f),
        1 if f.y == 6 && f.z == 6 => Instruction::Halt,
        1 => Instruction::Ld8 {
            dst: r_operand(f.y),
            src: Src8::from_dst(r_operand(f.z)),
        },
        2 => Instruction::Alu {
            op: alu(f.y),
            src: Src8::from_dst(r_operand(f.z)),
        },
        _ => decode_block3(opcode, f),
    }
}

const fn decode_block0(opcode: u8, f: Fields) -> Instruction {
    match (f.z, f.y) {
        (0, 0) => Instruction::Nop,
        (0, 1) => Instruction::Exchange(ExchangeKind::AfShadow),
        (0, 2) => Instruction::Djnz,
        (0, 3) => Instruction::Jr(None),
        (0, _) => Instruction::Jr(Some(cc(f.y - 4))),
        (1, _) if f.q => Instruction::AddHl(rp(f.p)),
        (1, _) => Instruction::Ld16 {
            dst: Dst16::Reg(rp(f.p)),
            src: Src16::Immediate,
        },
        (2, _) => decode_indirect_loads(f),
        (3, _) if f.q => Instruction::Dec16(rp(f.p)),
        (3, _) => Instruction::Inc16(rp(f.p)),
        (4, _) => Instruction::Inc8(r_operand(f.y)),
        (5, _) => Instruction::Dec8(r_operand(f.y)),
        (6, _) => Instruction::Ld8 {
            dst: r_operand(f.y),
            src: Src8::Immediate,
        },
        (_, 0) => Instruction::RotateA(RotateOp::Rlca),
        (_, 1) => Instruction::RotateA(RotateOp::Rrca),
        (_, 2) => Instruction::RotateA(RotateOp::Rla),
        (_, 3) => Instruction::RotateA(RotateOp::Rra),
        (_, 5) => Instruction::Cpl,
        (_, 6) => Instruction::Scf,
        (_, 7) => Instruction::Ccf,
        // DAA
        _ => illegal(opcode),
    }
}

const fn decode_indirect_loads(f: Fields) -> Instruction {
    match (f.q, f.p) {
        (false, 0) => from_a(Dst8::Indirect(Reg16::BC)),
        (false, 1) => from_a(Dst8::Indirect(Reg16::DE)),
        (false, 2) => Instruction::Ld16 {
            dst: Dst16::ImmediateIndirect,
            src: Src16::Reg(Reg16::HL),
        },
        (false, _) => from_a(Dst8::ImmediateIndirect),
        (true, 0) => to_a(Src8::Indirect(Reg16::BC)),
        (true, 1) => to_a(Src8::Indirect(Reg16::DE)),
        (true, 2) => Instruction::Ld16 {
            dst: Dst16::Reg(Reg16::HL),
            src: Src16::ImmediateIndirect,
        },
        (true, _) => to_a(Src8::ImmediateIndirect),
    }
}

const fn decode_block3(opcode: u8, f: Fields) -> Instruction {
    match f.z {
        0 => Instruction::Ret(Some(cc(f.y))),
        1 if !f.q => Instruction::Pop(rp2(f.p)),
        1 => match f.p {
            0 => Instruction::Ret(None),
            1 => Instruction::Exchange(ExchangeKind::AllShadow),
            2 => Instruction::JpHl,
            _ => Instruction::Ld16 {
                dst: Dst16::Reg(Reg16::SP),
                src: Src16::Reg(Reg16::HL),
            },
        },
        2 => Instruction::Jp(Some(cc(f.y))),
        3 => match f.y {
            0 => Instruction::Jp(None),
            4 => Instruction::ExSpHl,
            5 => Instruction::Exchange(ExchangeKind::DeHl),
            6 => Instruction::Di,
            7 => Instruction::Ei,
            // CB prefix, OUT (n),A, IN A,(n)
            _ => illegal(opcode),
        },
        4 => Instruction::Call(Some(cc(f.y))),
        5 if !f.q => Instruction::Push(rp2(f.p)),
        // DD, ED and FD prefixes land here from the base table
        5 if f.p != 0 => illegal(opcode),
        5 => Instruction::Call(None),
        6 => Instruction::Alu {
            op: alu(f.y),
            src: Src8::Immediate,
        },
        _ => Instruction::Rst(f.y * 8),
    }
}

const fn decode_ed(opcode: u8) -> Instruction {
    let f = Fields::split(opcode);
    if f.x != 1 {
        return illegal_ed(opcode);
    }
    match (f.z, f.y) {
        (2, _) if f.q => Instruction::AdcHl(rp(f.p)),
        (2, _) => Instruction::SbcHl(rp(f.p)),
        (4, 0) => Instruction::Neg,
        (5, 0) => Instruction::Retn,
        (5, 1) => Instruction::Reti,
        (6, 0) => Instruction::Im(InterruptMode::Mode0),
        (6, 2) => Instruction::Im(InterruptMode::Mode1),
        (6, 3) => Instruction::Im(InterruptMode::Mode2),
        (7, 0) => Instruction::LdIA,
        (7, 2) => Instruction::LdAI,
        _ => illegal_ed(opcode),
    }
}
