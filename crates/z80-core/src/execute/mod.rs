//! Instruction semantics.
//!
//! Each `execute_*` routine performs its data movement through the operand
//! model and folds its flag rule into `F`. Control flow is reported back as
//! a [`Flow`]; `PC` is written exactly once, after the routine returns, so
//! operand reads always see the opcode address.

mod stack;

pub use stack::{call_subroutine, pop_word, push_word};

use crate::bus::{Bus, BusError};
use crate::fault::Fault;
use crate::flags::{
    adc16, add16, sbc16, tables, FlagsAffection, FLAG_C, FLAG_H, FLAG_N, FLAG_PV,
    UNDOCUMENTED_MASK,
};
use crate::instruction::{AluOp, Condition, ExchangeKind, Instruction, RotateOp};
use crate::operand::{Dst16, Dst8, Src16, Src8};
use crate::state::{InterruptMode, Reg16, Reg8, RegisterBank};
use crate::word::{Octet, Word};

/// Result of a retired instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecuteOutcome {
    /// Instruction retired.
    Retired {
        /// T-cycles consumed.
        cycles: u32,
    },
    /// `HALT` retired; the halt latch is set.
    Halted {
        /// T-cycles consumed.
        cycles: u32,
    },
    /// `IM n` retired; the caller owns the interrupt mode.
    InterruptModeSelected {
        /// T-cycles consumed.
        cycles: u32,
        /// Newly selected mode.
        mode: InterruptMode,
    },
}

impl ExecuteOutcome {
    /// T-cycles consumed, whatever the variant.
    #[must_use]
    pub const fn cycles(self) -> u32 {
        match self {
            Self::Retired { cycles }
            | Self::Halted { cycles }
            | Self::InterruptModeSelected { cycles, .. } => cycles,
        }
    }
}

/// Where control goes after an instruction body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Continue at the next instruction.
    Next,
    /// Condition failed; continue at the next instruction at the reduced cost.
    NotTaken,
    /// Transfer control.
    Jump(u16),
}

impl Flow {
    const fn taken_if(condition: bool, target: u16) -> Self {
        if condition {
            Self::Jump(target)
        } else {
            Self::NotTaken
        }
    }
}

/// Executes one decoded instruction located at the current `PC`.
///
/// # Errors
///
/// Returns [`Fault::IllegalOpcode`] for the illegal sentinel (nothing is
/// modified) and [`Fault::Bus`] when an access fails (`PC` is not advanced).
pub fn execute_instruction<B: Bus + ?Sized>(
    instruction: Instruction,
    regs: &mut RegisterBank,
    bus: &mut B,
) -> Result<ExecuteOutcome, Fault> {
    let pc = regs.pc();
    let next_pc = pc.wrapping_add(u16::from(instruction.size()));

    let flow = match instruction {
        Instruction::Illegal { prefix, opcode } => {
            return Err(Fault::IllegalOpcode { prefix, opcode, pc });
        }
        Instruction::Nop => Flow::Next,
        Instruction::Halt => {
            regs.set_halted(true);
            Flow::Next
        }
        Instruction::Ld8 { dst, src } => execute_ld8(regs, bus, dst, src)?,
        Instruction::Ld16 { dst, src } => execute_ld16(regs, bus, dst, src)?,
        Instruction::Inc8(dst) => execute_inc_dec8(regs, bus, dst, true)?,
        Instruction::Dec8(dst) => execute_inc_dec8(regs, bus, dst, false)?,
        Instruction::Inc16(reg) => {
            regs.set_reg16(reg, regs.reg16(reg).increment());
            Flow::Next
        }
        Instruction::Dec16(reg) => {
            regs.set_reg16(reg, regs.reg16(reg).decrement());
            Flow::Next
        }
        Instruction::Alu { op, src } => execute_alu(regs, bus, op, src)?,
        Instruction::AddHl(reg) => execute_add_hl(regs, reg),
        Instruction::AdcHl(reg) => execute_adc_sbc_hl(regs, reg, false),
        Instruction::SbcHl(reg) => execute_adc_sbc_hl(regs, reg, true),
        Instruction::RotateA(op) => execute_rotate_a(regs, op),
        Instruction::Cpl | Instruction::Scf | Instruction::Ccf | Instruction::Neg => {
            execute_accumulator(regs, instruction)
        }
        Instruction::Exchange(kind) => execute_exchange(regs, kind),
        Instruction::ExSpHl => execute_ex_sp_hl(regs, bus)?,
        Instruction::Jp(condition) => {
            let target = Src16::Immediate.read(regs, bus)?;
            Flow::taken_if(condition_holds(regs, condition), target)
        }
        Instruction::JpHl => Flow::Jump(regs.reg16(Reg16::HL)),
        Instruction::Jr(condition) => {
            let target = relative_target(regs, bus, next_pc)?;
            Flow::taken_if(condition_holds(regs, condition), target)
        }
        Instruction::Djnz => execute_djnz(regs, bus, next_pc)?,
        Instruction::Call(condition) => execute_call(regs, bus, condition, next_pc)?,
        Instruction::Ret(condition) => {
            if condition_holds(regs, condition) {
                Flow::Jump(pop_word(regs, bus)?)
            } else {
                Flow::NotTaken
            }
        }
        Instruction::Retn | Instruction::Reti => {
            let target = pop_word(regs, bus)?;
            regs.set_iff1(regs.iff2());
            Flow::Jump(target)
        }
        Instruction::Rst(target) => {
            push_word(regs, bus, next_pc)?;
            Flow::Jump(u16::from(target))
        }
        Instruction::Push(reg) => {
            let value = regs.reg16(reg);
            push_word(regs, bus, value)?;
            Flow::Next
        }
        Instruction::Pop(reg) => {
            let value = pop_word(regs, bus)?;
            regs.set_reg16(reg, value);
            Flow::Next
        }
        Instruction::Di => {
            regs.set_iffs(false);
            Flow::Next
        }
        Instruction::Ei => {
            regs.set_iffs(true);
            regs.set_ei_executed(true);
            Flow::Next
        }
        Instruction::Im(_) => Flow::Next,
        Instruction::LdIA => {
            regs.set_i(regs.a());
            Flow::Next
        }
        Instruction::LdAI => execute_ld_a_i(regs),
    };

    let cycles = instruction.cycles(flow != Flow::NotTaken);
    regs.set_pc(match flow {
        Flow::Jump(target) => target,
        Flow::Next | Flow::NotTaken => next_pc,
    });

    Ok(match instruction {
        Instruction::Halt => ExecuteOutcome::Halted { cycles },
        Instruction::Im(mode) => ExecuteOutcome::InterruptModeSelected { cycles, mode },
        _ => ExecuteOutcome::Retired { cycles },
    })
}

fn apply_flags(regs: &mut RegisterBank, affection: FlagsAffection) {
    regs.set_flags(affection.apply(regs.flags()));
}

fn carry_in(regs: &RegisterBank) -> bool {
    regs.flag_is_set(FLAG_C)
}

fn condition_holds(regs: &RegisterBank, condition: Option<Condition>) -> bool {
    condition.is_none_or(|cc| cc.holds(regs.flags()))
}

fn relative_target<B: Bus + ?Sized>(
    regs: &RegisterBank,
    bus: &mut B,
    next_pc: u16,
) -> Result<u16, BusError> {
    let displacement = i8::from_ne_bytes([Src8::Immediate.read(regs, bus)?]);
    Ok(next_pc.wrapping_add_signed(i16::from(displacement)))
}

fn execute_ld8<B: Bus + ?Sized>(
    regs: &mut RegisterBank,
    bus: &mut B,
    dst: Dst8,
    src: Src8,
) -> Result<Flow, BusError> {
    let value = src.read(regs, bus)?;
    dst.write(regs, bus, value)?;
    Ok(Flow::Next)
}

fn execute_ld16<B: Bus + ?Sized>(
    regs: &mut RegisterBank,
    bus: &mut B,
    dst: Dst16,
    src: Src16,
) -> Result<Flow, BusError> {
    let value = src.read(regs, bus)?;
    dst.write(regs, bus, value)?;
    Ok(Flow::Next)
}

fn execute_inc_dec8<B: Bus + ?Sized>(
    regs: &mut RegisterBank,
    bus: &mut B,
    dst: Dst8,
    increment: bool,
) -> Result<Flow, BusError> {
    let operand = dst.read(regs, bus)?;
    let (result, affection) = if increment {
        (operand.increment(), tables().inc(operand))
    } else {
        (operand.decrement(), tables().dec(operand))
    };
    dst.write(regs, bus, result)?;
    apply_flags(regs, affection);
    Ok(Flow::Next)
}

fn execute_alu<B: Bus + ?Sized>(
    regs: &mut RegisterBank,
    bus: &mut B,
    op: AluOp,
    src: Src8,
) -> Result<Flow, BusError> {
    let a = regs.a();
    let b = src.read(regs, bus)?;
    let carry = carry_in(regs);
    let t = tables();

    let (result, affection) = match op {
        AluOp::Add => (a.wrapping_add(b), t.add(a, b, false)),
        AluOp::Adc => (
            a.wrapping_add(b).wrapping_add(u8::from(carry)),
            t.add(a, b, carry),
        ),
        AluOp::Sub => (a.wrapping_sub(b), t.sub(a, b, false)),
        AluOp::Sbc => (
            a.wrapping_sub(b).wrapping_sub(u8::from(carry)),
            t.sub(a, b, carry),
        ),
        AluOp::And => (a & b, t.and(a & b)),
        AluOp::Xor => (a ^ b, t.or_xor(a ^ b)),
        AluOp::Or => (a | b, t.or_xor(a | b)),
        // CP leaves A alone.
        AluOp::Cp => (a, t.compare(a, b)),
    };

    regs.set_a(result);
    apply_flags(regs, affection);
    Ok(Flow::Next)
}

fn execute_add_hl(regs: &mut RegisterBank, reg: Reg16) -> Flow {
    let hl = regs.reg16(Reg16::HL);
    let operand = regs.reg16(reg);
    regs.set_reg16(Reg16::HL, hl.wrapping_add(operand));
    apply_flags(regs, add16(hl, operand));
    Flow::Next
}

fn execute_adc_sbc_hl(regs: &mut RegisterBank, reg: Reg16, subtract: bool) -> Flow {
    let hl = regs.reg16(Reg16::HL);
    let operand = regs.reg16(reg);
    let carry = carry_in(regs);
    let (result, affection) = if subtract {
        (
            hl.wrapping_sub(operand).wrapping_sub(u16::from(carry)),
            sbc16(hl, operand, carry),
        )
    } else {
        (
            hl.wrapping_add(operand).wrapping_add(u16::from(carry)),
            adc16(hl, operand, carry),
        )
    };
    regs.set_reg16(Reg16::HL, result);
    apply_flags(regs, affection);
    Flow::Next
}

fn execute_rotate_a(regs: &mut RegisterBank, op: RotateOp) -> Flow {
    let a = regs.a();
    let carry = u8::from(carry_in(regs));
    let (result, carry_out) = match op {
        RotateOp::Rlca => (a.rotate_left(1), a.bit(7)),
        RotateOp::Rrca => (a.rotate_right(1), a.bit(0)),
        RotateOp::Rla => ((a << 1) | carry, a.bit(7)),
        RotateOp::Rra => ((a >> 1) | (carry << 7), a.bit(0)),
    };
    regs.set_a(result);
    apply_flags(
        regs,
        tables().rotate_accumulator(result) & FlagsAffection::flag(FLAG_C, carry_out),
    );
    Flow::Next
}

fn execute_accumulator(regs: &mut RegisterBank, instruction: Instruction) -> Flow {
    let a = regs.a();
    let carry = carry_in(regs);
    let copy_undocumented = |value: u8| FlagsAffection::assign(UNDOCUMENTED_MASK, value);

    let (result, affection) = match instruction {
        Instruction::Cpl => (!a, copy_undocumented(!a) & FlagsAffection::sets(FLAG_H | FLAG_N)),
        Instruction::Scf => (
            a,
            copy_undocumented(a)
                & FlagsAffection::clears(FLAG_H | FLAG_N)
                & FlagsAffection::sets(FLAG_C),
        ),
        Instruction::Ccf => (
            a,
            copy_undocumented(a)
                & FlagsAffection::clears(FLAG_N)
                & FlagsAffection::flag(FLAG_H, carry)
                & FlagsAffection::flag(FLAG_C, !carry),
        ),
        // NEG
        _ => (0u8.wrapping_sub(a), tables().sub(0, a, false)),
    };

    regs.set_a(result);
    apply_flags(regs, affection);
    Flow::Next
}

fn execute_exchange(regs: &mut RegisterBank, kind: ExchangeKind) -> Flow {
    match kind {
        ExchangeKind::AfShadow => regs.exchange_af(),
        ExchangeKind::AllShadow => regs.exchange_all(),
        ExchangeKind::DeHl => {
            let de = regs.reg16(Reg16::DE);
            regs.set_reg16(Reg16::DE, regs.reg16(Reg16::HL));
            regs.set_reg16(Reg16::HL, de);
        }
    }
    Flow::Next
}

fn execute_ex_sp_hl<B: Bus + ?Sized>(
    regs: &mut RegisterBank,
    bus: &mut B,
) -> Result<Flow, BusError> {
    let stacked = Src16::Indirect(Reg16::SP).read(regs, bus)?;
    let hl = regs.reg16(Reg16::HL);
    Dst16::Indirect(Reg16::SP).write(regs, bus, hl)?;
    regs.set_reg16(Reg16::HL, stacked);
    Ok(Flow::Next)
}

fn execute_djnz<B: Bus + ?Sized>(
    regs: &mut RegisterBank,
    bus: &mut B,
    next_pc: u16,
) -> Result<Flow, BusError> {
    let target = relative_target(regs, bus, next_pc)?;
    let counter = regs.reg8(Reg8::B).decrement();
    regs.set_reg8(Reg8::B, counter);
    Ok(Flow::taken_if(counter != 0, target))
}

fn execute_call<B: Bus + ?Sized>(
    regs: &mut RegisterBank,
    bus: &mut B,
    condition: Option<Condition>,
    next_pc: u16,
) -> Result<Flow, BusError> {
    let target = Src16::Immediate.read(regs, bus)?;
    if !condition_holds(regs, condition) {
        return Ok(Flow::NotTaken);
    }
    push_word(regs, bus, next_pc)?;
    Ok(Flow::Jump(target))
}

fn execute_ld_a_i(regs: &mut RegisterBank) -> Flow {
    let value = regs.i();
    let affection = tables().intrinsic(value)
        & FlagsAffection::clears(FLAG_H | FLAG_N)
        & FlagsAffection::flag(FLAG_PV, regs.iff2());
    regs.set_a(value);
    apply_flags(regs, affection);
    Flow::Next
}
