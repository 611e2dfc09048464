//! Stack primitives shared by instructions and interrupt entry.

use crate::bus::{Bus, BusError};
use crate::state::RegisterBank;

/// Pushes `value`: `SP` drops by two, then the word is stored little-endian
/// at the new `SP`.
///
/// `SP` is only committed once both bytes are written.
///
/// # Errors
///
/// Propagates bus failures.
pub fn push_word<B: Bus + ?Sized>(
    regs: &mut RegisterBank,
    bus: &mut B,
    value: u16,
) -> Result<(), BusError> {
    let sp = regs.sp().wrapping_sub(2);
    bus.write_word(sp, value)?;
    regs.set_sp(sp);
    Ok(())
}

/// Pops a little-endian word from `SP` and raises `SP` by two.
///
/// # Errors
///
/// Propagates bus failures.
pub fn pop_word<B: Bus + ?Sized>(regs: &mut RegisterBank, bus: &mut B) -> Result<u16, BusError> {
    let value = bus.read_word(regs.sp())?;
    regs.set_sp(regs.sp().wrapping_add(2));
    Ok(value)
}

/// Pushes the current `PC` and transfers control to `target`.
///
/// # Errors
///
/// Propagates bus failures; `PC` is untouched when the push fails.
pub fn call_subroutine<B: Bus + ?Sized>(
    regs: &mut RegisterBank,
    bus: &mut B,
    target: u16,
) -> Result<(), BusError> {
    let return_address = regs.pc();
    push_word(regs, bus, return_address)?;
    regs.set_pc(target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{call_subroutine, pop_word, push_word};
    use crate::bus::BusError;
    use crate::memory::FlatBus;
    use crate::state::RegisterBank;

    #[test]
    fn push_predecrements_and_stores_little_endian() {
        let mut regs = RegisterBank::default();
        regs.set_sp(0x8000);
        let mut bus = FlatBus::new();

        push_word(&mut regs, &mut bus, 0x1234).expect("push");
        assert_eq!(regs.sp(), 0x7FFE);
        assert_eq!(bus.peek(0x7FFE), 0x34);
        assert_eq!(bus.peek(0x7FFF), 0x12);

        assert_eq!(pop_word(&mut regs, &mut bus), Ok(0x1234));
        assert_eq!(regs.sp(), 0x8000);
    }

    #[test]
    fn call_pushes_pre_call_pc() {
        let mut regs = RegisterBank::default();
        regs.set_pc(0x0150);
        regs.set_sp(0x0000);
        let mut bus = FlatBus::new();

        call_subroutine(&mut regs, &mut bus, 0x0066).expect("call");
        assert_eq!(regs.pc(), 0x0066);
        assert_eq!(regs.sp(), 0xFFFE);
        assert_eq!(bus.peek(0xFFFE), 0x50);
        assert_eq!(bus.peek(0xFFFF), 0x01);
    }

    #[test]
    fn failed_push_leaves_sp_and_pc() {
        let mut regs = RegisterBank::default();
        regs.set_pc(0x0200);
        regs.set_sp(0x0010);
        let mut bus = FlatBus::with_rom(0x4000);

        assert_eq!(
            call_subroutine(&mut regs, &mut bus, 0x0038),
            Err(BusError::ReadOnly { addr: 0x000E })
        );
        assert_eq!(regs.sp(), 0x0010);
        assert_eq!(regs.pc(), 0x0200);
    }
}
