//! Flags engine: flag bit layout, the affection algebra, and the
//! precomputed outcome tables consulted by every ALU instruction.

mod affection;
mod tables;

pub use affection::FlagsAffection;
pub use tables::{adc16, add16, sbc16, tables, FlagTables};

/// Sign: copy of result bit 7.
pub const FLAG_S: u8 = 1 << 7;
/// Zero result.
pub const FLAG_Z: u8 = 1 << 6;
/// Undocumented copy of result bit 5.
pub const FLAG_F5: u8 = 1 << 5;
/// Half carry/borrow across bit 3/4 (bit 11/12 for word operations).
pub const FLAG_H: u8 = 1 << 4;
/// Undocumented copy of result bit 3.
pub const FLAG_F3: u8 = 1 << 3;
/// Parity (logic) or signed overflow (arithmetic).
pub const FLAG_PV: u8 = 1 << 2;
/// Last operation was a subtraction.
pub const FLAG_N: u8 = 1 << 1;
/// Carry/borrow out of the most significant bit.
pub const FLAG_C: u8 = 1 << 0;

/// Flags derived from the result byte alone (`S`, `Z`, `F5`, `F3`).
pub const INTRINSIC_MASK: u8 = FLAG_S | FLAG_Z | FLAG_F5 | FLAG_F3;
/// Undocumented bit-copy flags.
pub const UNDOCUMENTED_MASK: u8 = FLAG_F5 | FLAG_F3;
/// Every bit of `F`.
pub const ALL_FLAGS_MASK: u8 = 0xFF;

/// Even population count of `value`.
#[must_use]
pub const fn parity_even(value: u8) -> bool {
    value.count_ones() % 2 == 0
}
