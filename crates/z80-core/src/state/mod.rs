//! Programmer-visible processor state.

/// Register bank, register identifiers and interrupt flip-flops.
pub mod registers;

pub use registers::{Reg16, Reg8, RegisterBank, RESET_AF_SP};

/// Response selected for an accepted maskable interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum InterruptMode {
    /// Execute the opcode supplied during acknowledge.
    #[default]
    Mode0,
    /// Call the fixed vector `0x0038`.
    Mode1,
    /// Call `(I << 8) | acknowledge byte`.
    Mode2,
}

impl InterruptMode {
    /// Numeric mode as written in `IM n`.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Mode0 => 0,
            Self::Mode1 => 1,
            Self::Mode2 => 2,
        }
    }

    /// Inverse of [`Self::number`].
    #[must_use]
    pub const fn from_number(mode: u8) -> Option<Self> {
        match mode {
            0 => Some(Self::Mode0),
            1 => Some(Self::Mode1),
            2 => Some(Self::Mode2),
            _ => None,
        }
    }
}
