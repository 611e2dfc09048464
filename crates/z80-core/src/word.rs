//! Fixed-width octet and word primitives.
//!
//! Register halves, operand fetches and ALU results are all plain `u8`/`u16`
//! values; these traits give them the wrap-on-overflow and half-split
//! vocabulary the rest of the core is written in.

/// 8-bit value operations.
pub trait Octet: Copy {
    /// Adds one, wrapping `0xFF` to `0x00`.
    #[must_use]
    fn increment(self) -> Self;

    /// Subtracts one, wrapping `0x00` to `0xFF`.
    #[must_use]
    fn decrement(self) -> Self;

    /// Returns `true` when bit `n` is set. Indices past bit 7 read as clear.
    fn bit(self, n: u8) -> bool;
}

impl Octet for u8 {
    fn increment(self) -> Self {
        self.wrapping_add(1)
    }

    fn decrement(self) -> Self {
        self.wrapping_sub(1)
    }

    fn bit(self, n: u8) -> bool {
        self.checked_shr(u32::from(n))
            .is_some_and(|shifted| shifted & 1 != 0)
    }
}

/// 16-bit value operations, including high/low octet access.
pub trait Word: Copy {
    /// Adds one, wrapping `0xFFFF` to `0x0000`.
    #[must_use]
    fn increment(self) -> Self;

    /// Subtracts one, wrapping `0x0000` to `0xFFFF`.
    #[must_use]
    fn decrement(self) -> Self;

    /// Returns `true` when bit `n` is set. Indices past bit 15 read as clear.
    fn bit(self, n: u8) -> bool;

    /// Bits 15..8.
    fn high(self) -> u8;

    /// Bits 7..0.
    fn low(self) -> u8;

    /// Splits into `(high, low)`.
    fn split(self) -> (u8, u8);

    /// Rebuilds a word from its halves.
    fn from_halves(high: u8, low: u8) -> Self;

    /// Replaces bits 15..8, keeping the low octet.
    #[must_use]
    fn with_high(self, high: u8) -> Self;

    /// Replaces bits 7..0, keeping the high octet.
    #[must_use]
    fn with_low(self, low: u8) -> Self;
}

impl Word for u16 {
    fn increment(self) -> Self {
        self.wrapping_add(1)
    }

    fn decrement(self) -> Self {
        self.wrapping_sub(1)
    }

    fn bit(self, n: u8) -> bool {
        self.checked_shr(u32::from(n))
            .is_some_and(|shifted| shifted & 1 != 0)
    }

    fn high(self) -> u8 {
        self.to_be_bytes()[0]
    }

    fn low(self) -> u8 {
        self.to_be_bytes()[1]
    }

    fn split(self) -> (u8, u8) {
        let [high, low] = self.to_be_bytes();
        (high, low)
    }

    fn from_halves(high: u8, low: u8) -> Self {
        Self::from_be_bytes([high, low])
    }

    fn with_high(self, high: u8) -> Self {
        Self::from_halves(high, self.low())
    }

    fn with_low(self, low: u8) -> Self {
        Self::from_halves(self.high(), low)
    }
}
