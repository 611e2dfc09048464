use crate::word::Word;

/// Value loaded into `AF` and `SP` by reset.
pub const RESET_AF_SP: u16 = 0xFFFF;

/// Addressable 8-bit register half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl Reg8 {
    /// Decodes the 3-bit `r` opcode field. Code 6 selects `(HL)` and has no
    /// register.
    #[must_use]
    pub const fn from_r_field(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::B),
            1 => Some(Self::C),
            2 => Some(Self::D),
            3 => Some(Self::E),
            4 => Some(Self::H),
            5 => Some(Self::L),
            7 => Some(Self::A),
            _ => None,
        }
    }

    /// Pair holding this half, and whether it is the high half.
    #[must_use]
    pub const fn location(self) -> (Reg16, bool) {
        match self {
            Self::A => (Reg16::AF, true),
            Self::F => (Reg16::AF, false),
            Self::B => (Reg16::BC, true),
            Self::C => (Reg16::BC, false),
            Self::D => (Reg16::DE, true),
            Self::E => (Reg16::DE, false),
            Self::H => (Reg16::HL, true),
            Self::L => (Reg16::HL, false),
        }
    }
}

/// Addressable 16-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    SP,
    PC,
}

impl Reg16 {
    /// Decodes the 2-bit `rp` field used by loads and 16-bit arithmetic.
    #[must_use]
    pub const fn from_rp_field(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::BC),
            1 => Some(Self::DE),
            2 => Some(Self::HL),
            3 => Some(Self::SP),
            _ => None,
        }
    }

    /// Decodes the 2-bit `rp2` field used by `PUSH`/`POP` (`AF` replaces `SP`).
    #[must_use]
    pub const fn from_rp2_field(bits: u8) -> Option<Self> {
        match bits {
            3 => Some(Self::AF),
            _ => Self::from_rp_field(bits),
        }
    }
}

/// Complete programmer-visible state, including shadow pairs and the
/// interrupt flip-flops.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct RegisterBank {
    af: u16,
    bc: u16,
    de: u16,
    hl: u16,
    shadow: [u16; 4],
    pc: u16,
    sp: u16,
    i: u8,
    iff1: bool,
    iff2: bool,
    nmi_pending: bool,
    int_pending: bool,
    ei_executed: bool,
    halted: bool,
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self {
            af: RESET_AF_SP,
            bc: 0,
            de: 0,
            hl: 0,
            shadow: [0; 4],
            pc: 0,
            sp: RESET_AF_SP,
            i: 0,
            iff1: false,
            iff2: false,
            nmi_pending: false,
            int_pending: false,
            ei_executed: false,
            halted: false,
        }
    }
}

impl RegisterBank {
    /// Re-initializes every register; the INT flip-flop takes the current
    /// level of the external INT line.
    pub fn reset(&mut self, int_line: bool) {
        *self = Self {
            int_pending: int_line,
            ..Self::default()
        };
    }

    /// Reads a 16-bit register.
    #[must_use]
    pub const fn reg16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::AF => self.af,
            Reg16::BC => self.bc,
            Reg16::DE => self.de,
            Reg16::HL => self.hl,
            Reg16::SP => self.sp,
            Reg16::PC => self.pc,
        }
    }

    /// Writes a 16-bit register.
    pub const fn set_reg16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::AF => self.af = value,
            Reg16::BC => self.bc = value,
            Reg16::DE => self.de = value,
            Reg16::HL => self.hl = value,
            Reg16::SP => self.sp = value,
            Reg16::PC => self.pc = value,
        }
    }

    /// Reads an 8-bit register half.
    #[must_use]
    pub fn reg8(&self, reg: Reg8) -> u8 {
        let (pair, high) = reg.location();
        let word = self.reg16(pair);
        if high {
            word.high()
        } else {
            word.low()
        }
    }

    /// Writes an 8-bit register half; the other half of the pair is kept.
    pub fn set_reg8(&mut self, reg: Reg8, value: u8) {
        let (pair, high) = reg.location();
        let word = self.reg16(pair);
        let merged = if high {
            word.with_high(value)
        } else {
            word.with_low(value)
        };
        self.set_reg16(pair, merged);
    }

    /// Reads the `PC` register.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the `PC` register.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Reads the `SP` register.
    #[must_use]
    pub const fn sp(&self) -> u16 {
        self.sp
    }

    /// Writes the `SP` register.
    pub const fn set_sp(&mut self, value: u16) {
        self.sp = value;
    }

    /// Reads the accumulator.
    #[must_use]
    pub fn a(&self) -> u8 {
        self.reg8(Reg8::A)
    }

    /// Writes the accumulator.
    pub fn set_a(&mut self, value: u8) {
        self.set_reg8(Reg8::A, value);
    }

    /// Reads the flags register.
    #[must_use]
    pub fn flags(&self) -> u8 {
        self.reg8(Reg8::F)
    }

    /// Writes the flags register.
    pub fn set_flags(&mut self, value: u8) {
        self.set_reg8(Reg8::F, value);
    }

    /// Returns `true` when every bit of `flag` is set in `F`.
    #[must_use]
    pub fn flag_is_set(&self, flag: u8) -> bool {
        self.flags() & flag == flag
    }

    /// Reads the interrupt vector base `I`.
    #[must_use]
    pub const fn i(&self) -> u8 {
        self.i
    }

    /// Writes the interrupt vector base `I`.
    pub const fn set_i(&mut self, value: u8) {
        self.i = value;
    }

    /// Shadow pairs in `[AF', BC', DE', HL']` order.
    #[must_use]
    pub const fn shadow_pairs(&self) -> [u16; 4] {
        self.shadow
    }

    /// Replaces the shadow pairs, `[AF', BC', DE', HL']` order.
    pub const fn set_shadow_pairs(&mut self, pairs: [u16; 4]) {
        self.shadow = pairs;
    }

    /// `EX AF,AF'`.
    pub fn exchange_af(&mut self) {
        std::mem::swap(&mut self.af, &mut self.shadow[0]);
    }

    /// `EXX`: swaps `BC`, `DE` and `HL` with their shadows.
    pub fn exchange_all(&mut self) {
        std::mem::swap(&mut self.bc, &mut self.shadow[1]);
        std::mem::swap(&mut self.de, &mut self.shadow[2]);
        std::mem::swap(&mut self.hl, &mut self.shadow[3]);
    }

    /// Interrupt-enable flip-flop 1 (gates maskable interrupts).
    #[must_use]
    pub const fn iff1(&self) -> bool {
        self.iff1
    }

    /// Interrupt-enable flip-flop 2 (saved copy restored by `RETN`).
    #[must_use]
    pub const fn iff2(&self) -> bool {
        self.iff2
    }

    /// Sets both enable flip-flops, as `EI`/`DI` do.
    pub const fn set_iffs(&mut self, enabled: bool) {
        self.iff1 = enabled;
        self.iff2 = enabled;
    }

    /// Writes IFF1 alone.
    pub const fn set_iff1(&mut self, enabled: bool) {
        self.iff1 = enabled;
    }

    /// Latched non-maskable interrupt request.
    #[must_use]
    pub const fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Writes the NMI flip-flop.
    pub const fn set_nmi_pending(&mut self, pending: bool) {
        self.nmi_pending = pending;
    }

    /// Sampled level of the maskable interrupt line.
    #[must_use]
    pub const fn int_pending(&self) -> bool {
        self.int_pending
    }

    /// Writes the INT flip-flop.
    pub const fn set_int_pending(&mut self, pending: bool) {
        self.int_pending = pending;
    }

    /// Set by `EI`; suppresses interrupt acceptance for one instruction.
    #[must_use]
    pub const fn ei_executed(&self) -> bool {
        self.ei_executed
    }

    /// Writes the "just executed EI" flip-flop.
    pub const fn set_ei_executed(&mut self, executed: bool) {
        self.ei_executed = executed;
    }

    /// Set by `HALT` until an interrupt is accepted.
    #[must_use]
    pub const fn halted(&self) -> bool {
        self.halted
    }

    /// Writes the halt latch.
    pub const fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }
}
