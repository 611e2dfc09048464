//! Precomputed flag outcomes.
//!
//! Every 8-bit operand combination is evaluated once per process and cached;
//! word-wide arithmetic is derived on demand.

use std::sync::OnceLock;

use super::{
    parity_even, FlagsAffection, ALL_FLAGS_MASK, FLAG_C, FLAG_H, FLAG_N, FLAG_PV, FLAG_S, FLAG_Z,
    INTRINSIC_MASK, UNDOCUMENTED_MASK,
};
use crate::word::Word;

const OPERAND_PAIRS: usize = 256 * 256;
const ROTATE_MASK: u8 = UNDOCUMENTED_MASK | FLAG_H | FLAG_N;

/// Read-only flag tables shared by every processor in the process.
pub struct FlagTables {
    intrinsic: [u8; 256],
    add: Box<[u8]>,
    sub: Box<[u8]>,
    inc: [u8; 256],
    dec: [u8; 256],
    and: [u8; 256],
    or_xor: [u8; 256],
    rotate: [u8; 256],
}

/// Returns the process-wide tables, building them on first use.
#[must_use]
pub fn tables() -> &'static FlagTables {
    static TABLES: OnceLock<FlagTables> = OnceLock::new();
    TABLES.get_or_init(FlagTables::build)
}

/// Carry out of the bits selected by `mask` for `a + b (+ carry_in)`.
const fn carried(a: u32, result: u32, mask: u32, carry_in: bool) -> bool {
    if carry_in {
        (a & mask) >= (result & mask)
    } else {
        (a & mask) > (result & mask)
    }
}

/// Borrow into the bits selected by `mask` for `a - b (- carry_in)`.
const fn borrowed(a: u32, result: u32, mask: u32, carry_in: bool) -> bool {
    if carry_in {
        (a & mask) <= (result & mask)
    } else {
        (a & mask) < (result & mask)
    }
}

const fn bit_if(flag: u8, condition: bool) -> u8 {
    if condition {
        flag
    } else {
        0
    }
}

const fn intrinsic_bits(result: u8) -> u8 {
    (result & (FLAG_S | UNDOCUMENTED_MASK)) | bit_if(FLAG_Z, result == 0)
}

const fn add_bits(a: u8, b: u8, carry_in: bool) -> u8 {
    let result = a.wrapping_add(b).wrapping_add(carry_in as u8);
    let (wa, wr) = (a as u32, result as u32);
    let overflow = ((a ^ b ^ 0x80) & (b ^ result) & 0x80) != 0;

    intrinsic_bits(result)
        | bit_if(FLAG_H, carried(wa, wr, 0x0F, carry_in))
        | bit_if(FLAG_PV, overflow)
        | bit_if(FLAG_C, carried(wa, wr, 0xFF, carry_in))
}

const fn sub_bits(a: u8, b: u8, carry_in: bool) -> u8 {
    let result = a.wrapping_sub(b).wrapping_sub(carry_in as u8);
    let (wa, wr) = (a as u32, result as u32);
    let underflow = ((a ^ b) & (a ^ result) & 0x80) != 0;

    intrinsic_bits(result)
        | FLAG_N
        | bit_if(FLAG_H, borrowed(wa, wr, 0x0F, carry_in))
        | bit_if(FLAG_PV, underflow)
        | bit_if(FLAG_C, borrowed(wa, wr, 0xFF, carry_in))
}

const fn pair_index(a: u8, b: u8, carry_in: bool) -> usize {
    ((carry_in as usize) << 16) | ((a as usize) << 8) | b as usize
}

impl FlagTables {
    fn build() -> Self {
        let mut add = vec![0; 2 * OPERAND_PAIRS].into_boxed_slice();
        let mut sub = vec![0; 2 * OPERAND_PAIRS].into_boxed_slice();
        for carry_in in [false, true] {
            for a in 0..=u8::MAX {
                for b in 0..=u8::MAX {
                    add[pair_index(a, b, carry_in)] = add_bits(a, b, carry_in);
                    sub[pair_index(a, b, carry_in)] = sub_bits(a, b, carry_in);
                }
            }
        }

        let mut tables = Self {
            intrinsic: [0; 256],
            add,
            sub,
            inc: [0; 256],
            dec: [0; 256],
            and: [0; 256],
            or_xor: [0; 256],
            rotate: [0; 256],
        };

        for value in 0..=u8::MAX {
            let slot = usize::from(value);
            let parity = bit_if(FLAG_PV, parity_even(value));
            tables.intrinsic[slot] = intrinsic_bits(value);
            tables.inc[slot] = add_bits(value, 1, false) & !FLAG_C;
            tables.dec[slot] = sub_bits(value, 1, false) & !FLAG_C;
            tables.and[slot] = intrinsic_bits(value) | FLAG_H | parity;
            tables.or_xor[slot] = intrinsic_bits(value) | parity;
            tables.rotate[slot] = value & UNDOCUMENTED_MASK;
        }

        tables
    }

    /// `S`, `Z`, `F5` and `F3` for a result byte.
    #[must_use]
    pub fn intrinsic(&self, result: u8) -> FlagsAffection {
        FlagsAffection::assign(INTRINSIC_MASK, self.intrinsic[usize::from(result)])
    }

    /// `ADD`/`ADC` of `a` and `b` with optional carry-in.
    #[must_use]
    pub fn add(&self, a: u8, b: u8, carry_in: bool) -> FlagsAffection {
        FlagsAffection::assign(ALL_FLAGS_MASK, self.add[pair_index(a, b, carry_in)])
    }

    /// `SUB`/`SBC` of `b` from `a` with optional borrow-in.
    #[must_use]
    pub fn sub(&self, a: u8, b: u8, carry_in: bool) -> FlagsAffection {
        FlagsAffection::assign(ALL_FLAGS_MASK, self.sub[pair_index(a, b, carry_in)])
    }

    /// `CP`: a subtraction whose `F5`/`F3` copy the operand, not the result.
    #[must_use]
    pub fn compare(&self, a: u8, b: u8) -> FlagsAffection {
        self.sub(a, b, false) & FlagsAffection::assign(UNDOCUMENTED_MASK, b)
    }

    /// `INC` of `operand`; carry is untouched.
    #[must_use]
    pub fn inc(&self, operand: u8) -> FlagsAffection {
        FlagsAffection::assign(!FLAG_C, self.inc[usize::from(operand)])
    }

    /// `DEC` of `operand`; carry is untouched.
    #[must_use]
    pub fn dec(&self, operand: u8) -> FlagsAffection {
        FlagsAffection::assign(!FLAG_C, self.dec[usize::from(operand)])
    }

    /// `AND` producing `result`.
    #[must_use]
    pub fn and(&self, result: u8) -> FlagsAffection {
        FlagsAffection::assign(ALL_FLAGS_MASK, self.and[usize::from(result)])
    }

    /// `OR`/`XOR` producing `result`.
    #[must_use]
    pub fn or_xor(&self, result: u8) -> FlagsAffection {
        FlagsAffection::assign(ALL_FLAGS_MASK, self.or_xor[usize::from(result)])
    }

    /// Accumulator rotates producing `result`; the caller overlays carry.
    #[must_use]
    pub fn rotate_accumulator(&self, result: u8) -> FlagsAffection {
        FlagsAffection::assign(ROTATE_MASK, self.rotate[usize::from(result)])
    }
}

/// `ADD HL,rr`: half carry across bit 11, carry across bit 15, `F5`/`F3`
/// from the high result byte. `S`, `Z` and `P/V` are untouched.
#[must_use]
pub fn add16(a: u16, b: u16) -> FlagsAffection {
    let result = a.wrapping_add(b);
    let (wa, wr) = (u32::from(a), u32::from(result));
    let values = (result.high() & UNDOCUMENTED_MASK)
        | bit_if(FLAG_H, carried(wa, wr, 0x0FFF, false))
        | bit_if(FLAG_C, carried(wa, wr, 0xFFFF, false));
    FlagsAffection::assign(UNDOCUMENTED_MASK | FLAG_H | FLAG_N | FLAG_C, values)
}

fn word_intrinsic(result: u16) -> u8 {
    (result.high() & (FLAG_S | UNDOCUMENTED_MASK)) | bit_if(FLAG_Z, result == 0)
}

/// `ADC HL,rr`: every flag, computed at word width.
#[must_use]
pub fn adc16(a: u16, b: u16, carry_in: bool) -> FlagsAffection {
    let result = a.wrapping_add(b).wrapping_add(u16::from(carry_in));
    let (wa, wr) = (u32::from(a), u32::from(result));
    let overflow = ((a ^ b ^ 0x8000) & (b ^ result) & 0x8000) != 0;
    let values = word_intrinsic(result)
        | bit_if(FLAG_H, carried(wa, wr, 0x0FFF, carry_in))
        | bit_if(FLAG_PV, overflow)
        | bit_if(FLAG_C, carried(wa, wr, 0xFFFF, carry_in));
    FlagsAffection::assign(ALL_FLAGS_MASK, values)
}

/// `SBC HL,rr`: every flag, computed at word width.
#[must_use]
pub fn sbc16(a: u16, b: u16, carry_in: bool) -> FlagsAffection {
    let result = a.wrapping_sub(b).wrapping_sub(u16::from(carry_in));
    let (wa, wr) = (u32::from(a), u32::from(result));
    let underflow = ((a ^ b) & (a ^ result) & 0x8000) != 0;
    let values = word_intrinsic(result)
        | FLAG_N
        | bit_if(FLAG_H, borrowed(wa, wr, 0x0FFF, carry_in))
        | bit_if(FLAG_PV, underflow)
        | bit_if(FLAG_C, borrowed(wa, wr, 0xFFFF, carry_in));
    FlagsAffection::assign(ALL_FLAGS_MASK, values)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{adc16, add16, sbc16, tables};
    use crate::flags::{FLAG_C, FLAG_F3, FLAG_F5, FLAG_H, FLAG_N, FLAG_PV, FLAG_S, FLAG_Z};

    #[test]
    fn add_table_carry_matches_widened_arithmetic() {
        let t = tables();
        for carry_in in [false, true] {
            for a in 0..=u8::MAX {
                for b in 0..=u8::MAX {
                    let wide = u16::from(a) + u16::from(b) + u16::from(carry_in);
                    let half = (a & 0x0F) + (b & 0x0F) + u8::from(carry_in) > 0x0F;
                    let f = t.add(a, b, carry_in).apply(0);
                    assert_eq!(
                        f & FLAG_C != 0,
                        wide > 0xFF,
                        "carry {a:#04x}+{b:#04x}+{carry_in}"
                    );
                    assert_eq!(f & FLAG_H != 0, half, "half {a:#04x}+{b:#04x}+{carry_in}");
                    assert_eq!(f & FLAG_N, 0);
                }
            }
        }
    }

    #[test]
    fn sub_table_borrow_matches_widened_arithmetic() {
        let t = tables();
        for carry_in in [false, true] {
            for a in 0..=u8::MAX {
                for b in 0..=u8::MAX {
                    let needed = u16::from(b) + u16::from(carry_in);
                    let half_needed = (b & 0x0F) + u8::from(carry_in);
                    let f = t.sub(a, b, carry_in).apply(0);
                    assert_eq!(f & FLAG_C != 0, u16::from(a) < needed);
                    assert_eq!(f & FLAG_H != 0, (a & 0x0F) < half_needed);
                    assert_eq!(f & FLAG_N, FLAG_N);
                }
            }
        }
    }

    #[rstest]
    #[case(0x7F, 0x01, FLAG_S | FLAG_H | FLAG_PV)]
    #[case(0xFF, 0x01, FLAG_Z | FLAG_H | FLAG_C)]
    #[case(0x80, 0x80, FLAG_Z | FLAG_PV | FLAG_C)]
    #[case(0x12, 0x34, 0)]
    #[case(0x0E, 0x1A, FLAG_F5 | FLAG_F3 | FLAG_H)]
    fn add_reference_cases(#[case] a: u8, #[case] b: u8, #[case] expected: u8) {
        assert_eq!(tables().add(a, b, false).apply(0), expected);
    }

    #[rstest]
    #[case(0x80, 0x01, FLAG_F5 | FLAG_H | FLAG_PV | FLAG_N | FLAG_F3)]
    #[case(0x00, 0x01, FLAG_S | FLAG_F5 | FLAG_H | FLAG_F3 | FLAG_N | FLAG_C)]
    #[case(0x42, 0x42, FLAG_Z | FLAG_N)]
    fn sub_reference_cases(#[case] a: u8, #[case] b: u8, #[case] expected: u8) {
        assert_eq!(tables().sub(a, b, false).apply(0), expected);
    }

    #[test]
    fn adc_with_full_operand_still_reports_carry() {
        let f = tables().add(0x10, 0xFF, true).apply(0);
        assert_eq!(f & FLAG_C, FLAG_C);
        assert_eq!(f & FLAG_H, FLAG_H);
    }

    #[test]
    fn inc_and_dec_leave_carry_untouched() {
        let t = tables();
        for value in 0..=u8::MAX {
            assert_eq!(t.inc(value).affected() & FLAG_C, 0);
            assert_eq!(t.dec(value).affected() & FLAG_C, 0);
            assert_eq!(
                t.inc(value).apply(FLAG_C) & !FLAG_C,
                t.add(value, 1, false).apply(0) & !FLAG_C
            );
            assert_eq!(
                t.dec(value).apply(0) & !FLAG_C,
                t.sub(value, 1, false).apply(0) & !FLAG_C
            );
        }
    }

    #[test]
    fn compare_copies_undocumented_bits_from_operand() {
        let t = tables();
        let f = t.compare(0x40, 0x28).apply(0);
        assert_eq!(f & (FLAG_F5 | FLAG_F3), FLAG_F5 | FLAG_F3);

        let sub = t.sub(0x40, 0x28, false).apply(0);
        assert_eq!(f & !(FLAG_F5 | FLAG_F3), sub & !(FLAG_F5 | FLAG_F3));
    }

    #[test]
    fn logic_tables_report_parity_and_half_carry() {
        let t = tables();
        assert_eq!(t.and(0x00).apply(0), FLAG_Z | FLAG_H | FLAG_PV);
        assert_eq!(t.or_xor(0x01).apply(0xFF), 0);
        assert_eq!(t.or_xor(0x03).apply(0), FLAG_PV);
    }

    #[test]
    fn rotate_affection_leaves_sign_zero_parity_and_carry() {
        let rule = tables().rotate_accumulator(0x28);
        assert_eq!(rule.affected(), FLAG_F5 | FLAG_F3 | FLAG_H | FLAG_N);
        assert_eq!(
            rule.apply(FLAG_S | FLAG_Z | FLAG_PV | FLAG_C | FLAG_H | FLAG_N),
            FLAG_S | FLAG_Z | FLAG_F5 | FLAG_F3 | FLAG_PV | FLAG_C
        );
    }

    #[test]
    fn word_add_carries_across_bit_11_and_15() {
        assert_eq!(add16(0x0FFF, 0x0001).apply(0), FLAG_H);
        assert_eq!(add16(0xFFFF, 0x0001).apply(0), FLAG_H | FLAG_C);
        assert_eq!(add16(0x2800, 0x0000).apply(0), FLAG_F5 | FLAG_F3);
        assert_eq!(
            add16(0x0001, 0x0001).apply(FLAG_S | FLAG_Z | FLAG_N),
            FLAG_S | FLAG_Z
        );
    }

    #[test]
    fn word_adc_and_sbc_report_sign_zero_and_overflow() {
        assert_eq!(
            adc16(0x7FFF, 0x0000, true).apply(0),
            FLAG_S | FLAG_H | FLAG_PV
        );
        assert_eq!(
            adc16(0xFFFF, 0x0000, true).apply(0),
            FLAG_Z | FLAG_H | FLAG_C
        );
        assert_eq!(
            sbc16(0x8000, 0x0000, true).apply(0),
            FLAG_F5 | FLAG_F3 | FLAG_H | FLAG_PV | FLAG_N
        );
        assert_eq!(sbc16(0x1234, 0x1234, false).apply(0), FLAG_Z | FLAG_N);
    }
}
