//! Property coverage for the flag tables and the affection algebra.

use env_logger as _;
use log as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use proptest::prelude::*;
use z80_core::flags::{
    parity_even, tables, FLAG_C, FLAG_F3, FLAG_F5, FLAG_H, FLAG_N, FLAG_PV, FLAG_S, FLAG_Z,
};
use z80_core::FlagsAffection;

fn signed_byte(value: u8) -> i8 {
    i8::from_ne_bytes([value])
}

fn affection() -> impl Strategy<Value = FlagsAffection> {
    (any::<u8>(), any::<u8>()).prop_map(|(mask, values)| FlagsAffection::assign(mask, values))
}

proptest! {
    #[test]
    fn add_flags_follow_widened_sum(
        a in any::<u8>(),
        b in any::<u8>(),
        carry_in in any::<bool>(),
    ) {
        let sum = u16::from(a) + u16::from(b) + u16::from(carry_in);
        let [result, _] = sum.to_le_bytes();
        let flags = tables().add(a, b, carry_in).apply(0);

        prop_assert_eq!(flags & FLAG_C != 0, sum > 0xFF);
        prop_assert_eq!(flags & FLAG_Z != 0, result == 0);
        prop_assert_eq!(flags & FLAG_S, result & FLAG_S);
        prop_assert_eq!(flags & (FLAG_F5 | FLAG_F3), result & (FLAG_F5 | FLAG_F3));
        prop_assert_eq!(flags & FLAG_N, 0);
        let signed = i16::from(signed_byte(a)) + i16::from(signed_byte(b)) + i16::from(carry_in);
        prop_assert_eq!(flags & FLAG_PV != 0, !(-128..=127).contains(&signed));
    }

    #[test]
    fn sub_flags_follow_widened_difference(
        a in any::<u8>(),
        b in any::<u8>(),
        carry_in in any::<bool>(),
    ) {
        let subtrahend = u16::from(b) + u16::from(carry_in);
        let result = a.wrapping_sub(b).wrapping_sub(u8::from(carry_in));
        let flags = tables().sub(a, b, carry_in).apply(0);

        prop_assert_eq!(flags & FLAG_C != 0, u16::from(a) < subtrahend);
        prop_assert_eq!(flags & FLAG_Z != 0, result == 0);
        prop_assert_eq!(flags & FLAG_N, FLAG_N);
        let signed = i16::from(signed_byte(a)) - i16::from(signed_byte(b)) - i16::from(carry_in);
        prop_assert_eq!(flags & FLAG_PV != 0, !(-128..=127).contains(&signed));
    }

    #[test]
    fn half_carry_depends_only_on_low_nibbles(
        a in any::<u8>(),
        b in any::<u8>(),
        high_a in 0u8..16,
        high_b in 0u8..16,
        carry_in in any::<bool>(),
    ) {
        let t = tables();
        let a2 = (high_a << 4) | (a & 0x0F);
        let b2 = (high_b << 4) | (b & 0x0F);

        prop_assert_eq!(
            t.add(a, b, carry_in).apply(0) & FLAG_H,
            t.add(a2, b2, carry_in).apply(0) & FLAG_H
        );
        prop_assert_eq!(
            t.sub(a, b, carry_in).apply(0) & FLAG_H,
            t.sub(a2, b2, carry_in).apply(0) & FLAG_H
        );
        let nibble_sum = (a & 0x0F) + (b & 0x0F) + u8::from(carry_in);
        prop_assert_eq!(t.add(a, b, carry_in).apply(0) & FLAG_H != 0, nibble_sum > 0x0F);
    }

    #[test]
    fn full_width_tables_ignore_previous_flags(
        a in any::<u8>(),
        b in any::<u8>(),
        carry_in in any::<bool>(),
    ) {
        let t = tables();
        prop_assert_eq!(t.add(a, b, carry_in).apply(0x00), t.add(a, b, carry_in).apply(0xFF));
        prop_assert_eq!(t.sub(a, b, carry_in).apply(0x00), t.sub(a, b, carry_in).apply(0xFF));
        prop_assert_eq!(t.or_xor(a).apply(0x00), t.or_xor(a).apply(0xFF));
    }

    #[test]
    fn inc_dec_wrap_and_preserve_carry(value in any::<u8>(), previous in any::<u8>()) {
        let t = tables();
        let inc = t.inc(value).apply(previous);
        let dec = t.dec(value).apply(previous);

        prop_assert_eq!(inc & FLAG_C, previous & FLAG_C);
        prop_assert_eq!(dec & FLAG_C, previous & FLAG_C);
        prop_assert_eq!(inc & FLAG_Z != 0, value == 0xFF);
        prop_assert_eq!(dec & FLAG_Z != 0, value == 0x01);
        prop_assert_eq!(inc & FLAG_PV != 0, value == 0x7F);
        prop_assert_eq!(dec & FLAG_PV != 0, value == 0x80);
    }

    #[test]
    fn compare_copies_undocumented_bits_from_operand(a in any::<u8>(), b in any::<u8>()) {
        let t = tables();
        let cp = t.compare(a, b).apply(0);
        let sub = t.sub(a, b, false).apply(0);

        prop_assert_eq!(cp & (FLAG_F5 | FLAG_F3), b & (FLAG_F5 | FLAG_F3));
        prop_assert_eq!(cp & !(FLAG_F5 | FLAG_F3), sub & !(FLAG_F5 | FLAG_F3));
    }

    #[test]
    fn logic_results_report_parity(result in any::<u8>()) {
        let t = tables();
        prop_assert_eq!(t.or_xor(result).apply(0) & FLAG_PV != 0, parity_even(result));
        prop_assert_eq!(t.and(result).apply(0) & FLAG_H, FLAG_H);
        prop_assert_eq!(t.and(result).apply(0xFF) & (FLAG_N | FLAG_C), 0);
    }

    #[test]
    fn overlay_applies_left_then_right(
        lhs in affection(),
        rhs in affection(),
        flags in any::<u8>(),
    ) {
        prop_assert_eq!((lhs & rhs).apply(flags), rhs.apply(lhs.apply(flags)));
    }

    #[test]
    fn overlay_is_right_biased(lhs in affection(), rhs in affection()) {
        let combined = lhs & rhs;
        let owned = rhs.affected();

        prop_assert_eq!(combined.set_mask() & owned, rhs.set_mask());
        prop_assert_eq!(combined.clear_mask() & owned, rhs.clear_mask());
        prop_assert_eq!(combined.affected(), lhs.affected() | owned);
    }

    #[test]
    fn overlay_is_associative(a in affection(), b in affection(), c in affection()) {
        prop_assert_eq!((a & b) & c, a & (b & c));
    }
}

#[test]
fn none_is_identity_on_both_sides() {
    let affection = FlagsAffection::assign(FLAG_S | FLAG_C, FLAG_S);
    assert_eq!(FlagsAffection::NONE & affection, affection);
    assert_eq!(affection & FlagsAffection::NONE, affection);
    assert_eq!(FlagsAffection::NONE.apply(0xA5), 0xA5);
}
