//! How an instruction changes `F`.

use std::ops::BitAnd;

/// Which flag bits an operation forces to 1, forces to 0, or leaves alone.
///
/// Bits absent from both masks are untouched. Affections compose with `&`;
/// the right-hand side wins on every bit it affects, so an instruction rule
/// is written as a result-derived affection overlaid with its own overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FlagsAffection {
    set: u8,
    clear: u8,
}

impl FlagsAffection {
    /// Leaves every flag untouched.
    pub const NONE: Self = Self { set: 0, clear: 0 };

    /// Forces every bit of `mask` to 1.
    #[must_use]
    pub const fn sets(mask: u8) -> Self {
        Self {
            set: mask,
            clear: 0,
        }
    }

    /// Forces every bit of `mask` to 0.
    #[must_use]
    pub const fn clears(mask: u8) -> Self {
        Self {
            set: 0,
            clear: mask,
        }
    }

    /// Affects exactly the bits of `mask`, taking their new state from
    /// `values`.
    #[must_use]
    pub const fn assign(mask: u8, values: u8) -> Self {
        Self {
            set: values & mask,
            clear: !values & mask,
        }
    }

    /// Affects a single flag (or flag group) according to `enabled`.
    #[must_use]
    pub const fn flag(mask: u8, enabled: bool) -> Self {
        if enabled {
            Self::sets(mask)
        } else {
            Self::clears(mask)
        }
    }

    /// Bits forced to 1.
    #[must_use]
    pub const fn set_mask(self) -> u8 {
        self.set
    }

    /// Bits forced to 0.
    #[must_use]
    pub const fn clear_mask(self) -> u8 {
        self.clear
    }

    /// Bits this affection touches at all.
    #[must_use]
    pub const fn affected(self) -> u8 {
        self.set | self.clear
    }

    /// Drops `mask` from the affection, leaving those bits untouched.
    #[must_use]
    pub const fn without(self, mask: u8) -> Self {
        Self {
            set: self.set & !mask,
            clear: self.clear & !mask,
        }
    }

    /// Right-biased overlay: `rhs` decides every bit it affects.
    #[must_use]
    pub const fn and(self, rhs: Self) -> Self {
        let overridden = rhs.affected();
        Self {
            set: (self.set & !overridden) | rhs.set,
            clear: (self.clear & !overridden) | rhs.clear,
        }
    }

    /// Applies the affection to a flags byte.
    #[must_use]
    pub const fn apply(self, flags: u8) -> u8 {
        (flags | self.set) & !self.clear
    }
}

impl BitAnd for FlagsAffection {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::FlagsAffection;
    use crate::flags::{FLAG_C, FLAG_H, FLAG_N, FLAG_Z};

    fn affection() -> impl Strategy<Value = FlagsAffection> {
        (any::<u8>(), any::<u8>()).prop_map(|(mask, values)| FlagsAffection::assign(mask, values))
    }

    #[test]
    fn none_leaves_flags_untouched() {
        assert_eq!(FlagsAffection::NONE.apply(0xA5), 0xA5);
        assert_eq!(FlagsAffection::default(), FlagsAffection::NONE);
    }

    #[test]
    fn apply_forces_only_affected_bits() {
        let rule = FlagsAffection::sets(FLAG_N) & FlagsAffection::clears(FLAG_C);
        assert_eq!(rule.apply(FLAG_C | FLAG_Z), FLAG_N | FLAG_Z);
    }

    #[test]
    fn right_hand_side_wins_on_shared_bits() {
        let lhs = FlagsAffection::sets(FLAG_H | FLAG_Z);
        let rhs = FlagsAffection::clears(FLAG_H);

        let combined = lhs & rhs;
        assert_eq!(combined.set_mask(), FLAG_Z);
        assert_eq!(combined.clear_mask(), FLAG_H);
    }

    #[test]
    fn without_releases_bits() {
        let rule = FlagsAffection::assign(0xFF, FLAG_C | FLAG_Z).without(FLAG_C);
        assert_eq!(rule.affected(), !FLAG_C);
        assert_eq!(rule.apply(FLAG_C), FLAG_C | FLAG_Z);
    }

    proptest! {
        #[test]
        fn composition_agrees_with_rhs_on_every_bit_it_affects(
            lhs in affection(),
            rhs in affection(),
            flags in any::<u8>(),
        ) {
            let combined = (lhs & rhs).apply(flags);
            let rhs_bits = rhs.affected();
            prop_assert_eq!(combined & rhs_bits, rhs.apply(flags) & rhs_bits);
        }

        #[test]
        fn composition_keeps_lhs_where_rhs_is_silent(
            lhs in affection(),
            rhs in affection(),
            flags in any::<u8>(),
        ) {
            let combined = (lhs & rhs).apply(flags);
            let silent = !rhs.affected();
            prop_assert_eq!(combined & silent, lhs.apply(flags) & silent);
        }

        #[test]
        fn set_and_clear_masks_never_overlap(lhs in affection(), rhs in affection()) {
            let combined = lhs & rhs;
            prop_assert_eq!(combined.set_mask() & combined.clear_mask(), 0);
        }
    }
}
