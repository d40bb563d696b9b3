/// Largest view handled by a fixed tier.
pub const MAX_FIXED_ARITY: usize = 16;

/// Dispatch strategy for a multiplexed wait, picked from the number of endpoints.
///
/// Fixed tiers wait on a statically enumerated case list padded with inert
/// placeholders. `Dynamic` builds the case list at call time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Tier {
    Four,
    Eight,
    Sixteen,
    Dynamic,
}

impl Tier {
    /// Pick the tier for a set of `n` endpoints.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    #[inline]
    pub fn for_len(n: usize) -> Self {
        match n {
            0 => panic!("cannot select among zero endpoints"),
            1..=4 => Tier::Four,
            5..=8 => Tier::Eight,
            9..=MAX_FIXED_ARITY => Tier::Sixteen,
            _ => Tier::Dynamic,
        }
    }

    /// Number of endpoint cases in the tier, `None` for [`Tier::Dynamic`].
    #[inline]
    pub fn arity(self) -> Option<usize> {
        match self {
            Tier::Four => Some(4),
            Tier::Eight => Some(8),
            Tier::Sixteen => Some(16),
            Tier::Dynamic => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        let cases = [
            (1, Tier::Four),
            (4, Tier::Four),
            (5, Tier::Eight),
            (8, Tier::Eight),
            (9, Tier::Sixteen),
            (16, Tier::Sixteen),
            (17, Tier::Dynamic),
            (1000, Tier::Dynamic),
        ];
        for (n, tier) in cases {
            assert_eq!(Tier::for_len(n), tier, "n = {n}");
            if let Some(arity) = tier.arity() {
                assert!(n <= arity);
            }
        }
    }

    #[test]
    #[should_panic]
    fn zero_has_no_tier() {
        Tier::for_len(0);
    }
}
