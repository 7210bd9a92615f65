//! Constraint strengths.
//!
//! [`Strength`] measures the relative importance of constraints. The solver
//! maintains a *constraint hierarchy*: when constraints conflict, a stronger
//! constraint always wins over a weaker one, and ties are never broken by
//! anything other than strength.

/// Priority level of a constraint.
///
/// Seven fixed levels, strongest first. The ordering is total and immutable:
/// comparison is by rank only, where a *lower* rank means a *stronger*
/// constraint.
///
/// # Examples
///
/// ```
/// use deltablue::Strength;
///
/// assert!(Strength::Required.stronger(Strength::Preferred));
/// assert!(Strength::Weakest.weaker(Strength::Normal));
/// assert_eq!(Strength::Required.next_weaker(), Strength::StrongPreferred);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strength {
    /// Must always hold. Failure to satisfy a required constraint is a
    /// configuration error, not a solvable conflict.
    Required = 0,
    StrongPreferred = 1,
    Preferred = 2,
    StrongDefault = 3,
    Normal = 4,
    WeakDefault = 5,
    /// The floor of the hierarchy. Every variable starts with this walkabout
    /// strength, so a `Weakest` constraint can never displace anything.
    Weakest = 6,
}

impl Strength {
    /// All levels, strongest first.
    pub const ALL: [Strength; 7] = [
        Strength::Required,
        Strength::StrongPreferred,
        Strength::Preferred,
        Strength::StrongDefault,
        Strength::Normal,
        Strength::WeakDefault,
        Strength::Weakest,
    ];

    /// Numeric rank of this level. Lower rank is stronger.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Whether `self` is strictly stronger than `other`.
    pub fn stronger(self, other: Strength) -> bool {
        self.rank() < other.rank()
    }

    /// Whether `self` is strictly weaker than `other`.
    pub fn weaker(self, other: Strength) -> bool {
        self.rank() > other.rank()
    }

    /// The stronger of the two levels.
    pub fn strongest_of(self, other: Strength) -> Strength {
        if self.stronger(other) {
            self
        } else {
            other
        }
    }

    /// The weaker of the two levels.
    pub fn weakest_of(self, other: Strength) -> Strength {
        if self.weaker(other) {
            self
        } else {
            other
        }
    }

    /// The level one rank weaker than this one.
    ///
    /// # Panics
    ///
    /// Panics when called on [`Strength::Weakest`]. The solver only steps
    /// downward from `Required` while sweeping the hierarchy, so reaching
    /// this case indicates a bug in the caller.
    pub fn next_weaker(self) -> Strength {
        match self {
            Strength::Required => Strength::StrongPreferred,
            Strength::StrongPreferred => Strength::Preferred,
            Strength::Preferred => Strength::StrongDefault,
            Strength::StrongDefault => Strength::Normal,
            Strength::Normal => Strength::WeakDefault,
            Strength::WeakDefault => Strength::Weakest,
            Strength::Weakest => panic!("no strength weaker than Weakest"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rank_order() {
        assert_eq!(Strength::Required.rank(), 0);
        assert_eq!(Strength::Weakest.rank(), 6);
        assert!(Strength::Required.stronger(Strength::StrongPreferred));
        assert!(Strength::WeakDefault.weaker(Strength::Normal));
        assert!(!Strength::Normal.stronger(Strength::Normal));
        assert!(!Strength::Normal.weaker(Strength::Normal));
    }

    #[test]
    fn test_strongest_weakest_of() {
        assert_eq!(
            Strength::Preferred.strongest_of(Strength::Normal),
            Strength::Preferred
        );
        assert_eq!(
            Strength::Preferred.weakest_of(Strength::Normal),
            Strength::Normal
        );
        // Equal levels: either answer is the same level
        assert_eq!(
            Strength::Normal.strongest_of(Strength::Normal),
            Strength::Normal
        );
    }

    #[test]
    fn test_next_weaker_chain() {
        // Six steps from the top of the hierarchy reach the bottom
        let mut s = Strength::Required;
        for _ in 0..6 {
            s = s.next_weaker();
        }
        assert_eq!(s, Strength::Weakest);
    }

    #[test]
    #[should_panic(expected = "no strength weaker than Weakest")]
    fn test_next_weaker_bottom_panics() {
        let _ = Strength::Weakest.next_weaker();
    }

    #[test]
    fn test_all_is_strongest_first() {
        for pair in Strength::ALL.windows(2) {
            assert!(pair[0].stronger(pair[1]));
        }
    }

    fn any_strength() -> impl Strategy<Value = Strength> {
        (0usize..7).prop_map(|i| Strength::ALL[i])
    }

    proptest! {
        /// For every pair, exactly one of stronger / weaker / equal holds.
        #[test]
        fn totality(a in any_strength(), b in any_strength()) {
            let relations =
                [a.stronger(b), a.weaker(b), a == b].iter().filter(|&&r| r).count();
            prop_assert_eq!(relations, 1);
        }

        #[test]
        fn strongest_weakest_consistent(a in any_strength(), b in any_strength()) {
            let strongest = a.strongest_of(b);
            let weakest = a.weakest_of(b);
            prop_assert!(!strongest.weaker(weakest));
            prop_assert!(strongest == a || strongest == b);
            prop_assert!(weakest == a || weakest == b);
        }
    }
}
