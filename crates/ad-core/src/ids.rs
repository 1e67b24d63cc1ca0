use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable identifier for a registered species.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<SpeciesId>` to be pointer-optimized
///
/// Ids are only handed out by a registry lookup; the raw index exists so the
/// registry can address its own arrays.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeciesId(NonZeroU32);

impl SpeciesId {
    /// Create an id from a 0-based index by storing index+1.
    pub fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index).unwrap_or(u32::MAX - 1);
        Self(NonZeroU32::MIN.saturating_add(raw))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Debug for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpeciesId({})", self.index())
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_usize, 1, 2, 42, 10_000] {
            let id = SpeciesId::from_index(i);
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<SpeciesId>(),
            core::mem::size_of::<Option<SpeciesId>>()
        );
    }

    proptest! {
        #[test]
        fn index_survives_packing(i in 0usize..1_000_000) {
            let id = SpeciesId::from_index(i);
            prop_assert_eq!(id.index(), i);
            prop_assert_eq!(id.to_string(), i.to_string());
        }

        #[test]
        fn order_follows_index(a in 0usize..10_000, b in 0usize..10_000) {
            prop_assert_eq!(SpeciesId::from_index(a).cmp(&SpeciesId::from_index(b)), a.cmp(&b));
        }
    }
}
