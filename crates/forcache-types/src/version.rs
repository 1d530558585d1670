use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A branch's private staging area.
///
/// Iteration order is lexicographic key order, which is also the order in
/// which a committed overlay is applied to the confirmed store.
pub type Overlay<V> = BTreeMap<String, V>;

/// Version of the confirmed store.
///
/// There is exactly one counter per store, not one per key. It starts at
/// [`Version::ZERO`] and is bumped by one for every key the store applies, so
/// committing a three-key overlay advances it by three.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// The version of a freshly created store.
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The version that follows this one.
    ///
    /// # Panics
    ///
    /// Panics if the counter is already at `u64::MAX`. The counter never wraps
    /// or saturates.
    pub fn next(self) -> Self {
        match self.0.checked_add(1) {
            Some(raw) => Self(raw),
            None => panic!("version counter exhausted at {}", self.0),
        }
    }

    /// Number of mutations between `earlier` and `self`.
    ///
    /// Returns 0 if `earlier` is not actually earlier.
    pub fn since(self, earlier: Version) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// A confirmed value together with the version at which it was last set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedValue<V> {
    pub value: V,
    pub version: Version,
}

impl<V> VersionedValue<V> {
    pub fn new(value: V, version: Version) -> Self {
        Self { value, version }
    }

    /// Drop the version and keep the payload.
    pub fn into_value(self) -> V {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_default() {
        assert_eq!(Version::default(), Version::ZERO);
        assert_eq!(Version::ZERO.get(), 0);
    }

    #[test]
    #[should_panic(expected = "version counter exhausted")]
    fn next_at_max_panics() {
        let _ = Version::new(u64::MAX).next();
    }

    #[test]
    fn next_just_below_max() {
        assert_eq!(Version::new(u64::MAX - 1).next(), Version::new(u64::MAX));
    }

    #[test]
    fn next_increments_by_one() {
        let v = Version::new(41);
        assert_eq!(v.next(), Version::new(42));
        assert!(v.next() > v);
    }

    #[test]
    fn since_counts_mutations() {
        assert_eq!(Version::new(7).since(Version::new(4)), 3);
        assert_eq!(Version::new(4).since(Version::new(7)), 0);
    }

    #[test]
    fn display_is_plain_number() {
        assert_eq!(Version::new(12).to_string(), "12");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&Version::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Version::new(9));
    }

    #[test]
    fn versioned_value_into_value() {
        let vv = VersionedValue::new("payload", Version::new(3));
        assert_eq!(vv.version, Version::new(3));
        assert_eq!(vv.into_value(), "payload");
    }

    #[test]
    fn overlay_iterates_in_key_order() {
        let mut overlay: Overlay<i32> = Overlay::new();
        overlay.insert("c".into(), 3);
        overlay.insert("a".into(), 1);
        overlay.insert("b".into(), 2);
        let keys: Vec<&str> = overlay.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    proptest! {
        #[test]
        fn repeated_next_is_strictly_increasing(start in 0u64..1_000_000, steps in 1usize..64) {
            let mut v = Version::new(start);
            for _ in 0..steps {
                let n = v.next();
                prop_assert!(n > v);
                v = n;
            }
            prop_assert_eq!(v.since(Version::new(start)), steps as u64);
        }
    }
}
