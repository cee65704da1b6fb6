//! Fast hash map and hash set type aliases.
//!
//! This module provides type aliases for [`FxHashMap`] and [`FxHashSet`] from the
//! `rustc-hash` crate. The registry keys everything by short string ids
//! (`C001`, `S003`), which is exactly the workload Fx hashing is fast at.
//! Denial-of-service resistance is not needed for local operator data.
//!
//! # Examples
//!
//! ```
//! use evac_core::{FxHashMap, fx_hash_map, fx_hash_set};
//!
//! let mut occupancy: FxHashMap<&str, usize> = fx_hash_map();
//! *occupancy.entry("S001").or_default() += 1;
//! assert_eq!(occupancy["S001"], 1);
//!
//! let headers: evac_core::FxHashSet<&str> = fx_hash_set();
//! assert!(headers.is_empty());
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

/// Creates a new empty [`FxHashSet`].
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_map_counts() {
        let mut map: FxHashMap<&str, usize> = fx_hash_map();
        for id in ["S001", "S002", "S001"] {
            *map.entry(id).or_default() += 1;
        }
        assert_eq!(map.get("S001"), Some(&2));
        assert_eq!(map.get("S002"), Some(&1));
        assert_eq!(map.get("S003"), None);
    }

    #[test]
    fn test_fx_hash_set_operations() {
        let mut set: FxHashSet<&str> = fx_hash_set();
        set.insert("citizenId");
        set.insert("name");
        assert!(set.contains("citizenId"));
        assert!(!set.contains("age"));
    }
}
