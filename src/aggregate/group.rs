// src/aggregate/group.rs

use std::collections::BTreeMap;

/// Count occurrences of each key. Only observed keys appear in the result.
pub fn count_by<K, I>(keys: I) -> BTreeMap<K, u64>
where
    K: Ord,
    I: IntoIterator<Item = K>,
{
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Sort `(key, count)` pairs by count descending, then key ascending.
pub fn sort_by_count_desc<K: Ord>(pairs: &mut [(K, u64)]) {
    pairs.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
}
