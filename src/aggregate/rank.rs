// src/aggregate/rank.rs

use super::group::sort_by_count_desc;

/// A key with its count and dense rank (1 = highest count).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked<K> {
    pub rank: u32,
    pub key: K,
    pub count: u64,
}

/// Dense-rank `(key, count)` pairs by count descending.
///
/// Equal counts share a rank and the next distinct count takes the next integer,
/// so ranks never skip. Output is ordered by rank, then key ascending.
pub fn dense_rank<K: Ord>(mut pairs: Vec<(K, u64)>) -> Vec<Ranked<K>> {
    sort_by_count_desc(&mut pairs);

    let mut ranked = Vec::with_capacity(pairs.len());
    let mut rank = 0u32;
    let mut last_count = None;
    for (key, count) in pairs {
        if last_count != Some(count) {
            rank += 1;
            last_count = Some(count);
        }
        ranked.push(Ranked { rank, key, count });
    }
    ranked
}

/// Keep entries ranked `max_rank` or better. Ties at the cutoff are all kept.
pub fn dense_rank_at_most<K: Ord>(pairs: Vec<(K, u64)>, max_rank: u32) -> Vec<Ranked<K>> {
    let mut ranked = dense_rank(pairs);
    // ranks are non-decreasing, so everything past the first miss goes
    let keep = ranked.partition_point(|r| r.rank <= max_rank);
    ranked.truncate(keep);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triples(ranked: &[Ranked<&'static str>]) -> Vec<(u32, &'static str, u64)> {
        ranked.iter().map(|r| (r.rank, r.key, r.count)).collect()
    }

    #[test]
    fn dense_rank_has_no_gaps() {
        let ranked = dense_rank(vec![("x", 5), ("y", 5), ("z", 4), ("w", 1)]);
        assert_eq!(
            triples(&ranked),
            vec![(1, "x", 5), (1, "y", 5), (2, "z", 4), (3, "w", 1)]
        );
    }

    #[test]
    fn cutoff_keeps_every_tie() {
        let pairs = vec![("E", 1), ("B", 2), ("D", 1), ("A", 3), ("C", 1)];
        let ranked = dense_rank_at_most(pairs, 3);
        assert_eq!(
            triples(&ranked),
            vec![
                (1, "A", 3),
                (2, "B", 2),
                (3, "C", 1),
                (3, "D", 1),
                (3, "E", 1)
            ]
        );
    }

    #[test]
    fn cutoff_drops_lower_ranks() {
        let pairs = vec![("a", 9), ("b", 7), ("c", 7), ("d", 3), ("e", 2)];
        let ranked = dense_rank_at_most(pairs, 2);
        assert_eq!(triples(&ranked), vec![(1, "a", 9), (2, "b", 7), (2, "c", 7)]);

        assert!(dense_rank_at_most(vec![("a", 1)], 0).is_empty());
        assert!(dense_rank_at_most(Vec::<(&str, u64)>::new(), 3).is_empty());
    }
}
