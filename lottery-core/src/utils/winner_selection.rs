//! Winner selection over a bid pool.
//!
//! Bids are grouped into buckets by value. `SIMPLE` picks one bucket at
//! random, with every distinct value equally likely regardless of how many
//! bids it holds. `LOWEST_UNIQUE` picks the lowest value placed by exactly
//! one bid.

use crate::entities::{Bid, SelectionRule};
use rand::Rng;
use std::collections::BTreeMap;
use thiserror::Error;

/// Invariant violations detected while selecting winners.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// A bucket key was listed but held no bids.
    #[error("bucket for value {value} unexpectedly had no bids")]
    EmptyBucket { value: i64 },
}

/// Outcome of one draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawResult {
    /// `None` when nobody won.
    pub winning_value: Option<i64>,
    /// Winners in placement order. Empty when nobody won.
    pub winners: Vec<Bid>,
}

impl DrawResult {
    pub fn no_winner() -> Self {
        Self::default()
    }

    pub fn has_winner(&self) -> bool {
        self.winning_value.is_some()
    }
}

/// Select winners from `bids` under `rule`.
///
/// An empty pool yields [`DrawResult::no_winner`]. At most `winner_count`
/// bids are returned.
pub fn select_winners<R: Rng + ?Sized>(
    rule: SelectionRule,
    bids: &[Bid],
    winner_count: u32,
    rng: &mut R,
) -> Result<DrawResult, SelectionError> {
    if bids.is_empty() {
        return Ok(DrawResult::no_winner());
    }

    let buckets = bucket_by_value(bids);
    match rule {
        SelectionRule::Simple => select_simple(&buckets, winner_count, rng),
        SelectionRule::LowestUnique => Ok(select_lowest_unique(&buckets)),
    }
}

fn bucket_by_value(bids: &[Bid]) -> BTreeMap<i64, Vec<&Bid>> {
    let mut buckets: BTreeMap<i64, Vec<&Bid>> = BTreeMap::new();
    for bid in bids {
        buckets.entry(bid.value).or_default().push(bid);
    }
    buckets
}

fn select_simple<R: Rng + ?Sized>(
    buckets: &BTreeMap<i64, Vec<&Bid>>,
    winner_count: u32,
    rng: &mut R,
) -> Result<DrawResult, SelectionError> {
    let values: Vec<i64> = buckets.keys().copied().collect();
    if values.is_empty() {
        return Ok(DrawResult::no_winner());
    }
    let value = values[rng.random_range(0..values.len())];

    let mut bucket = match buckets.get(&value) {
        Some(bucket) if !bucket.is_empty() => bucket.clone(),
        _ => return Err(SelectionError::EmptyBucket { value }),
    };
    // Stable sort keeps submission order for identical placement instants.
    bucket.sort_by_key(|bid| bid.placed_at);

    let limit = usize::try_from(winner_count).unwrap_or(usize::MAX);
    Ok(DrawResult {
        winning_value: Some(value),
        winners: bucket.into_iter().take(limit).cloned().collect(),
    })
}

fn select_lowest_unique(buckets: &BTreeMap<i64, Vec<&Bid>>) -> DrawResult {
    buckets
        .iter()
        .find_map(|(value, bucket)| match bucket.as_slice() {
            [only] => Some(DrawResult {
                winning_value: Some(*value),
                winners: vec![(*only).clone()],
            }),
            _ => None,
        })
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use time::Duration;
    use time::macros::datetime;

    fn bid(participant: &str, value: i64, minute: i64) -> Bid {
        Bid::new(
            participant,
            value,
            datetime!(2024-01-01 00:00 UTC) + Duration::minutes(minute),
        )
    }

    fn participants(result: &DrawResult) -> Vec<&str> {
        result
            .winners
            .iter()
            .map(|b| b.participant.as_str())
            .collect()
    }

    #[test]
    fn test_empty_pool_has_no_winner() {
        let mut rng = StdRng::seed_from_u64(1);
        for rule in [SelectionRule::Simple, SelectionRule::LowestUnique] {
            let result = select_winners(rule, &[], 3, &mut rng).unwrap();
            assert_eq!(result, DrawResult::no_winner());
            assert!(!result.has_winner());
        }
    }

    #[test]
    fn test_lowest_unique_skips_shared_values() {
        let bids = vec![
            bid("a", 1, 0),
            bid("b", 1, 1),
            bid("c", 2, 2),
            bid("d", 3, 3),
            bid("e", 3, 4),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let result = select_winners(SelectionRule::LowestUnique, &bids, 5, &mut rng).unwrap();
        assert_eq!(result.winning_value, Some(2));
        assert_eq!(participants(&result), vec!["c"]);
    }

    #[test]
    fn test_lowest_unique_without_unique_value() {
        let bids = vec![bid("a", 4, 0), bid("b", 4, 1), bid("c", 9, 2), bid("d", 9, 3)];
        let mut rng = StdRng::seed_from_u64(1);
        let result = select_winners(SelectionRule::LowestUnique, &bids, 1, &mut rng).unwrap();
        assert!(!result.has_winner());
        assert!(result.winners.is_empty());
    }

    #[test]
    fn test_simple_orders_bucket_by_placement_and_truncates() {
        // Inserted out of placement order on purpose.
        let bids = vec![bid("late", 7, 30), bid("early", 7, 1), bid("middle", 7, 10)];
        let mut rng = StdRng::seed_from_u64(3);
        let result = select_winners(SelectionRule::Simple, &bids, 2, &mut rng).unwrap();
        assert_eq!(result.winning_value, Some(7));
        assert_eq!(participants(&result), vec!["early", "middle"]);
    }

    #[test]
    fn test_simple_is_uniform_over_distinct_values() {
        // Value 1 holds twice as many bids as value 2, yet both are equally likely.
        let bids = vec![bid("a", 1, 0), bid("b", 1, 1), bid("c", 2, 2)];
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 20_000;
        let mut ones = 0;
        for _ in 0..trials {
            let result = select_winners(SelectionRule::Simple, &bids, 1, &mut rng).unwrap();
            match result.winning_value {
                Some(1) => {
                    assert_eq!(participants(&result), vec!["a"]);
                    ones += 1;
                }
                Some(2) => assert_eq!(participants(&result), vec!["c"]),
                other => panic!("unexpected winning value {other:?}"),
            }
        }
        let share = f64::from(ones) / f64::from(trials);
        assert!((0.47..0.53).contains(&share), "share of value 1 was {share}");
    }
}
