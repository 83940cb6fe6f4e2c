//! Window-function primitives, written as explicit stateful folds.
//!
//! Every function here expects its input already sorted in partition order;
//! the engine sorts (or groups through ordered maps) before calling in. This
//! keeps the window semantics visible in plain code instead of relying on a
//! query planner.

use rust_decimal::Decimal;

/// Running (cumulative) sum over one partition.
pub fn running_sum(values: &[Decimal]) -> Vec<Decimal> {
    let mut total = Decimal::ZERO;
    values
        .iter()
        .map(|value| {
            total += value;
            total
        })
        .collect()
}

/// Cumulative mean over one partition: element `i` is the mean of
/// `values[0..=i]`.
pub fn cumulative_mean(values: &[Decimal]) -> Vec<Decimal> {
    let mut total = Decimal::ZERO;
    values
        .iter()
        .enumerate()
        .map(|(seen, value)| {
            total += value;
            total / Decimal::from(seen + 1)
        })
        .collect()
}

/// One-row lag: element `i` is `values[i - 1]`, `None` for the first row.
pub fn lag1<T: Copy>(values: &[T]) -> Vec<Option<T>> {
    let mut previous = None;
    values
        .iter()
        .map(|value| {
            let lagged = previous;
            previous = Some(*value);
            lagged
        })
        .collect()
}

/// Standard competition ranks for values already sorted descending: equal
/// neighbors share a rank and the rank after a tie skips (1, 1, 3, ...).
pub fn competition_ranks(sorted_desc: &[Decimal]) -> Vec<usize> {
    let mut ranks: Vec<usize> = Vec::with_capacity(sorted_desc.len());
    for (position, value) in sorted_desc.iter().enumerate() {
        if position > 0 && *value == sorted_desc[position - 1] {
            ranks.push(ranks[position - 1]);
        } else {
            ranks.push(position + 1);
        }
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_running_sum_accumulates() {
        let values = [dec!(10), dec!(20), dec!(5)];
        assert_eq!(running_sum(&values), vec![dec!(10), dec!(30), dec!(35)]);
        assert!(running_sum(&[]).is_empty());
    }

    #[test]
    fn test_cumulative_mean() {
        let values = [dec!(10), dec!(20)];
        assert_eq!(cumulative_mean(&values), vec![dec!(10), dec!(15)]);
    }

    #[test]
    fn test_lag_shifts_by_one() {
        let values = [dec!(1), dec!(2), dec!(3)];
        assert_eq!(lag1(&values), vec![None, Some(dec!(1)), Some(dec!(2))]);
    }

    #[test]
    fn test_competition_ranks_share_and_skip() {
        let values = [dec!(100), dec!(100), dec!(50), dec!(50), dec!(10)];
        assert_eq!(competition_ranks(&values), vec![1, 1, 3, 3, 5]);
    }
}
