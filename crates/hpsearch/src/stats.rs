use std::cmp::Ordering;

use statrs::statistics::Statistics;

/// Arithmetic mean. Returns NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.mean()
}

/// Population standard deviation (ddof = 0). Returns NaN for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    values.population_std_dev()
}

/// Rank scores so that the highest score gets rank 1.
///
/// Ties share the smallest rank of the tied block (the "min" method), so two
/// best candidates are both ranked 1 and the next one is ranked 3. NaN scores
/// are ranked after every finite score.
///
/// # Arguments
///
/// * `scores` - One score per candidate, higher is better.
///
/// # Returns
///
/// A vector of 1-based ranks, in the same order as `scores`.
pub fn rank_min_desc(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| desc_nan_last(scores[a], scores[b]));

    let mut ranks = vec![0usize; scores.len()];
    let mut current_rank = 1;
    for (pos, &idx) in order.iter().enumerate() {
        if pos > 0 {
            let prev = order[pos - 1];
            if desc_nan_last(scores[prev], scores[idx]) != Ordering::Equal {
                current_rank = pos + 1;
            }
        }
        ranks[idx] = current_rank;
    }
    ranks
}

fn desc_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((mean(&v) - 2.5).abs() < 1e-12);
        assert!((std_dev(&v) - 1.25f64.sqrt()).abs() < 1e-12);
        assert!(mean(&[]).is_nan());
        assert!(std_dev(&[]).is_nan());
        assert_eq!(std_dev(&[0.7, 0.7, 0.7]), 0.0);
    }

    #[test]
    fn test_rank_min_with_ties() {
        let ranks = rank_min_desc(&[0.5, 0.9, 0.9, 0.1]);
        assert_eq!(ranks, vec![3, 1, 1, 4]);
    }

    #[test]
    fn test_rank_nan_last() {
        let ranks = rank_min_desc(&[f64::NAN, 0.2, 0.8]);
        assert_eq!(ranks, vec![3, 2, 1]);
    }
}
