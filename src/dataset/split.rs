use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::{Result, SplitError};

/// Disjoint training/test frame indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitAssignment {
    pub training: Vec<usize>,
    pub test: Vec<usize>,
}

/// `floor(total × fraction)`
pub fn test_size(total: usize, fraction: f64) -> usize {
    (total as f64 * fraction).floor() as usize
}

/// Draw `test_size(total, fraction)` indices without replacement for the
/// test set; the rest are training. Both lists come back ascending.
pub fn split_indices<R: Rng + ?Sized>(total: usize, fraction: f64, rng: &mut R) -> Result<SplitAssignment> {
    if !(0.0..1.0).contains(&fraction) {
        return Err(SplitError::InvalidFraction(fraction));
    }
    let n_test = test_size(total, fraction);
    let mut test = rand::seq::index::sample(rng, total, n_test).into_vec();
    test.sort_unstable();

    let mut is_test = vec![false; total];
    for &i in &test {
        is_test[i] = true;
    }
    let training = (0..total).filter(|&i| !is_test[i]).collect();
    Ok(SplitAssignment { training, test })
}

/// Seeded generator. Without a seed one is drawn from OS entropy and
/// returned so the split can be replayed.
pub fn split_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(rand::random);
    (StdRng::seed_from_u64(seed), seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_floor_of_fraction() {
        assert_eq!(test_size(10, 0.2), 2);
        assert_eq!(test_size(14, 0.2), 2);
        assert_eq!(test_size(15, 0.2), 3);
        assert_eq!(test_size(4, 0.2), 0);
        assert_eq!(test_size(0, 0.2), 0);
    }

    #[test]
    fn partition_is_disjoint_and_complete() {
        let (mut rng, _) = split_rng(Some(11));
        for total in [0usize, 1, 5, 37, 250] {
            let split = split_indices(total, 0.2, &mut rng).unwrap();
            assert_eq!(split.test.len(), test_size(total, 0.2));
            assert_eq!(split.training.len(), total - split.test.len());

            let mut all: Vec<usize> = split.training.iter().chain(&split.test).copied().collect();
            all.sort_unstable();
            assert_eq!(all, (0..total).collect::<Vec<_>>());
        }
    }

    #[test]
    fn same_seed_same_split() {
        let (mut a, _) = split_rng(Some(2024));
        let (mut b, _) = split_rng(Some(2024));
        assert_eq!(
            split_indices(100, 0.2, &mut a).unwrap(),
            split_indices(100, 0.2, &mut b).unwrap()
        );
    }

    #[test]
    fn drawn_seed_replays() {
        let (mut first, seed) = split_rng(None);
        let (mut replay, _) = split_rng(Some(seed));
        assert_eq!(
            split_indices(50, 0.2, &mut first).unwrap(),
            split_indices(50, 0.2, &mut replay).unwrap()
        );
    }

    #[test]
    fn fraction_out_of_range_is_rejected() {
        let (mut rng, _) = split_rng(Some(1));
        assert!(matches!(
            split_indices(10, 1.0, &mut rng),
            Err(SplitError::InvalidFraction(_))
        ));
        assert!(split_indices(10, -0.1, &mut rng).is_err());
    }
}
