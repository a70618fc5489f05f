//! Seeded stratified train/test split.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use polarity_types::{Label, SplitConfig};

/// Row indices of the training and held-out parts, each in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Holds out `test_ratio` of every class.
///
/// Each class's indices are shuffled with a RNG seeded by `config.seed`, and
/// the first `round(len * test_ratio)` go to the test part. A class with at
/// least two members always keeps one example on each side.
pub fn stratified_split(labels: &[Label], config: SplitConfig) -> Split {
    let ratio = config.test_ratio.clamp(0.0, 1.0);
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut split = Split::default();

    for class in [Label::Negative, Label::Positive] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(&mut rng);

        let len = members.len();
        let mut n_test = (len as f64 * ratio).round() as usize;
        if len >= 2 && ratio > 0.0 && ratio < 1.0 {
            n_test = n_test.clamp(1, len - 1);
        }

        split.test.extend_from_slice(&members[..n_test]);
        split.train.extend_from_slice(&members[n_test..]);
    }

    split.train.sort_unstable();
    split.test.sort_unstable();
    split
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pos: usize, neg: usize) -> Vec<Label> {
        let mut out = vec![Label::Positive; pos];
        out.extend(vec![Label::Negative; neg]);
        out
    }

    fn count(labels: &[Label], idx: &[usize], class: Label) -> usize {
        idx.iter().filter(|&&i| labels[i] == class).count()
    }

    #[test]
    fn holds_out_ratio_per_class() {
        let l = labels(50, 50);
        let s = stratified_split(&l, SplitConfig::default());
        assert_eq!(s.test.len(), 20);
        assert_eq!(s.train.len(), 80);
        assert_eq!(count(&l, &s.test, Label::Positive), 10);
        assert_eq!(count(&l, &s.test, Label::Negative), 10);
    }

    #[test]
    fn parts_are_disjoint_and_complete() {
        let l = labels(17, 23);
        let s = stratified_split(&l, SplitConfig::default());
        let mut all: Vec<usize> = s.train.iter().chain(&s.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn deterministic() {
        let l = labels(30, 30);
        let cfg = SplitConfig {
            test_ratio: 0.3,
            seed: 5,
        };
        assert_eq!(stratified_split(&l, cfg), stratified_split(&l, cfg));
    }

    #[test]
    fn tiny_classes_keep_both_sides() {
        let l = labels(2, 2);
        let s = stratified_split(&l, SplitConfig::default());
        assert_eq!(count(&l, &s.test, Label::Positive), 1);
        assert_eq!(count(&l, &s.train, Label::Positive), 1);
    }

    #[test]
    fn zero_ratio_keeps_everything() {
        let l = labels(5, 5);
        let s = stratified_split(
            &l,
            SplitConfig {
                test_ratio: 0.0,
                seed: 1,
            },
        );
        assert!(s.test.is_empty());
        assert_eq!(s.train.len(), 10);
    }

    #[test]
    fn empty_labels() {
        let s = stratified_split(&[], SplitConfig::default());
        assert!(s.train.is_empty() && s.test.is_empty());
    }
}
