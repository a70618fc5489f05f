//! Label derivation and class balancing.

use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use polarity_types::{Label, PolarityError, Result, Review};

use crate::analyzer::TextNormalizer;
use crate::dataset::{BalancedDataset, LabeledExample};

/// Class counts observed while deriving labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub negatives: usize,
    pub positives: usize,
    /// Rating 3, excluded.
    pub neutral: usize,
    /// Records failing `Review::validate`, excluded.
    pub invalid: usize,
}

impl LabelCounts {
    /// Size of each class after undersampling.
    #[inline]
    pub fn per_class(&self) -> usize {
        self.negatives.min(self.positives)
    }
}

/// Splits reviews by derived label, dropping neutral and invalid records.
fn partition(reviews: &[Review]) -> (Vec<&Review>, Vec<&Review>, LabelCounts) {
    let mut negatives = Vec::new();
    let mut positives = Vec::new();
    let mut counts = LabelCounts::default();

    for review in reviews {
        if let Err(err) = review.validate() {
            warn!(error = %err, "skipping invalid review");
            counts.invalid += 1;
            continue;
        }
        match review.label() {
            Some(Label::Negative) => negatives.push(review),
            Some(Label::Positive) => positives.push(review),
            None => counts.neutral += 1,
        }
    }

    counts.negatives = negatives.len();
    counts.positives = positives.len();
    (negatives, positives, counts)
}

/// Uniform sample of `n` items without replacement, from a fresh seeded RNG.
fn sample<'a>(pool: &[&'a Review], n: usize, seed: u64) -> Vec<&'a Review> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    index::sample(&mut rng, pool.len(), n)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}

/// Derives binary labels and undersamples the majority class.
///
/// Rating 3 is dropped, 4 and 5 are positive, 1 and 2 are negative. Each class
/// is then sampled down to the size of the smaller one, the positive sample is
/// followed by the negative sample, and the result is shuffled. Every random
/// step uses its own RNG seeded with `seed`, so the same input and seed always
/// give the same dataset.
///
/// Only the selected reviews are normalized.
///
/// # Errors
///
/// Returns [`PolarityError::EmptyClass`] if either class is empty after
/// filtering.
pub fn derive_and_balance(
    reviews: &[Review],
    normalizer: &TextNormalizer,
    seed: u64,
) -> Result<BalancedDataset> {
    let (negatives, positives, counts) = partition(reviews);

    debug!(
        negatives = counts.negatives,
        positives = counts.positives,
        neutral = counts.neutral,
        invalid = counts.invalid,
        "derived labels"
    );

    let n = counts.per_class();
    if n == 0 {
        return Err(PolarityError::EmptyClass {
            negatives: counts.negatives,
            positives: counts.positives,
        });
    }

    let mut selected = sample(&positives, n, seed);
    selected.extend(sample(&negatives, n, seed));
    selected.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));

    let mut text = String::new();
    let examples: Vec<LabeledExample> = selected
        .into_iter()
        .filter_map(|review| {
            let label = review.label()?;
            normalizer.normalize_into(&review.combined_text(), &mut text);
            Some(LabeledExample {
                source_id: review.id.clone(),
                text: text.clone(),
                label,
            })
        })
        .collect();

    info!(
        per_class = n,
        total = examples.len(),
        seed,
        "balanced training set"
    );

    Ok(BalancedDataset::new(examples, n))
}
