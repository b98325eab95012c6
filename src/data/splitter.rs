// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles content images and splits them into two sets:
//   - Training set:   photos the transformer is optimised on
//   - Validation set: photos only used to report the loss
//
// Why validate a style network at all?
//   The transformer has to repaint photos it has never seen.
//   A validation loss that climbs while the training loss
//   falls means it is memorising the training photos rather
//   than learning the style.
//
// Why a seeded shuffle?
//   Content directories are often grouped by source (one
//   camera roll after another). Shuffling mixes them, and the
//   fixed seed makes a given directory always split the same
//   way, so two runs with different settings are comparable.
//
// Split ratio: 90% training, 10% validation (configurable);
// the training share is rounded to the nearest whole image.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, validation).
///
/// # Example
/// ```ignore
/// let (train, val) = split_train_val(images, 0.9, 42);
/// // train holds 90% of the images, val the rest
/// ```
pub fn split_train_val<T>(mut samples: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(total);

    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        samples.len(),
        val.len(),
    );

    (samples, val)
}
