// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Seams between the application layer and concrete storage:
//   - ImageSource: anything that yields decoded content images
//     (ContentImageLoader reads a directory of image files)
//   - SampleSink:  anything that persists prepared partitions
//     (NpyStore writes .npy / .npz array files)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::image::DecodedImage;
use crate::domain::partition::{PartitionBuffer, Split};

// ─── ImageSource ──────────────────────────────────────────────────────────────
pub trait ImageSource {
    /// Load every available image, already cropped and resized.
    fn load_all(&self) -> Result<Vec<DecodedImage>>;
}

// ─── SampleSink ───────────────────────────────────────────────────────────────
pub trait SampleSink {
    /// Persist the inputs and one-hot labels of one split of one part.
    fn write_part(&self, part: usize, split: Split, buffer: &PartitionBuffer) -> Result<()>;

    /// Persist the per-sample stroke lengths of a whole run.
    fn write_stroke_lengths(&self, split: Split, lengths: &[i64]) -> Result<()>;
}
