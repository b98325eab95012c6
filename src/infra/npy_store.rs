// ============================================================
// Layer 6 — NumPy Array Store
// ============================================================
// Persists prepared partitions in NumPy formats so they can be
// read back with np.load():
//
//   {split}_{part}_x.npz        sample index → f32 [len, 3]
//   {split}_{part}_y.npy        i16 one-hot [samples, classes]
//   {split}_stroke_lengths.npy  i64 [samples across all parts]
//
// where split is "train" or "validation".
//
// Stroke arrays differ in length per sample, so they cannot
// share one .npy matrix. Each sample becomes its own entry in
// an .npz (zip) archive named "{index}.npy". Entries are stored
// uncompressed with a fixed timestamp and fixed permissions,
// which keeps the archive bytes identical between runs.

use anyhow::{Context, Result};
use ndarray::{Array1, Array2};
use ndarray_npy::{write_npy, WriteNpyExt};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use zip::{write::SimpleFileOptions, CompressionMethod, DateTime, ZipWriter};

use crate::domain::partition::{PartitionBuffer, Split};
use crate::domain::sketch::StrokeDeltas;
use crate::domain::traits::SampleSink;

pub struct NpyStore {
    dir: PathBuf,
}

impl NpyStore {
    /// Create the store, creating the destination directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create destination '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn x_path(&self, part: usize, split: Split) -> PathBuf {
        self.dir.join(format!("{}_{}_x.npz", split.file_prefix(), part))
    }

    pub fn y_path(&self, part: usize, split: Split) -> PathBuf {
        self.dir.join(format!("{}_{}_y.npy", split.file_prefix(), part))
    }

    pub fn lengths_path(&self, split: Split) -> PathBuf {
        self.dir.join(format!("{}_stroke_lengths.npy", split.file_prefix()))
    }
}

impl SampleSink for NpyStore {
    fn write_part(&self, part: usize, split: Split, buffer: &PartitionBuffer) -> Result<()> {
        let x_path = self.x_path(part, split);
        write_stroke_archive(&x_path, buffer.strokes())
            .with_context(|| format!("Cannot write '{}'", x_path.display()))?;

        let y_path = self.y_path(part, split);
        let labels = Array2::from_shape_vec((buffer.len(), buffer.width()), buffer.labels().to_vec())?;
        write_npy(&y_path, &labels)
            .with_context(|| format!("Cannot write '{}'", y_path.display()))?;

        tracing::debug!(
            "Wrote {} {} samples for part {} to '{}'",
            buffer.len(),
            split,
            part,
            self.dir.display()
        );
        Ok(())
    }

    fn write_stroke_lengths(&self, split: Split, lengths: &[i64]) -> Result<()> {
        let path = self.lengths_path(split);
        write_npy(&path, &Array1::from_vec(lengths.to_vec()))
            .with_context(|| format!("Cannot write '{}'", path.display()))
    }
}

fn write_stroke_archive(path: &Path, strokes: &[StrokeDeltas]) -> Result<()> {
    let mut zip = ZipWriter::new(BufWriter::new(File::create(path)?));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    for (i, sample) in strokes.iter().enumerate() {
        let array = Array2::from_shape_vec((sample.len(), 3), sample.to_flat())?;
        zip.start_file(format!("{i}.npy"), options)?;
        array.write_npy(&mut zip)?;
    }

    let mut out = zip.finish()?;
    out.flush()?;
    Ok(())
}
