// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Turns a directory of per-class QuickDraw .ndjson files into
// partitioned NumPy arrays:
//
//   Step 1: Read class filters        (Layer 4 - data)
//   Step 2: Match class files         (Layer 4 - data)
//   Step 3: Plan the partitions       (Layer 3 - domain)
//   Step 4: Check every file is long  (Layer 4 - data)
//           enough, before any write
//   Step 5: Per part, per class file: (Layer 4 - data)
//           skip to the part's offset,
//           read training then
//           validation records
//   Step 6: Write each part           (Layer 6 - infra)
//   Step 7: Write stroke lengths and  (Layer 6 - infra)
//           log their statistics
//
// Sample order inside a part is class file (name order) then
// line order, so repeated runs produce identical files.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::data::{
    class_list::read_class_filters,
    record_reader::{count_records, RecordCursor},
    scanner::ClassFileScanner,
};
use crate::domain::{
    error::PrepareError,
    label::ClassCatalog,
    partition::{PartitionBuffer, PartitionPlan, Split},
    traits::SampleSink,
};
use crate::infra::npy_store::NpyStore;

// ─── Preparation Configuration ───────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct PrepareConfig {
    pub class_list:     PathBuf,
    pub source_dir:     PathBuf,
    pub dest_dir:       PathBuf,
    pub num_training:   usize,
    pub num_validation: usize,
    pub parts:          usize,
    /// Suppress per-file progress lines
    pub quiet:          bool,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            class_list:     PathBuf::from("classes.csv"),
            source_dir:     PathBuf::from("data/quickdraw"),
            dest_dir:       PathBuf::from("data/prepared"),
            num_training:   10_000,
            num_validation: 1_000,
            parts:          1,
            quiet:          false,
        }
    }
}

/// Mean, min and max delta-row count of one split
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthStats {
    pub mean: f64,
    pub min:  i64,
    pub max:  i64,
}

impl LengthStats {
    pub fn from_lengths(lengths: &[i64]) -> Option<Self> {
        let min = *lengths.iter().min()?;
        let max = *lengths.iter().max()?;
        let mean = lengths.iter().sum::<i64>() as f64 / lengths.len() as f64;
        Some(Self { mean, min, max })
    }
}

#[derive(Debug, Clone)]
pub struct PrepareReport {
    pub classes:            usize,
    pub parts:              usize,
    pub training_samples:   usize,
    pub validation_samples: usize,
    pub training_lengths:   Option<LengthStats>,
    pub validation_lengths: Option<LengthStats>,
}

// ─── PrepareUseCase ──────────────────────────────────────────────────────────
pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    /// Run the preparation, writing .npy/.npz files to the
    /// destination directory.
    pub fn execute(&self) -> Result<PrepareReport> {
        let cfg = &self.config;

        // ── Steps 1–4: everything that can fail before writing ───────────────
        let (scanner, catalog, plan) = self.plan()?;

        // ── Steps 5–7 ─────────────────────────────────────────────────────────
        let store = NpyStore::new(&cfg.dest_dir)?;
        self.write_parts(&scanner, &catalog, plan, &store)
    }

    fn plan(&self) -> Result<(ClassFileScanner, ClassCatalog, PartitionPlan)> {
        let cfg = &self.config;

        // ── Step 1: Class filters ─────────────────────────────────────────────
        let filters = read_class_filters(&cfg.class_list)?;
        tracing::info!("Read {} class filters from '{}'", filters.len(), cfg.class_list.display());

        // ── Step 2: Matching class files ──────────────────────────────────────
        let scanner = ClassFileScanner::new(&cfg.source_dir);
        let catalog = scanner.scan(&filters)?;

        // ── Step 3: Partition plan ────────────────────────────────────────────
        let plan = PartitionPlan::new(cfg.num_training, cfg.num_validation, cfg.parts)?;
        tracing::info!(
            "{} parts × {} classes: {} training + {} validation samples per class per part",
            plan.parts(),
            catalog.width(),
            plan.train_per_part(),
            plan.val_per_part(),
        );

        // ── Step 4: Record-count check ────────────────────────────────────────
        // Runs over every file before the destination is created, so a
        // short class file never leaves a half-written dataset behind.
        let required = plan.required_lines();
        for entry in catalog.entries() {
            let path = scanner.path_of(entry);
            let available = count_records(&path, required)?;
            if available < required {
                return Err(PrepareError::ShortClassFile { path, required, available }.into());
            }
            tracing::debug!("'{}' has at least {} records", entry.file_name, available);
        }

        Ok((scanner, catalog, plan))
    }

    /// Fill and persist every part through `sink`.
    fn write_parts(
        &self,
        scanner: &ClassFileScanner,
        catalog: &ClassCatalog,
        plan:    PartitionPlan,
        sink:    &dyn SampleSink,
    ) -> Result<PrepareReport> {
        let width = catalog.width();
        let steps = plan.parts() * width;
        let mut train_lengths = Vec::with_capacity(steps * plan.train_per_part());
        let mut val_lengths   = Vec::with_capacity(steps * plan.val_per_part());

        for part in 0..plan.parts() {
            let mut train = PartitionBuffer::new(plan.train_per_part() * width, width);
            let mut val   = PartitionBuffer::new(plan.val_per_part() * width, width);

            for (class_index, entry) in catalog.entries().iter().enumerate() {
                let path = scanner.path_of(entry);
                let mut cursor = RecordCursor::open(&path)?;
                cursor.skip(plan.line_offset(part))?;

                for (split, buffer, lengths) in [
                    (Split::Training, &mut train, &mut train_lengths),
                    (Split::Validation, &mut val, &mut val_lengths),
                ] {
                    for _ in 0..plan.per_part(split) {
                        let (strokes, _word) = cursor.next_record()?;
                        lengths.push(strokes.len() as i64);
                        buffer.push(strokes, class_index);
                    }
                }

                if !self.config.quiet {
                    let done = part * width + class_index + 1;
                    tracing::info!(
                        "[{:>3}%] part {} '{}'",
                        done * 100 / steps,
                        part,
                        entry.file_name,
                    );
                }
            }

            sink.write_part(part, Split::Training, &train)
                .with_context(|| format!("Writing training part {part}"))?;
            sink.write_part(part, Split::Validation, &val)
                .with_context(|| format!("Writing validation part {part}"))?;
        }

        sink.write_stroke_lengths(Split::Training, &train_lengths)?;
        sink.write_stroke_lengths(Split::Validation, &val_lengths)?;

        let report = PrepareReport {
            classes:            width,
            parts:              plan.parts(),
            training_samples:   train_lengths.len(),
            validation_samples: val_lengths.len(),
            training_lengths:   LengthStats::from_lengths(&train_lengths),
            validation_lengths: LengthStats::from_lengths(&val_lengths),
        };
        log_lengths(Split::Training, report.training_lengths);
        log_lengths(Split::Validation, report.validation_lengths);
        Ok(report)
    }
}

fn log_lengths(split: Split, stats: Option<LengthStats>) {
    match stats {
        Some(s) => tracing::info!(
            "{} stroke lengths: mean {:.1}, min {}, max {}",
            split, s.mean, s.min, s.max
        ),
        None => tracing::info!("{} split is empty", split),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use ndarray_npy::read_npy;
    use std::{fs, io::Write, path::Path};

    fn write_class_file(dir: &Path, name: &str, word: &str, lines: usize) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        for i in 0..lines {
            // point count steps every 100 lines so parts differ
            let n = 2 + (i / 100) % 5;
            let xs: Vec<String> = (0..n).map(|k| (k * 10 + i % 7).to_string()).collect();
            let ys: Vec<String> = (0..n).map(|k| (k * k).to_string()).collect();
            writeln!(
                f,
                r#"{{"word":"{word}","drawing":[[[{}],[{}]]]}}"#,
                xs.join(","),
                ys.join(",")
            )
            .unwrap();
        }
    }

    fn setup(lines: usize) -> (tempfile::TempDir, PrepareConfig) {
        let root = tempfile::tempdir().unwrap();
        let source = root.path().join("source");
        fs::create_dir(&source).unwrap();
        write_class_file(&source, "full_simplified_cat.ndjson", "cat", lines);
        write_class_file(&source, "full_simplified_dog.ndjson", "dog", lines);
        write_class_file(&source, "notes.txt", "cat", 3);

        let class_list = root.path().join("classes.csv");
        fs::write(&class_list, "c,cat\nd,dog\n").unwrap();

        let cfg = PrepareConfig {
            class_list,
            source_dir: source,
            dest_dir: root.path().join("out"),
            num_training: 1000,
            num_validation: 100,
            parts: 1,
            quiet: true,
        };
        (root, cfg)
    }

    #[test]
    fn test_end_to_end_two_classes() {
        let (_root, cfg) = setup(1100);
        let report = PrepareUseCase::new(cfg.clone()).execute().unwrap();

        assert_eq!(report.classes, 2);
        assert_eq!(report.training_samples, 2000);
        assert_eq!(report.validation_samples, 200);

        let y: Array2<i16> = read_npy(cfg.dest_dir.join("train_0_y.npy")).unwrap();
        assert_eq!(y.dim(), (2000, 2));
        for row in y.rows() {
            assert_eq!(row.iter().filter(|&&v| v == 1).count(), 1);
            assert_eq!(row.sum(), 1);
        }
        // class order follows file names: cat first, then dog
        assert_eq!(y.row(0).to_vec(), vec![1, 0]);
        assert_eq!(y.row(1999).to_vec(), vec![0, 1]);

        let vy: Array2<i16> = read_npy(cfg.dest_dir.join("validation_0_y.npy")).unwrap();
        assert_eq!(vy.dim(), (200, 2));

        let lengths: Array1<i64> = read_npy(cfg.dest_dir.join("train_stroke_lengths.npy")).unwrap();
        assert_eq!(lengths.len(), 2000);
        // line i has 2 + (i / 100) % 5 points, one delta row fewer
        assert_eq!(lengths[0], 1);
        assert_eq!(lengths[999], 5);

        let archive = fs::File::open(cfg.dest_dir.join("train_0_x.npz")).unwrap();
        let zip = zip::ZipArchive::new(archive).unwrap();
        assert_eq!(zip.len(), 2000);

        let stats = report.training_lengths.unwrap();
        assert_eq!(stats.min, 1);
        assert_eq!(stats.max, 5);
    }

    #[test]
    fn test_parts_read_disjoint_offsets() {
        let (_root, mut cfg) = setup(1100);
        cfg.num_training = 500;
        cfg.num_validation = 50;
        cfg.parts = 2;
        let report = PrepareUseCase::new(cfg.clone()).execute().unwrap();
        // counts are per class: 2 classes × 2 parts × 250
        assert_eq!(report.training_samples, 1000);
        assert_eq!(report.validation_samples, 100);

        let lengths: Array1<i64> = read_npy(cfg.dest_dir.join("train_stroke_lengths.npy")).unwrap();
        // part 0 cat, part 0 dog, then part 1 cat from line 275
        assert_eq!(lengths[0], 1);
        assert_eq!(lengths[500], 3);

        for k in 0..2 {
            assert!(cfg.dest_dir.join(format!("train_{k}_x.npz")).exists());
            assert!(cfg.dest_dir.join(format!("validation_{k}_y.npy")).exists());
        }
    }

    #[test]
    fn test_repeated_runs_are_byte_identical() {
        let (root, cfg) = setup(1100);
        PrepareUseCase::new(cfg.clone()).execute().unwrap();

        let second = PrepareConfig { dest_dir: root.path().join("out2"), ..cfg.clone() };
        PrepareUseCase::new(second.clone()).execute().unwrap();

        for name in [
            "train_0_x.npz",
            "train_0_y.npy",
            "validation_0_x.npz",
            "validation_0_y.npy",
            "train_stroke_lengths.npy",
            "validation_stroke_lengths.npy",
        ] {
            let a = fs::read(cfg.dest_dir.join(name)).unwrap();
            let b = fs::read(second.dest_dir.join(name)).unwrap();
            assert_eq!(a, b, "{name} differs between runs");
        }
    }

    #[test]
    fn test_short_file_fails_before_writing() {
        let (_root, cfg) = setup(1050);
        let err = PrepareUseCase::new(cfg.clone()).execute().unwrap_err();
        match err.downcast_ref::<PrepareError>() {
            Some(PrepareError::ShortClassFile { required, available, .. }) => {
                assert_eq!(*required, 1100);
                assert_eq!(*available, 1050);
            }
            other => panic!("expected ShortClassFile, got {other:?}"),
        }
        assert!(!cfg.dest_dir.exists());
    }

    #[test]
    fn test_trailing_blank_line_does_not_hide_short_file() {
        let (_root, mut cfg) = setup(10);
        let cat = cfg.source_dir.join("full_simplified_cat.ndjson");
        write_class_file(&cfg.source_dir, "full_simplified_cat.ndjson", "cat", 3);
        fs::OpenOptions::new().append(true).open(&cat).unwrap().write_all(b"\n").unwrap();
        cfg.num_training = 2;
        cfg.num_validation = 2;
        cfg.parts = 2;

        let err = PrepareUseCase::new(cfg.clone()).execute().unwrap_err();
        match err.downcast_ref::<PrepareError>() {
            Some(PrepareError::ShortClassFile { required, available, .. }) => {
                assert_eq!(*required, 4);
                assert_eq!(*available, 3);
            }
            other => panic!("expected ShortClassFile, got {other:?}"),
        }
        assert!(!cfg.dest_dir.exists());
    }

    #[test]
    fn test_zero_parts_rejected() {
        let (_root, mut cfg) = setup(10);
        cfg.parts = 0;
        let err = PrepareUseCase::new(cfg).execute().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepareError>(),
            Some(PrepareError::InvalidPartitioning(_))
        ));
    }

    #[test]
    fn test_length_stats() {
        let s = LengthStats::from_lengths(&[2, 4, 9]).unwrap();
        assert_eq!(s.min, 2);
        assert_eq!(s.max, 9);
        assert!((s.mean - 5.0).abs() < 1e-9);
        assert!(LengthStats::from_lengths(&[]).is_none());
    }
}
