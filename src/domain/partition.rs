// ============================================================
// Layer 3 — Partition Layout
// ============================================================
// A run is split into `parts`. Every class file contributes
// the same number of lines to every part:
//
//   lines_per_part = train_per_part + val_per_part
//
//   file lines:  | part 0              | part 1              | ...
//                | train ... | val ... | train ... | val ... |
//                ^ offset(0) = 0       ^ offset(1) = lines_per_part
//
// Parts within one run never overlap. Two runs with a different
// `parts` value both start at line 0 and therefore do overlap.

use std::fmt;

use crate::domain::error::PrepareError;
use crate::domain::sketch::StrokeDeltas;

/// Which half of a part a sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Training,
    Validation,
}

impl Split {
    /// Prefix used in output file names
    pub fn file_prefix(self) -> &'static str {
        match self {
            Split::Training   => "train",
            Split::Validation => "validation",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_prefix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlan {
    parts:          usize,
    train_per_part: usize,
    val_per_part:   usize,
}

impl PartitionPlan {
    /// Spread the requested totals evenly over `parts`.
    /// Per-part counts use integer division, so a remainder is dropped.
    pub fn new(
        num_training:   usize,
        num_validation: usize,
        parts:          usize,
    ) -> Result<Self, PrepareError> {
        if parts == 0 {
            return Err(PrepareError::InvalidPartitioning(
                "parts must be at least 1".to_string(),
            ));
        }
        let plan = Self {
            parts,
            train_per_part: num_training / parts,
            val_per_part:   num_validation / parts,
        };
        if plan.lines_per_part() == 0 {
            return Err(PrepareError::InvalidPartitioning(format!(
                "{num_training} training and {num_validation} validation samples \
                 over {parts} parts leaves every part empty"
            )));
        }
        Ok(plan)
    }

    pub fn parts(&self) -> usize {
        self.parts
    }

    pub fn train_per_part(&self) -> usize {
        self.train_per_part
    }

    pub fn val_per_part(&self) -> usize {
        self.val_per_part
    }

    pub fn per_part(&self, split: Split) -> usize {
        match split {
            Split::Training   => self.train_per_part,
            Split::Validation => self.val_per_part,
        }
    }

    pub fn lines_per_part(&self) -> usize {
        self.train_per_part + self.val_per_part
    }

    /// First line (0-based) that part `part` reads from each class file
    pub fn line_offset(&self, part: usize) -> usize {
        part * self.lines_per_part()
    }

    /// Minimum line count every class file must have
    pub fn required_lines(&self) -> usize {
        self.parts * self.lines_per_part()
    }
}

/// Samples of one split of one part, sized up front.
///
/// `labels` is a flat row-major [capacity, width] matrix that
/// starts zeroed; `push` writes the single 1 of each row.
#[derive(Debug, Clone)]
pub struct PartitionBuffer {
    strokes:  Vec<StrokeDeltas>,
    labels:   Vec<i16>,
    width:    usize,
    capacity: usize,
    cursor:   usize,
}

impl PartitionBuffer {
    pub fn new(capacity: usize, width: usize) -> Self {
        Self {
            strokes: Vec::with_capacity(capacity),
            labels:  vec![0; capacity * width],
            width,
            capacity,
            cursor:  0,
        }
    }

    /// Append a sample labelled with `class_index`.
    ///
    /// # Panics
    /// Panics when the buffer is already full or the class index
    /// is outside the label width.
    pub fn push(&mut self, strokes: StrokeDeltas, class_index: usize) {
        assert!(self.cursor < self.capacity, "partition buffer is full");
        assert!(class_index < self.width, "class index outside label width");
        self.labels[self.cursor * self.width + class_index] = 1;
        self.strokes.push(strokes);
        self.cursor += 1;
    }

    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn strokes(&self) -> &[StrokeDeltas] {
        &self.strokes
    }

    /// Filled label rows only, flat [len, width]
    pub fn labels(&self) -> &[i16] {
        &self.labels[..self.cursor * self.width]
    }
}
