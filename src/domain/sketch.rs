// ============================================================
// Layer 3 — Sketch Domain Types
// ============================================================
// SketchRecord is one line of a QuickDraw .ndjson file:
//
//   {"word": "cat", "drawing": [[[x0, x1, ...], [y0, y1, ...]], ...]}
//
// Each stroke is a list of coordinate lists; index 0 holds the
// x values and index 1 the y values. Anything after that (the
// raw dataset carries timings) is ignored.
//
// StrokeDeltas is the encoded form fed to sequence models:
// one [dx, dy, pen] row per point after the first.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SketchRecord {
    /// Class name of the sketch
    pub word: String,

    /// Strokes, each as [xs, ys, ...]
    pub drawing: Vec<Vec<Vec<f64>>>,
}

/// Delta-encoded strokes, shape [len, 3].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokeDeltas {
    rows: Vec<[f32; 3]>,
}

impl StrokeDeltas {
    pub fn from_rows(rows: Vec<[f32; 3]>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[[f32; 3]] {
        &self.rows
    }

    /// Number of delta rows (total points − 1)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-major flat copy, [dx0, dy0, pen0, dx1, ...]
    pub fn to_flat(&self) -> Vec<f32> {
        self.rows.iter().flat_map(|r| r.iter().copied()).collect()
    }
}
