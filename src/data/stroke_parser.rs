// ============================================================
// Layer 4 — Stroke Parser
// ============================================================
// Turns one .ndjson line into a stroke-delta array.
//
// Steps (applied in order):
//   1. Flatten every stroke into one point list. The last point
//      of each stroke carries pen = 1, every other point pen = 0.
//   2. Min-max normalise x and y independently for this sample.
//      An axis with zero range is divided by 1 instead.
//   3. Difference consecutive points. The first point has no
//      predecessor and is dropped, so N points give N − 1 rows.
//      Row i keeps the pen flag of point i + 1.
//
// Example (one stroke, three points):
//   points  (0,0,0) (10,0,0) (10,5,1)
//   scale   x: 10, y: 5
//   norm    (0,0,0) (1,0,0)  (1,1,1)
//   deltas          (1,0,0)  (0,1,1)

use thiserror::Error;

use crate::domain::sketch::{SketchRecord, StrokeDeltas};

#[derive(Debug, Error)]
pub enum StrokeParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("drawing has no points")]
    EmptyDrawing,

    #[error("stroke {stroke} has {axes} coordinate lists, expected at least 2")]
    MissingAxis { stroke: usize, axes: usize },

    #[error("stroke {stroke} has {xs} x values but {ys} y values")]
    AxisMismatch { stroke: usize, xs: usize, ys: usize },
}

/// Parse one .ndjson line into (stroke deltas, class word).
pub fn parse_line(line: &str) -> Result<(StrokeDeltas, String), StrokeParseError> {
    let record: SketchRecord = serde_json::from_str(line.trim_end())?;
    let deltas = encode_strokes(&record)?;
    Ok((deltas, record.word))
}

/// Encode the strokes of an already-deserialised record.
pub fn encode_strokes(record: &SketchRecord) -> Result<StrokeDeltas, StrokeParseError> {
    let mut points = flatten(record)?;
    if points.is_empty() {
        return Err(StrokeParseError::EmptyDrawing);
    }
    normalize(&mut points);
    Ok(StrokeDeltas::from_rows(deltas(&points)))
}

fn flatten(record: &SketchRecord) -> Result<Vec<[f32; 3]>, StrokeParseError> {
    let total: usize = record
        .drawing
        .iter()
        .map(|s| s.first().map_or(0, Vec::len))
        .sum();
    let mut points = Vec::with_capacity(total);

    for (i, stroke) in record.drawing.iter().enumerate() {
        if stroke.len() < 2 {
            return Err(StrokeParseError::MissingAxis { stroke: i, axes: stroke.len() });
        }
        let (xs, ys) = (&stroke[0], &stroke[1]);
        if xs.len() != ys.len() {
            return Err(StrokeParseError::AxisMismatch {
                stroke: i,
                xs:     xs.len(),
                ys:     ys.len(),
            });
        }
        // zero-length strokes contribute nothing, not even a pen lift
        if xs.is_empty() {
            continue;
        }
        points.extend(xs.iter().zip(ys).map(|(&x, &y)| [x as f32, y as f32, 0.0]));
        if let Some(last) = points.last_mut() {
            last[2] = 1.0;
        }
    }

    Ok(points)
}

/// Per-axis min-max scaling of x and y into [0, 1].
pub(crate) fn normalize(points: &mut [[f32; 3]]) {
    for axis in 0..2 {
        let (lo, hi) = points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[axis]), hi.max(p[axis]))
        });
        let mut scale = hi - lo;
        if scale == 0.0 {
            scale = 1.0;
        }
        for p in points.iter_mut() {
            p[axis] = (p[axis] - lo) / scale;
        }
    }
}

fn deltas(points: &[[f32; 3]]) -> Vec<[f32; 3]> {
    points
        .windows(2)
        .map(|w| [w[1][0] - w[0][0], w[1][1] - w[0][1], w[1][2]])
        .collect()
}
