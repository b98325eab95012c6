// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence that several layers share:
//
//   npy_store.rs  — NumPy array output for prepared sketches
//                   (.npz stroke archives, .npy labels and
//                   stroke lengths). Implements SampleSink.
//
//   checkpoint.rs — Transformer weights via Burn's
//                   full-precision NamedMpk records, plus the training config
//                   as JSON so stylize can rebuild the model.
//
//   metrics.rs    — Per-epoch loss rows appended to a CSV.
//
// Reference: Burn Book §5 (Records and Checkpointing)

/// Stroke archives, label matrices and length vectors
pub mod npy_store;

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
