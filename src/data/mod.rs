// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between raw files on disk and the arrays or
// tensors the rest of the program works with. Two pipelines
// share this layer.
//
// Sketch preparation:
//
//   classes.csv                 .ndjson directory
//       │                             │
//       ▼                             ▼
//   class_list  → filters ──▶ scanner → ClassCatalog
//                                     │
//                                     ▼
//                              record_reader → one line at a time
//                                     │
//                                     ▼
//                              stroke_parser → StrokeDeltas
//
// Style training:
//
//   content images
//       │
//       ▼
//   images          → center crop + resize to 320×320
//       │
//       ▼
//   splitter        → seeded train/validation split
//       │
//       ▼
//   ContentDataset  → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher    → stacks images into [N, 3, H, W] tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads class filters from the class-list CSV
pub mod class_list;

/// Matches .ndjson files in a directory against class filters
pub mod scanner;

/// Forward-only line cursor over one class file
pub mod record_reader;

/// Flattens, normalises and delta-encodes strokes
pub mod stroke_parser;

/// Decodes, crops, resizes and saves RGB images
pub mod images;

/// Implements Burn's Dataset trait for content images
pub mod dataset;

/// Implements Burn's Batcher trait to create image tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
