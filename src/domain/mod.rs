// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing what the
// system works with: sketch records, stroke-delta arrays,
// class catalogs, partitions and content images.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Typed failures of the dataset preparation run
pub mod error;

// A content or style image decoded to RGB bytes
pub mod image;

// Class filters and their one-hot encoding
pub mod label;

// Partition layout and pre-sized sample buffers
pub mod partition;

// Raw sketch records and their stroke-delta encoding
pub mod sketch;

// Core abstractions (traits) that other layers implement
pub mod traits;
