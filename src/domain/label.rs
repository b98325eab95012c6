// ============================================================
// Layer 3 — Class Catalog
// ============================================================
// The set of class files matched for one preparation run.
// A label is the index of its file in this catalog, and its
// one-hot vector is as wide as the catalog itself, not as
// wide as the class list the filters came from.
//
// Example:
//   filters:  ["cat", "dog", "zebra"]
//   matched:  ["cat.ndjson", "dog.ndjson"]   (no zebra file)
//   label of a dog record → [0, 1]
//
// The rows themselves are written by PartitionBuffer::push.

/// One matched source file and the class filter that selected it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    /// Display name from the class list (column 2)
    pub filter: String,

    /// File name inside the source directory
    pub file_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ClassCatalog {
    entries: Vec<ClassEntry>,
}

impl ClassCatalog {
    pub fn new(entries: Vec<ClassEntry>) -> Self {
        Self { entries }
    }

    /// Width of every one-hot label vector
    pub fn width(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ClassEntry] {
        &self.entries
    }
}
