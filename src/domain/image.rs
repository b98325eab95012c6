// ============================================================
// Layer 3 — Image Domain Type
// ============================================================
// An RGB image that has already been decoded, center-cropped
// and resized to a square side. Pixels are stored row-major,
// interleaved as [R, G, B, R, G, B, ...].

#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Filename the pixels came from, kept for traceability
    pub source: String,

    /// Width and height in pixels
    pub side: usize,

    /// side * side * 3 bytes, HWC order
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(source: impl Into<String>, side: usize, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), side * side * 3);
        Self {
            source: source.into(),
            side,
            pixels,
        }
    }
}
