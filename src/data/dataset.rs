use burn::data::dataset::Dataset;

use crate::domain::image::DecodedImage;

/// In-memory content images for the style training loop.
pub struct ContentDataset {
    images: Vec<DecodedImage>,
}

impl ContentDataset {
    pub fn new(images: Vec<DecodedImage>) -> Self { Self { images } }

    pub fn image_count(&self) -> usize { self.images.len() }
}

impl Dataset<DecodedImage> for ContentDataset {
    fn get(&self, index: usize) -> Option<DecodedImage> {
        self.images.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.images.len()
    }
}
