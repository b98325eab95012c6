// ============================================================
// Layer 4 — Image Loading
// ============================================================
// Decodes image files into fixed-size RGB squares.
//
//   any format → RGB → center crop to min(w, h) → resize side×side
//
// Example: a 640×480 photo is cropped to the 480×480 square
// starting at x = 80, then resized to 320×320.
//
// ContentImageLoader walks a directory of training photos.
// A file that fails to decode is logged and skipped so one bad
// photo does not end a training run; a style image that fails
// to decode is always fatal (see load_square_image).
//
// Reference: image crate documentation (imageops)

use anyhow::{Context, Result};
use image::{imageops, imageops::FilterType, DynamicImage, RgbImage};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::image::DecodedImage;
use crate::domain::traits::ImageSource;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Open an image file, center-crop it to a square and resize.
pub fn load_square_image(path: &Path, side: usize) -> Result<DecodedImage> {
    let img = image::open(path)
        .with_context(|| format!("Cannot load image '{}'", path.display()))?;
    let square = center_crop_resize(&img, side as u32);

    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();
    Ok(DecodedImage::new(source, side, square.into_raw()))
}

/// Crop the largest centered square and resize it to side×side.
pub fn center_crop_resize(img: &DynamicImage, side: u32) -> RgbImage {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    let crop = w.min(h);
    let left = (w - crop) / 2;
    let top = (h - crop) / 2;
    let square = imageops::crop_imm(&rgb, left, top, crop, crop).to_image();
    if crop == side {
        return square;
    }
    imageops::resize(&square, side, side, FilterType::Triangle)
}

/// Write RGB bytes (HWC) as an image; format follows the extension.
pub fn save_image(path: &Path, image: &DecodedImage) -> Result<()> {
    let side = image.side as u32;
    let buffer = RgbImage::from_raw(side, side, image.pixels.clone())
        .context("Pixel buffer does not match image size")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    buffer
        .save(path)
        .with_context(|| format!("Cannot write image '{}'", path.display()))
}

/// Loads every image in a directory as a training content image.
pub struct ContentImageLoader {
    dir:  PathBuf,
    side: usize,
}

impl ContentImageLoader {
    pub fn new(dir: impl Into<PathBuf>, side: usize) -> Self {
        Self { dir: dir.into(), side }
    }
}

impl ImageSource for ContentImageLoader {
    fn load_all(&self) -> Result<Vec<DecodedImage>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read image directory '{}'", self.dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        let mut images = Vec::with_capacity(paths.len());
        for path in &paths {
            match load_square_image(path, self.side) {
                Ok(img) => images.push(img),
                Err(e) => tracing::warn!("Skipping '{}': {:#}", path.display(), e),
            }
        }

        tracing::info!(
            "Loaded {} of {} images from '{}'",
            images.len(),
            paths.len(),
            self.dir.display()
        );
        Ok(images)
    }
}
