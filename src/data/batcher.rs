// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<DecodedImage>
// into one NCHW float tensor.
//
//   DecodedImage pixels: [H, W, 3] u8, row-major
//   per image:           [H, W, 3] f32 → permute → [3, H, W]
//   batch:               stack → [N, 3, H, W]
//
// Values stay in the 0–255 range: the transformer network takes
// raw intensities, and the feature extractor applies its own
// mean subtraction.
//
// Reference: Burn Book §4 (Batcher)

use anyhow::{anyhow, ensure, Result};
use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::image::DecodedImage;

/// A batch of content images, shape [batch_size, 3, side, side]
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    pub images: Tensor<B, 4>,
}

#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<DecodedImage, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<DecodedImage>) -> ImageBatch<B> {
        let images = items
            .iter()
            .map(|img| image_to_tensor::<B>(img, &self.device))
            .collect();

        ImageBatch {
            images: Tensor::stack(images, 0),
        }
    }
}

/// [side, side, 3] u8 pixels → [3, side, side] float tensor in 0–255
pub fn image_to_tensor<B: Backend>(img: &DecodedImage, device: &B::Device) -> Tensor<B, 3> {
    let data: Vec<f32> = img.pixels.iter().map(|&p| p as f32).collect();
    Tensor::<B, 3>::from_data(
        TensorData::new(data, [img.side, img.side, 3]).convert::<B::FloatElem>(),
        device,
    )
    .permute([2, 0, 1])
}

/// [3, side, side] float tensor → pixels, clamped to 0–255 and rounded
pub fn tensor_to_image<B: Backend>(
    tensor: Tensor<B, 3>,
    source: impl Into<String>,
) -> Result<DecodedImage> {
    let [channels, height, width] = tensor.dims();
    ensure!(channels == 3, "expected 3 channels, got {channels}");
    ensure!(height == width, "expected a square image, got {height}×{width}");

    let values = tensor
        .clamp(0.0, 255.0)
        .permute([1, 2, 0])
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read output tensor: {e:?}"))?;
    let pixels = values.into_iter().map(|v| v.round() as u8).collect();

    Ok(DecodedImage::new(source, height, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn image(side: usize, fill: impl Fn(usize) -> u8) -> DecodedImage {
        DecodedImage::new("t", side, (0..side * side * 3).map(fill).collect())
    }

    #[test]
    fn test_batch_shape() {
        let batcher = ImageBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(vec![image(4, |_| 1), image(4, |_| 2)]);
        assert_eq!(batch.images.dims(), [2, 3, 4, 4]);
    }

    #[test]
    fn test_channels_are_planar() {
        // pixel (0, 0) = [10, 20, 30]; every other byte 0
        let img = image(2, |i| match i { 0 => 10, 1 => 20, 2 => 30, _ => 0 });
        let t = image_to_tensor::<TestBackend>(&img, &Default::default());
        let v = t.into_data().to_vec::<f32>().unwrap();
        // planes are 2×2 = 4 values each
        assert_eq!(v[0], 10.0);
        assert_eq!(v[4], 20.0);
        assert_eq!(v[8], 30.0);
    }

    #[test]
    fn test_tensor_image_round_trip() {
        let img = image(3, |i| (i * 7 % 256) as u8);
        let t = image_to_tensor::<TestBackend>(&img, &Default::default());
        let back = tensor_to_image(t, "t").unwrap();
        assert_eq!(back.pixels, img.pixels);
    }

    #[test]
    fn test_output_is_clamped() {
        let t = Tensor::<TestBackend, 3>::full([3, 2, 2], 300.0, &Default::default());
        let img = tensor_to_image(t, "t").unwrap();
        assert!(img.pixels.iter().all(|&p| p == 255));
    }
}
