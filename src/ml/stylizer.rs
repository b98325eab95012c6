// ============================================================
// Layer 5 — Stylizer
// ============================================================
// Rebuilds the transformer from style_config.json, loads the
// latest checkpoint and repaints single images.
//
//   DecodedImage → [1, 3, side, side] → TransformerNet → DecodedImage

use anyhow::{ensure, Result};
use burn::prelude::*;

use crate::data::batcher::{image_to_tensor, tensor_to_image};
use crate::domain::image::DecodedImage;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::TransformerNet;

pub type InferBackend = burn::backend::Wgpu;

pub struct Stylizer<B: Backend> {
    model:  TransformerNet<B>,
    device: B::Device,
}

impl<B: Backend> Stylizer<B> {
    pub fn new(model: TransformerNet<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg   = ckpt_manager.load_config()?;
        let model = cfg.model_config().init::<B>(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Transformer loaded from '{}'", ckpt_manager.dir().display());
        Ok(Self::new(model, device))
    }

    pub fn stylize(&self, image: &DecodedImage) -> Result<DecodedImage> {
        ensure!(
            image.pixels.len() == image.side * image.side * 3,
            "Image '{}' is not a {}×{} RGB square",
            image.source,
            image.side,
            image.side
        );
        let input  = image_to_tensor::<B>(image, &self.device).unsqueeze::<4>();
        let output = self.model.forward(input);
        let [_, channels, height, width] = output.dims();
        // a config whose crops do not cancel the padding resizes the image
        ensure!(
            height == image.side && width == image.side,
            "Transformer maps a {}×{} input to {}×{}; rebuild it for side {}",
            image.side,
            image.side,
            height,
            width,
            image.side
        );
        let output = output.reshape([channels, height, width]);
        tensor_to_image(output, format!("stylized_{}", image.source))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::application::style_use_case::StyleTrainConfig;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_stylize_from_saved_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let cfg = StyleTrainConfig {
            filters: 4,
            ..StyleTrainConfig::default()
        };
        ckpt.save_config(&cfg).unwrap();
        let device = Default::default();
        ckpt.save_model(&cfg.model_config().init::<TestBackend>(&device), 0).unwrap();

        let stylizer = Stylizer::<TestBackend>::from_checkpoint(&ckpt, device).unwrap();
        let input = DecodedImage::new("cat.png", 32, vec![128; 32 * 32 * 3]);
        let out = stylizer.stylize(&input).unwrap();
        assert_eq!(out.side, 32);
        assert_eq!(out.pixels.len(), 32 * 32 * 3);
        assert_eq!(out.source, "stylized_cat.png");
    }

    #[test]
    fn test_rejects_wrong_pixel_count() {
        let device = Default::default();
        let cfg = StyleTrainConfig { filters: 2, ..StyleTrainConfig::default() };
        let stylizer = Stylizer::<TestBackend>::new(cfg.model_config().init(&device), device);
        let bad = DecodedImage {
            source: "bad.png".to_string(),
            side:   32,
            pixels: vec![0; 10],
        };
        assert!(stylizer.stylize(&bad).is_err());
    }

    #[test]
    fn test_rejects_network_that_changes_side() {
        let device = Default::default();
        let cfg = StyleTrainConfig { filters: 2, residual_blocks: 2, ..StyleTrainConfig::default() };
        assert_ne!(cfg.model_config().output_side(32), 32);
        let stylizer = Stylizer::<TestBackend>::new(cfg.model_config().init(&device), device);
        let input = DecodedImage::new("cat.png", 32, vec![128; 32 * 32 * 3]);
        let err = stylizer.stylize(&input).unwrap_err();
        assert!(err.to_string().contains("32×32"));
    }
}
