// ============================================================
// Layer 2 — StylizeUseCase
// ============================================================
// Repaints one image with a trained transformer:
//
//   Step 1: Read style_config.json     (Layer 6 - infra)
//   Step 2: Load + crop the input      (Layer 4 - data)
//   Step 3: Load the latest checkpoint (Layer 5 - ml)
//   Step 4: Forward pass               (Layer 5 - ml)
//   Step 5: Save the result            (Layer 4 - data)

use anyhow::Result;
use burn::prelude::*;
use std::path::PathBuf;

use crate::data::images::{load_square_image, save_image};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::stylizer::{InferBackend, Stylizer};

#[derive(Debug, Clone)]
pub struct StylizeConfig {
    pub checkpoint_dir: PathBuf,
    pub input:          PathBuf,
    pub output:         PathBuf,
}

pub struct StylizeUseCase {
    config: StylizeConfig,
}

impl StylizeUseCase {
    pub fn new(config: StylizeConfig) -> Self {
        Self { config }
    }

    /// Returns the path written.
    pub fn execute(&self) -> Result<PathBuf> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        self.run::<InferBackend>(device)
    }

    pub fn run<B: Backend>(&self, device: B::Device) -> Result<PathBuf> {
        let cfg = &self.config;

        // ── Steps 1–2 ─────────────────────────────────────────────────────────
        let ckpt  = CheckpointManager::new(&cfg.checkpoint_dir)?;
        let side  = ckpt.load_config()?.image_side;
        let image = load_square_image(&cfg.input, side)?;

        // ── Steps 3–4 ─────────────────────────────────────────────────────────
        let stylizer = Stylizer::<B>::from_checkpoint(&ckpt, device)?;
        let result   = stylizer.stylize(&image)?;

        // ── Step 5 ────────────────────────────────────────────────────────────
        save_image(&cfg.output, &result)?;
        tracing::info!("Wrote '{}'", cfg.output.display());
        Ok(cfg.output.clone())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use image::{Rgb, RgbImage};

    use crate::application::style_use_case::StyleTrainConfig;

    #[test]
    fn test_stylize_writes_png_of_configured_side() {
        let root = tempfile::tempdir().unwrap();
        let ckpt_dir = root.path().join("ckpt");
        let ckpt = CheckpointManager::new(&ckpt_dir).unwrap();
        let cfg = StyleTrainConfig { image_side: 32, filters: 4, ..StyleTrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        ckpt.save_model(&cfg.model_config().init::<NdArray<f32>>(&Default::default()), 0).unwrap();

        let input = root.path().join("in.png");
        RgbImage::from_pixel(50, 64, Rgb([10, 20, 30])).save(&input).unwrap();
        let output = root.path().join("out").join("styled.png");

        let written = StylizeUseCase::new(StylizeConfig {
            checkpoint_dir: ckpt_dir,
            input,
            output: output.clone(),
        })
        .run::<NdArray<f32>>(Default::default())
        .unwrap();

        assert_eq!(written, output);
        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }

    #[test]
    fn test_missing_checkpoint_is_error() {
        let root = tempfile::tempdir().unwrap();
        let result = StylizeUseCase::new(StylizeConfig {
            checkpoint_dir: root.path().join("empty"),
            input:          root.path().join("in.png"),
            output:         root.path().join("out.png"),
        })
        .run::<NdArray<f32>>(Default::default());
        assert!(result.is_err());
    }
}
