// ============================================================
// Layer 2 — Style Use Cases
// ============================================================
// BuildStyleUseCase assembles the style model and stores the
// untrained transformer:
//
//   Step 1: Load + crop the style image   (Layer 4 - data)
//   Step 2: Load the feature extractor    (Layer 5 - ml)
//   Step 3: Build transformer + loss      (Layer 5 - ml)
//   Step 4: Check the shape contract      (Layer 5 - ml)
//   Step 5: Save config + epoch 0         (Layer 6 - infra)
//
// TrainStyleUseCase trains it on a directory of photos:
//
//   Step 1: Load content images           (Layer 4 - data)
//   Step 2: Train / validation split      (Layer 4 - data)
//   Step 3: Build the style model         (Layer 5 - ml)
//   Step 4: Save config                   (Layer 6 - infra)
//   Step 5: Run the training loop         (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{ensure, Result};
use burn::{prelude::*, tensor::backend::AutodiffBackend};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    dataset::ContentDataset,
    images::{load_square_image, ContentImageLoader},
    splitter::split_train_val,
};
use crate::domain::traits::ImageSource;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    model::{TransformerNetConfig, INPUT_SIDE},
    style::{build_style_model, StyleModel},
    stylizer::InferBackend,
    trainer::{train_loop, TrainBackend, TrainSummary},
    vgg::Vgg16Features,
};

// ─── Style Configuration ─────────────────────────────────────────────────────
// Saved as style_config.json next to the checkpoints so the
// stylizer can rebuild the same architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleTrainConfig {
    pub style_image:     String,
    pub content_dir:     String,
    pub checkpoint_dir:  String,
    pub vgg_weights:     Option<String>,
    pub image_side:      usize,
    pub epochs:          usize,
    pub batch_size:      usize,
    pub lr:              f64,
    pub train_fraction:  f64,
    pub seed:            u64,
    pub filters:         usize,
    pub residual_blocks: usize,
}

impl Default for StyleTrainConfig {
    fn default() -> Self {
        Self {
            style_image:     "style.jpg".to_string(),
            content_dir:     "data/content".to_string(),
            checkpoint_dir:  "checkpoints".to_string(),
            vgg_weights:     None,
            image_side:      INPUT_SIDE,
            epochs:          2,
            batch_size:      4,
            lr:              1e-4,
            train_fraction:  0.9,
            seed:            42,
            filters:         64,
            residual_blocks: 5,
        }
    }
}

impl StyleTrainConfig {
    pub fn model_config(&self) -> TransformerNetConfig {
        TransformerNetConfig::new()
            .with_filters(self.filters)
            .with_residual_blocks(self.residual_blocks)
    }

    /// Steps 1–3 shared by both use cases.
    fn style_model<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<StyleModel<B, Vgg16Features<B>>> {
        let style = load_square_image(Path::new(&self.style_image), self.image_side)?;
        let vgg = Vgg16Features::load_or_random(self.vgg_weights.as_deref().map(Path::new), device)?;
        build_style_model(&style, &self.model_config(), vgg, device)
    }
}

/// What build-style produced
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub parameters:   usize,
    pub style_layers: usize,
    pub output_dims:  [usize; 4],
}

// ─── BuildStyleUseCase ───────────────────────────────────────────────────────
pub struct BuildStyleUseCase {
    config: StyleTrainConfig,
}

impl BuildStyleUseCase {
    pub fn new(config: StyleTrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<BuildReport> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        self.run::<InferBackend>(&device)
    }

    pub fn run<B: Backend>(&self, device: &B::Device) -> Result<BuildReport> {
        let cfg  = &self.config;
        let side = cfg.image_side;

        // ── Steps 1–3: Style image, extractor, model ─────────────────────────
        tracing::info!("Building style model from '{}'", cfg.style_image);
        let model = cfg.style_model::<B>(device)?;
        let style_layers = model.loss.style_grams().len();
        let transformer  = model.into_transformer();

        // ── Step 4: Shape contract ────────────────────────────────────────────
        let probe = Tensor::<B, 4>::zeros([1, 3, side, side], device);
        let output_dims = transformer.forward(probe).dims();
        ensure!(
            output_dims == [1, 3, side, side],
            "Transformer maps [1, 3, {side}, {side}] to {output_dims:?}"
        );

        // ── Step 5: Persist ───────────────────────────────────────────────────
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt.save_config(cfg)?;
        ckpt.save_model(&transformer, 0)?;

        Ok(BuildReport {
            parameters: transformer.num_params(),
            style_layers,
            output_dims,
        })
    }
}

// ─── TrainStyleUseCase ───────────────────────────────────────────────────────
pub struct TrainStyleUseCase {
    config: StyleTrainConfig,
}

impl TrainStyleUseCase {
    pub fn new(config: StyleTrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainSummary> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        self.run::<TrainBackend>(device)
    }

    pub fn run<B: AutodiffBackend>(&self, device: B::Device) -> Result<TrainSummary> {
        let cfg = &self.config;

        // ── Step 1: Content images ────────────────────────────────────────────
        let loader = ContentImageLoader::new(&cfg.content_dir, cfg.image_side);
        let images = loader.load_all()?;
        ensure!(!images.is_empty(), "No content images found in '{}'", cfg.content_dir);

        // ── Step 2: Train / validation split ──────────────────────────────────
        let (train_images, val_images) = split_train_val(images, cfg.train_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_images.len(),
            val_images.len()
        );
        let train_dataset = ContentDataset::new(train_images);
        let val_dataset   = ContentDataset::new(val_images);

        // ── Step 3: Style model ───────────────────────────────────────────────
        let model = cfg.style_model::<B>(&device)?;

        // ── Step 4: Save config for stylize ───────────────────────────────────
        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;
        ckpt.save_config(cfg)?;

        // ── Step 5: Training loop (Layer 5) ───────────────────────────────────
        let (_, summary) = train_loop(cfg, model, train_dataset, val_dataset, &ckpt, &metrics, device)?;
        Ok(summary)
    }
}
