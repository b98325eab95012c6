// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Trains the transformer against the composite style loss with
// Burn's DataLoader and Adam (lr 1e-4 by default).
//
//   - Training runs on TrainBackend (Autodiff<Wgpu>)
//   - transformer.valid() and loss.valid() move both halves to
//     the inner backend for validation, so batch norm uses its
//     running statistics there
//   - Only the transformer is handed to the optimiser; the
//     extractor parameters are frozen
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam
//            Johnson et al. (2016) Perceptual Losses for
//            Real-Time Style Transfer

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::style_use_case::StyleTrainConfig;
use crate::data::{batcher::ImageBatcher, dataset::ContentDataset};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{
    model::TransformerNet,
    style::StyleModel,
    vgg::Vgg16Features,
};

pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Losses of the last completed epoch
#[derive(Debug, Clone, Copy)]
pub struct TrainSummary {
    pub epochs:     usize,
    pub train_loss: f64,
    pub val_loss:   f64,
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &StyleTrainConfig,
    model:         StyleModel<B, Vgg16Features<B>>,
    train_dataset: ContentDataset,
    val_dataset:   ContentDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<(TransformerNet<B>, TrainSummary)> {
    ensure!(train_dataset.image_count() > 0, "No content images to train on");
    ensure!(cfg.batch_size > 0, "Batch size must be at least 1");

    let StyleModel { mut transformer, loss } = model;

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    let val_loader = DataLoaderBuilder::new(ImageBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut summary = TrainSummary { epochs: 0, train_loss: f64::NAN, val_loss: f64::NAN };

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let generated = transformer.forward(batch.images.clone());
            let batch_loss = loss.forward(batch.images, generated).mean();

            train_loss_sum += batch_loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = batch_loss.backward();
            let grads = GradientsParams::from_grads(grads, &transformer);
            transformer = optim.step(cfg.lr, transformer, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let transformer_valid = transformer.valid();
        let loss_valid        = loss.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;

        for batch in val_loader.iter() {
            let generated = transformer_valid.forward(batch.images.clone());
            let batch_loss = loss_valid.forward(batch.images, generated).mean();
            val_loss_sum += batch_loss.into_scalar().elem::<f64>();
            val_batches  += 1;
        }

        let avg_val_loss = if val_batches > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4}",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss,
        );

        metrics.log(&EpochMetrics::new(epoch, avg_train_loss, avg_val_loss))?;
        ckpt_manager.save_model(&transformer, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);

        summary = TrainSummary { epochs: epoch, train_loss: avg_train_loss, val_loss: avg_val_loss };
    }

    tracing::info!("Training complete!");
    Ok((transformer, summary))
}
