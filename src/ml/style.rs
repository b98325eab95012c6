// ============================================================
// Layer 5 — Style Model Assembly
// ============================================================
// Pairs a fresh transformer with the composite loss for one
// style image:
//
//   style image (320×320 RGB)
//       │
//       ▼
//   extractor → 4 activations → Gram matrices (kept constant)
//
//   content batch ──▶ TransformerNet ──▶ generated batch
//        │                                   │
//        └──────────▶ StyleLoss ◀────────────┘
//                         │
//                         ▼
//                  per-sample loss [N]
//
// Training minimises the batch mean of that loss; inference
// only keeps the transformer.

use anyhow::{ensure, Result};
use burn::prelude::*;

use crate::data::batcher::image_to_tensor;
use crate::domain::image::DecodedImage;
use crate::ml::{
    loss::StyleLoss,
    model::{TransformerNet, TransformerNetConfig},
    vgg::FeatureExtractor,
};

pub struct StyleModel<B: Backend, E> {
    pub transformer: TransformerNet<B>,
    pub loss:        StyleLoss<B, E>,
}

impl<B: Backend, E: FeatureExtractor<B>> StyleModel<B, E> {
    /// content: [N, 3, H, W] → scalar batch-mean loss
    pub fn forward_loss(&self, content: Tensor<B, 4>) -> Tensor<B, 1> {
        let generated = self.transformer.forward(content.clone());
        self.loss.forward(content, generated).mean()
    }

    /// Drop the loss and keep the inference network.
    pub fn into_transformer(self) -> TransformerNet<B> {
        self.transformer
    }
}

/// Build the transformer and capture the style targets once.
///
/// `style` must already be cropped and resized to the side the
/// transformer maps onto itself.
pub fn build_style_model<B: Backend, E: FeatureExtractor<B>>(
    style:     &DecodedImage,
    model_cfg: &TransformerNetConfig,
    extractor: E,
    device:    &B::Device,
) -> Result<StyleModel<B, E>> {
    let out_side = model_cfg.output_side(style.side);
    ensure!(
        out_side == style.side,
        "Style image side {} does not map onto itself (network output {})",
        style.side,
        out_side
    );
    ensure!(
        style.pixels.len() == style.side * style.side * 3,
        "Style image '{}' has {} bytes, expected {}",
        style.source,
        style.pixels.len(),
        style.side * style.side * 3
    );

    let transformer = model_cfg.init::<B>(device);
    let style_tensor = image_to_tensor::<B>(style, device).unsqueeze::<4>();
    let loss = StyleLoss::new(extractor, style_tensor);

    tracing::info!(
        "Style model built from '{}': {} filters, {} residual blocks",
        style.source,
        model_cfg.filters,
        model_cfg.residual_blocks,
    );
    Ok(StyleModel { transformer, loss })
}
