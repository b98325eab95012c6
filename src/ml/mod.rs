// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All network definitions and the training/inference loops.
//
//   model.rs    — TransformerNet: pad → 3 conv blocks → residual
//                 crop blocks → 2 up blocks → 9×9 conv, tanh,
//                 rescaled to [0, 255]
//
//   vgg.rs      — Frozen VGG16 conv stack behind the
//                 FeatureExtractor trait, with its channel-mean
//                 preprocessing and the inverse transform
//
//   loss.rs     — Gram matrices, per-sample RMS and the composite
//                 content + style loss
//
//   style.rs    — build_style_model: transformer + loss with the
//                 style targets captured once
//
//   trainer.rs  — Adam training loop with validation, metrics
//                 and checkpoints per epoch
//
//   stylizer.rs — Loads the latest checkpoint and stylises images
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Style transformer network
pub mod model;

/// VGG16 feature extractor
pub mod vgg;

/// Composite perceptual loss
pub mod loss;

/// Style-model assembly
pub mod style;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Inference from a saved checkpoint
pub mod stylizer;
