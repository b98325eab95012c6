// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one command each.
//
// Rules for this layer:
//   - No model or tensor math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

// QuickDraw stroke dataset preparation
pub mod prepare_use_case;

// Style-model assembly and training
pub mod style_use_case;

// Inference with a trained style model
pub mod stylize_use_case;
