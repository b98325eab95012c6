// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores transformer weights as named MessagePack
// records at full precision. Half precision would round the
// weights on every save, so a stylised image from a reloaded
// checkpoint would drift from the one the trainer last saw.
//
// File naming convention:
//   checkpoints/
//     transformer_epoch_0.mpk  ← untrained, from build-style
//     transformer_epoch_1.mpk  ← weights after epoch 1
//     ...
//     latest_epoch.json           ← number of the latest epoch
//     style_config.json           ← StyleTrainConfig
//
// The config is needed to rebuild the exact architecture
// (filter count, residual blocks) before the record can be
// loaded into it; loading fails if the shapes disagree.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};

use crate::application::style_use_case::StyleTrainConfig;
use crate::ml::model::TransformerNet;

const LATEST_FILE: &str = "latest_epoch.json";
const CONFIG_FILE: &str = "style_config.json";

type ModelRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save transformer weights for `epoch` and point
    /// latest_epoch.json at it.
    pub fn save_model<B: Backend>(&self, model: &TransformerNet<B>, epoch: usize) -> Result<()> {
        // recorder adds the .mpk extension
        let path = self.model_path(epoch);

        ModelRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let latest_path = self.dir.join(LATEST_FILE);
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write '{}'", latest_path.display()))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the latest saved weights into `model`.
    pub fn load_model<B: Backend>(
        &self,
        model:  TransformerNet<B>,
        device: &B::Device,
    ) -> Result<TransformerNet<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.model_path(epoch);

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = ModelRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you run 'build-style' or 'train-style'?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &StyleTrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved style config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<StyleTrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Run 'build-style' or 'train-style' first.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))
    }

    /// Epoch number stored in latest_epoch.json.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join(LATEST_FILE);
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot find '{}'", path.display()))?;
        Ok(serde_json::from_str::<usize>(&s)?)
    }

    fn model_path(&self, epoch: usize) -> PathBuf {
        self.dir.join(format!("transformer_epoch_{epoch}"))
    }
}
