// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and their flags:
//
//   prepare      — QuickDraw .ndjson → partitioned .npz/.npy
//   build-style  — assemble the style model, save epoch 0
//   train-style  — train the transformer on content photos
//   stylize      — repaint one image with the latest checkpoint
//
// Each Args struct converts into its application-layer config
// with a From impl, so Layer 2 never sees clap types.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    prepare_use_case::PrepareConfig,
    style_use_case::StyleTrainConfig,
    stylize_use_case::StylizeConfig,
};
use crate::ml::model::INPUT_SIDE;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Partition QuickDraw class files into training/validation arrays
    Prepare(PrepareArgs),

    /// Build the style model from a style image and save it untrained
    BuildStyle(BuildStyleArgs),

    /// Train the style transformer on a directory of content images
    TrainStyle(TrainStyleArgs),

    /// Stylise one image with a trained checkpoint
    Stylize(StylizeArgs),
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// CSV of `key,display name` rows; the display name filters file names
    #[arg(long)]
    pub class_list: PathBuf,

    /// Directory holding one .ndjson file per class
    #[arg(long)]
    pub source_dir: PathBuf,

    /// Where the .npz/.npy files are written (created if missing)
    #[arg(long)]
    pub dest_dir: PathBuf,

    /// Training samples per class, summed over all parts
    #[arg(long, default_value_t = 10_000)]
    pub num_training: usize,

    /// Validation samples per class, summed over all parts
    #[arg(long, default_value_t = 1_000)]
    pub num_validation: usize,

    /// Number of parts; each reads a disjoint line range
    #[arg(long, default_value_t = 1)]
    pub parts: usize,

    /// Do not log per-file progress
    #[arg(long)]
    pub quiet: bool,
}

impl From<PrepareArgs> for PrepareConfig {
    fn from(a: PrepareArgs) -> Self {
        PrepareConfig {
            class_list:     a.class_list,
            source_dir:     a.source_dir,
            dest_dir:       a.dest_dir,
            num_training:   a.num_training,
            num_validation: a.num_validation,
            parts:          a.parts,
            quiet:          a.quiet,
        }
    }
}

/// Flags shared by build-style and train-style
#[derive(Args, Debug)]
pub struct StyleArgs {
    /// Reference image whose style is learned
    #[arg(long)]
    pub style_image: String,

    /// Directory for checkpoints, style_config.json and metrics.csv
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// VGG16 weights as a NamedMpk record; random features without it
    #[arg(long)]
    pub vgg_weights: Option<String>,

    /// Side length images are cropped and resized to
    #[arg(long, default_value_t = INPUT_SIDE)]
    pub image_side: usize,

    /// Channels of the transformer's hidden feature maps
    #[arg(long, default_value_t = 64)]
    pub filters: usize,

    #[arg(long, default_value_t = 5)]
    pub residual_blocks: usize,
}

impl StyleArgs {
    fn into_config(self) -> StyleTrainConfig {
        StyleTrainConfig {
            style_image:     self.style_image,
            checkpoint_dir:  self.checkpoint_dir,
            vgg_weights:     self.vgg_weights,
            image_side:      self.image_side,
            filters:         self.filters,
            residual_blocks: self.residual_blocks,
            ..StyleTrainConfig::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct BuildStyleArgs {
    #[command(flatten)]
    pub style: StyleArgs,
}

impl From<BuildStyleArgs> for StyleTrainConfig {
    fn from(a: BuildStyleArgs) -> Self {
        a.style.into_config()
    }
}

#[derive(Args, Debug)]
pub struct TrainStyleArgs {
    #[command(flatten)]
    pub style: StyleArgs,

    /// Directory of content photos (png, jpg)
    #[arg(long, default_value = "data/content")]
    pub content_dir: String,

    #[arg(long, default_value_t = 2)]
    pub epochs: usize,

    #[arg(long, default_value_t = 4)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// Share of content images used for training; the rest validate
    #[arg(long, default_value_t = 0.9)]
    pub train_fraction: f64,

    /// Seed for the split and the loader shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<TrainStyleArgs> for StyleTrainConfig {
    fn from(a: TrainStyleArgs) -> Self {
        StyleTrainConfig {
            content_dir:    a.content_dir,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            train_fraction: a.train_fraction,
            seed:           a.seed,
            ..a.style.into_config()
        }
    }
}

#[derive(Args, Debug)]
pub struct StylizeArgs {
    /// Image to repaint
    #[arg(long)]
    pub input: PathBuf,

    /// Output path; the extension picks the format
    #[arg(long, default_value = "stylized.png")]
    pub output: PathBuf,

    /// Directory written by build-style or train-style
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,
}

impl From<StylizeArgs> for StylizeConfig {
    fn from(a: StylizeArgs) -> Self {
        StylizeConfig {
            checkpoint_dir: a.checkpoint_dir,
            input:          a.input,
            output:         a.output,
        }
    }
}
