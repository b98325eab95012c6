// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// use case in Layer 2. Final summaries are printed here; all
// progress goes through tracing.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BuildStyleArgs, Commands, PrepareArgs, StylizeArgs, TrainStyleArgs};

#[derive(Parser, Debug)]
#[command(
    name = "sketch-style",
    version = "0.1.0",
    about = "Prepare QuickDraw stroke datasets and build fast style-transfer models."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args)    => run_prepare(args),
            Commands::BuildStyle(args) => run_build_style(args),
            Commands::TrainStyle(args) => run_train_style(args),
            Commands::Stylize(args)    => run_stylize(args),
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    tracing::info!("Preparing class files from: {}", args.source_dir.display());
    let dest = args.dest_dir.clone();
    let report = PrepareUseCase::new(args.into()).execute()?;

    println!(
        "Prepared {} classes over {} part(s): {} training, {} validation samples in '{}'",
        report.classes,
        report.parts,
        report.training_samples,
        report.validation_samples,
        dest.display(),
    );
    Ok(())
}

fn run_build_style(args: BuildStyleArgs) -> Result<()> {
    use crate::application::style_use_case::BuildStyleUseCase;

    let ckpt_dir = args.style.checkpoint_dir.clone();
    let report = BuildStyleUseCase::new(args.into()).execute()?;

    println!(
        "Style model ready: {} parameters, {} style layers, output {:?}. Saved to '{}'.",
        report.parameters, report.style_layers, report.output_dims, ckpt_dir,
    );
    Ok(())
}

fn run_train_style(args: TrainStyleArgs) -> Result<()> {
    use crate::application::style_use_case::TrainStyleUseCase;

    tracing::info!("Starting style training on images in: {}", args.content_dir);
    let summary = TrainStyleUseCase::new(args.into()).execute()?;

    println!(
        "Training complete after {} epoch(s): train_loss={:.4}, val_loss={:.4}",
        summary.epochs, summary.train_loss, summary.val_loss,
    );
    Ok(())
}

fn run_stylize(args: StylizeArgs) -> Result<()> {
    use crate::application::stylize_use_case::StylizeUseCase;

    let written = StylizeUseCase::new(args.into()).execute()?;
    println!("Stylised image written to '{}'", written.display());
    Ok(())
}
