//! Command implementations for the spamsift CLI.

use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::artifacts::ArtifactStore;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::{NumericLabelConvention, TrainingConfig};
use crate::dataset::Dataset;
use crate::error::{Result, SiftError};
use crate::service::ModelState;

/// Execute a CLI command.
pub fn execute_command(args: SiftArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Predict(predict_args) => predict(predict_args.clone(), &args),
        Command::PredictBatch(batch_args) => predict_batch(batch_args.clone(), &args),
        Command::Info(info_args) => info(info_args.clone(), &args),
    }
}

/// Train a model from a CSV dataset and persist the artifacts.
fn train(args: TrainArgs, cli_args: &SiftArgs) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!("Training from: {}", args.data_file.display());
    }

    let dataset = Dataset::from_csv_path(&args.data_file)?;

    let mut config = TrainingConfig {
        max_features: args.max_features,
        test_size: args.test_size,
        cv_folds: args.folds,
        seed: args.seed,
        ..TrainingConfig::default()
    };
    if args.zero_is_spam {
        config.numeric_labels = NumericLabelConvention::ZeroIsSpam;
    }
    if args.naive_bayes {
        config = config.with_naive_bayes();
    }

    let state = ModelState::new(ArtifactStore::new(&args.model_dir));
    let summary = state.train(&dataset, &config)?;

    output_result(&format_training_summary(&summary), &summary, cli_args)
}

/// Classify a single message.
fn predict(args: PredictArgs, cli_args: &SiftArgs) -> Result<()> {
    let state = ModelState::open(ArtifactStore::new(&args.model_dir))?;
    let prediction = state.predict_one(&args.message)?;
    output_result(&format_prediction(&prediction), &prediction, cli_args)
}

/// Classify a batch of messages from the command line or a file.
fn predict_batch(args: PredictBatchArgs, cli_args: &SiftArgs) -> Result<()> {
    let messages = if let Some(path) = &args.file {
        let file = File::open(path)?;
        let mut messages = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if !line.trim().is_empty() {
                messages.push(line);
            }
        }
        messages
    } else {
        args.messages.clone()
    };

    if messages.is_empty() {
        return Err(SiftError::validation(
            "no messages given; pass them inline or via --file",
        ));
    }

    let state = ModelState::open(ArtifactStore::new(&args.model_dir))?;
    let predictions = state.predict_batch(&messages)?;

    let human = predictions
        .iter()
        .map(format_prediction)
        .collect::<Vec<_>>()
        .join("\n");
    output_result(&human, &predictions, cli_args)
}

/// Show the persisted summary of the last training run.
fn info(args: InfoArgs, cli_args: &SiftArgs) -> Result<()> {
    let store = ArtifactStore::new(&args.model_dir);
    let summary = store.load_metadata()?;
    output_result(&format_training_summary(&summary), &summary, cli_args)
}
