//! Command line argument parsing for the spamsift CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// spamsift - a spam/ham text message classifier
#[derive(Parser, Debug, Clone)]
#[command(name = "spamsift")]
#[command(about = "Train and run a spam/ham text message classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SiftArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SiftArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a model from a labeled CSV dataset
    Train(TrainArgs),

    /// Classify a single message
    Predict(PredictArgs),

    /// Classify a batch of messages
    #[command(name = "predict-batch")]
    PredictBatch(PredictBatchArgs),

    /// Show the summary of the last training run
    Info(InfoArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// CSV dataset with 'text' and 'label' columns
    #[arg(value_name = "DATA_FILE")]
    pub data_file: PathBuf,

    /// Directory to write model artifacts to
    #[arg(short, long, value_name = "MODEL_DIR", default_value = "./models")]
    pub model_dir: PathBuf,

    /// Vocabulary ceiling for the TF-IDF vectorizer
    #[arg(long, default_value = "40000")]
    pub max_features: usize,

    /// Held-out test fraction
    #[arg(long, default_value = "0.15")]
    pub test_size: f64,

    /// Cross-validation folds
    #[arg(long, default_value = "3")]
    pub folds: usize,

    /// Random seed for splits, folds, and SGD shuffling
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Treat numeric label '0' as spam instead of '1'
    #[arg(long)]
    pub zero_is_spam: bool,

    /// Also try the Naive Bayes candidate family
    #[arg(long)]
    pub naive_bayes: bool,
}

/// Arguments for single-message prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Message to classify
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Directory holding model artifacts
    #[arg(short, long, value_name = "MODEL_DIR", default_value = "./models")]
    pub model_dir: PathBuf,
}

/// Arguments for batch prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictBatchArgs {
    /// Messages to classify (omit when using --file)
    #[arg(value_name = "MESSAGES")]
    pub messages: Vec<String>,

    /// Read messages from a file, one per line
    #[arg(short = 'F', long, value_name = "FILE", conflicts_with = "messages")]
    pub file: Option<PathBuf>,

    /// Directory holding model artifacts
    #[arg(short, long, value_name = "MODEL_DIR", default_value = "./models")]
    pub model_dir: PathBuf,
}

/// Arguments for showing training info
#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {
    /// Directory holding model artifacts
    #[arg(short, long, value_name = "MODEL_DIR", default_value = "./models")]
    pub model_dir: PathBuf,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_train_command() {
        let args = SiftArgs::try_parse_from([
            "spamsift",
            "train",
            "data.csv",
            "--model-dir",
            "/tmp/models",
            "--max-features",
            "5000",
            "--naive-bayes",
        ])
        .unwrap();

        if let Command::Train(train_args) = args.command {
            assert_eq!(train_args.data_file, PathBuf::from("data.csv"));
            assert_eq!(train_args.model_dir, PathBuf::from("/tmp/models"));
            assert_eq!(train_args.max_features, 5000);
            assert_eq!(train_args.test_size, 0.15);
            assert!(train_args.naive_bayes);
            assert!(!train_args.zero_is_spam);
        } else {
            panic!("Expected Train command");
        }
    }

    #[test]
    fn test_predict_command() {
        let args =
            SiftArgs::try_parse_from(["spamsift", "predict", "win cash now"]).unwrap();

        if let Command::Predict(predict_args) = args.command {
            assert_eq!(predict_args.message, "win cash now");
            assert_eq!(predict_args.model_dir, PathBuf::from("./models"));
        } else {
            panic!("Expected Predict command");
        }
    }

    #[test]
    fn test_predict_batch_with_file() {
        let args = SiftArgs::try_parse_from([
            "spamsift",
            "predict-batch",
            "--file",
            "messages.txt",
        ])
        .unwrap();

        if let Command::PredictBatch(batch_args) = args.command {
            assert_eq!(batch_args.file, Some(PathBuf::from("messages.txt")));
            assert!(batch_args.messages.is_empty());
        } else {
            panic!("Expected PredictBatch command");
        }
    }

    #[test]
    fn test_predict_batch_inline_conflicts_with_file() {
        let result = SiftArgs::try_parse_from([
            "spamsift",
            "predict-batch",
            "hello",
            "--file",
            "messages.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        let args = SiftArgs::try_parse_from(["spamsift", "info"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = SiftArgs::try_parse_from(["spamsift", "-vv", "info"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args = SiftArgs::try_parse_from(["spamsift", "--quiet", "info"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            SiftArgs::try_parse_from(["spamsift", "--format", "json", "info"]).unwrap();
        assert!(matches!(args.output_format, OutputFormat::Json));
    }
}
