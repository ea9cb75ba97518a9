//! Output formatting for CLI commands.

use serde::Serialize;

use crate::cli::args::{OutputFormat, SiftArgs};
use crate::error::Result;
use crate::service::Prediction;
use crate::trainer::TrainingSummary;

/// Print a result either as human-readable text or as JSON, depending on
/// the requested output format.
pub fn output_result<T: Serialize>(human: &str, result: &T, cli_args: &SiftArgs) -> Result<()> {
    match cli_args.output_format {
        OutputFormat::Human => {
            if cli_args.verbosity() > 0 {
                println!("{human}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
    }
    Ok(())
}

/// Human-readable rendering of a training summary.
pub fn format_training_summary(summary: &TrainingSummary) -> String {
    let mut params: Vec<String> = summary
        .best_params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    params.sort();

    format!(
        "Model: {} ({})\n\
         Test accuracy: {:.4} (cv {:.4})\n\
         Samples: {} total, {} train, {} test\n\
         Trained at: {}\n\n{}",
        summary.model_type,
        params.join(", "),
        summary.accuracy,
        summary.cv_accuracy,
        summary.total_samples,
        summary.train_samples,
        summary.test_samples,
        summary.trained_at.to_rfc3339(),
        summary.report
    )
}

/// Human-readable rendering of one prediction.
pub fn format_prediction(prediction: &Prediction) -> String {
    format!(
        "{}  (probability {:.4})  {}",
        prediction.prediction.as_str(),
        prediction.probability,
        prediction.original_message
    )
}
