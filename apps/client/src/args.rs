//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use spore_client::DEFAULT_URL;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "spore-client")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Command line client for the SporeCheck toxicity classifier")]
pub struct Cli {
    /// Base URL of the server
    #[arg(long, global = true, env = "SPORE_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify one mushroom read from a JSON file
    Predict {
        /// File holding a single mushroom object
        file: PathBuf,
    },
    /// Probability that one mushroom is poisonous
    PredictProba { file: PathBuf },
    /// Classify every mushroom of a JSON file
    PredictBatch {
        /// A list of mushrooms or a `{"mushrooms": [...]}` body
        file: PathBuf,
    },
    /// Probabilities for every mushroom of a JSON file
    PredictProbaBatch { file: PathBuf },
    /// Show when the current model was trained
    Status,
    /// Upload a CSV or ZIP dataset and train a new model
    Fit {
        /// `.csv` file or `.zip` archive containing one
        dataset: PathBuf,
    },
}
