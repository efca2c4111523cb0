#![allow(clippy::print_stdout)]

mod args;

use crate::args::{Cli, Command};
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use spore_client::SporeClient;
use spore_client::records::{read_record, read_records};
use spore_logger::{LevelFilter, Logger};
use std::str::FromStr;

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = LevelFilter::from_str(&cli.log_level)
        .with_context(|| format!("Invalid log level '{}'", cli.log_level))?;
    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).level(level).init()?;

    let client = SporeClient::new(&cli.url)?;

    match cli.command {
        Command::Predict { file } => print_json(&client.predict(&read_record(&file).await?).await?),
        Command::PredictProba { file } => {
            print_json(&client.predict_proba(&read_record(&file).await?).await?)
        },
        Command::PredictBatch { file } => {
            print_json(&client.predict_batch(read_records(&file).await?).await?)
        },
        Command::PredictProbaBatch { file } => {
            print_json(&client.predict_proba_batch(&read_records(&file).await?).await?)
        },
        Command::Status => print_json(&client.status().await?),
        Command::Fit { dataset } => print_json(&client.fit(&dataset).await?),
    }
}
