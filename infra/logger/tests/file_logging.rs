use spore_domain::config::LoggingConfig;
use spore_logger::Logger;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn file_logging_from_config_writes_json_lines() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let config = LoggingConfig {
        directory: Some(log_dir.clone()),
        json: true,
        ..LoggingConfig::default()
    };
    let logger = Logger::from_config("spore-file-logging", &config)?;

    tracing::info!(rows = 42, "training finished");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let content = fs::read_to_string(&log_file)?;
    let line = content.lines().find(|l| l.contains("training finished")).expect("event logged");
    let value: serde_json::Value = serde_json::from_str(line)?;
    assert_eq!(value["fields"]["rows"], 42);

    Ok(())
}
