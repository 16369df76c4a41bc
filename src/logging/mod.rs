//! ## Sets up logging by reading configuration from environment variables.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info"
//! - LOG_FILE_PATH: when using file mode, the path of the log file (default "logs/selector.log")

use chrono::Utc;
use log::info;
use simplelog::{Config, LevelFilter, SimpleLogger, WriteLogger};
use std::{
    env,
    fs::{create_dir_all, File},
    path::Path,
};

fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Rolls the configured log file path by appending the current UTC date.
fn rolled_file_path(base_file_path: &str, date_str: &str) -> String {
    if base_file_path.ends_with(".log") {
        let trimmed = &base_file_path[..base_file_path.len() - 4];
        format!("{}-{}.log", trimmed, date_str)
    } else {
        format!("{}-{}.log", base_file_path, date_str)
    }
}

pub fn setup_logging() {
    let log_mode = env::var("LOG_MODE").unwrap_or_else(|_| "stdout".to_string());
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let level_filter = parse_level(&log_level);

    if log_mode.to_lowercase() == "file" {
        let base_file_path =
            env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/selector.log".to_string());

        let date_str = Utc::now().format("%Y-%m-%d").to_string();
        let file_path = rolled_file_path(&base_file_path, &date_str);

        if let Some(parent) = Path::new(&file_path).parent() {
            create_dir_all(parent).expect("Failed to create log directory");
        }

        let log_file = File::create(&file_path)
            .unwrap_or_else(|e| panic!("Unable to create log file {}: {}", file_path, e));

        WriteLogger::init(level_filter, Config::default(), log_file)
            .expect("Failed to initialize file logger");
    } else {
        SimpleLogger::init(level_filter, Config::default())
            .expect("Failed to initialize simple logger");
    }

    info!("Logging is successfully configured (mode: {})", log_mode);
}
