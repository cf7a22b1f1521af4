use crate::storage::DEFAULT_DATA_FILE;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_LOG_FILE: &str = "taskboard.log";

/// Terminal task board: add, edit, complete, filter and drag tasks between
/// the pending and completed columns.
#[derive(Parser, Debug, Clone)]
#[command(name = "taskboard")]
#[command(version, about)]
pub struct Config {
    /// JSON file holding the task list
    #[arg(long, env = "TASKBOARD_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Where log output goes (the terminal belongs to the board)
    #[arg(long, env = "TASKBOARD_LOG", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
