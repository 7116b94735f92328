//! Logger set-up.
//!
//! Lines look like `[2024-01-01 09:00:00] [INFO] message` and go to stderr.
//! The filter comes from `RUST_LOG`, defaulting to `info`.

use std::io::Write;

use chrono::Local;
use log::Level;

const DEFAULT_FILTER: &str = "info";

pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER))
        .format(|buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            let line = format_line(&timestamp, record.level(), &record.args().to_string());
            writeln!(buf, "{line}")
        })
        .init();
}

fn format_line(timestamp: &str, level: Level, message: &str) -> String {
    format!("[{timestamp}] [{level}] {message}")
}
