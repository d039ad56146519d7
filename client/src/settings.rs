use std::fs;
use std::path::Path;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Replay settings, read from a JSON file. Missing fields take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// Negotiated viewport, in tiles.
    pub viewport_width: usize,
    pub viewport_height: usize,

    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    pub log_file: Option<String>,

    /// Animation ticks run after each replayed command.
    pub ticks_per_command: u32,
    /// Print the view after every command instead of only at the end.
    pub print_every_frame: bool,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            viewport_width: 11,
            viewport_height: 11,
            log_level: "info".to_string(),
            log_file: None,
            ticks_per_command: 1,
            print_every_frame: false,
        }
    }
}

impl ReplaySettings {
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

/// Loads settings from `path`, falling back to defaults when the file is
/// missing or does not parse.
///
/// Runs before the logger is up, so problems go to stderr.
pub fn load_settings(path: &Path) -> ReplaySettings {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Using default settings, cannot read {}: {e}", path.display());
            return ReplaySettings::default();
        }
    };

    match serde_json::from_slice::<ReplaySettings>(&bytes) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to parse settings file {}: {e}", path.display());
            ReplaySettings::default()
        }
    }
}
