// src/infra/paths.rs — Config and data path management
//
// All paths respect the WAYFARE_HOME environment variable for isolation.
// When unset, config lives in ~/.wayfare/ and saved runs in ~/.wayfare/runs/.

use std::path::PathBuf;

/// Returns the WAYFARE_HOME override, if set.
fn wayfare_home() -> Option<PathBuf> {
    std::env::var_os("WAYFARE_HOME").map(PathBuf::from)
}

/// Home directory, or the current directory when it cannot be determined.
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $WAYFARE_HOME/ or ~/.wayfare/
pub fn config_dir() -> PathBuf {
    if let Some(home) = wayfare_home() {
        return home;
    }
    dirs_home().join(".wayfare")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Directory where comparison runs are saved by default
pub fn runs_dir() -> PathBuf {
    config_dir().join("runs")
}

/// Default file name for a saved run.
pub fn run_file_path(run_id: &uuid::Uuid) -> PathBuf {
    runs_dir().join(format!("run-{}.json", run_id.simple()))
}
