// src/infra/paths.rs — Config path resolution
//
// BIOASTRA_HOME overrides everything. Otherwise the platform config
// directory is used (~/.config/bioastra on Linux).

use directories::ProjectDirs;
use std::path::PathBuf;

fn bioastra_home() -> Option<PathBuf> {
    std::env::var_os("BIOASTRA_HOME").map(PathBuf::from)
}

/// Configuration directory, if one can be determined.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(home) = bioastra_home() {
        return Some(home);
    }
    ProjectDirs::from("", "", "bioastra").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default config file path.
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
