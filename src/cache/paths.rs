// Local persistence path utilities.
// Locates the hash files and config under the platform data directories.

use std::path::PathBuf;

use directories::ProjectDirs;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "sheetsync")
}

/// Get the base data directory (~/.local/share/sheetsync on Linux).
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Get the config directory (~/.config/sheetsync on Linux).
fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path to the default config file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.json"))
}

/// Path to the address hash file for one spreadsheet.
pub fn hash_store_path(spreadsheet_id: &str) -> Option<PathBuf> {
    data_dir().map(|dir| {
        dir.join("address_hashes")
            .join(format!("{}.json", sanitize_name(spreadsheet_id)))
    })
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "default".to_string()
    } else {
        cleaned
    }
}
