//! Path utilities for locating files checked into the workspace.

use std::path::PathBuf;

/// Returns the workspace root directory.
///
/// Derived from this crate's manifest directory (`crates/test-utils`).
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// The shipped `config/` directory.
pub fn workspace_config_dir() -> PathBuf {
    workspace_root().join("config")
}

/// The shipped provider definitions under `config/providers/`.
pub fn workspace_providers_dir() -> PathBuf {
    workspace_config_dir().join("providers")
}
