//! Path utilities for cross-platform support

use std::path::{Path, PathBuf};

/// Expand a path, replacing `~` with the user's home directory
///
/// # Examples
///
/// ```
/// use tokendrop_keystore::expand_path;
/// use std::path::PathBuf;
///
/// let path = expand_path(&PathBuf::from("~/keys/signer.key"));
/// assert!(!path.starts_with("~"));
/// ```
pub fn expand_path(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Ok(stripped) = path.strip_prefix("~") {
            if let Some(home) = home_dir() {
                return home.join(stripped);
            }
        }
    }
    path.to_path_buf()
}

/// Get the user's home directory
fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

/// Get the default keystore directory for the current platform
///
/// - macOS: `~/Library/Application Support/TokenDrop/keys`
/// - Linux: `~/.local/share/tokendrop/keys`
/// - Windows: `%APPDATA%\TokenDrop\keys`
pub fn default_keystore_dir() -> PathBuf {
    data_dir().join("keys")
}

/// Get the data directory for the current platform
fn data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .map(|h| h.join("Library/Application Support/TokenDrop"))
            .unwrap_or_else(|| PathBuf::from(".tokendrop"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                home_dir()
                    .map(|h| h.join(".local/share"))
                    .unwrap_or_else(|| PathBuf::from("."))
            })
            .join("tokendrop")
    }
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("TokenDrop")
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        home_dir()
            .map(|h| h.join(".tokendrop"))
            .unwrap_or_else(|| PathBuf::from(".tokendrop"))
    }
}
