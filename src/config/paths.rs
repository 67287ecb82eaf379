//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\voice-gallery\
//!   macOS:   ~/Library/Application Support/voice-gallery/
//!   Linux:   ~/.config/voice-gallery/
//!
//! Data dir (media collection + models):
//!   Windows: %LOCALAPPDATA%\voice-gallery\
//!   macOS:   ~/Library/Application Support/voice-gallery/
//!   Linux:   ~/.local/share/voice-gallery/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Default media directory scanned by the collection when the config
    /// does not name one explicitly.
    pub media_dir: PathBuf,
    /// Full path to the optional `metadata.json` next to the media files.
    pub metadata_file: PathBuf,
    /// Directory for downloaded GGML model files.
    pub models_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voice-gallery";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let media_dir = data_dir.join("media");
        let metadata_file = media_dir.join("metadata.json");
        let models_dir = data_dir.join("models");

        Self {
            config_dir,
            settings_file,
            media_dir,
            metadata_file,
            models_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.media_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .metadata_file
            .file_name()
            .is_some_and(|n| n == "metadata.json"));
    }

    #[test]
    fn metadata_file_lives_in_media_dir() {
        let paths = AppPaths::new();
        assert_eq!(
            paths.metadata_file.parent(),
            Some(paths.media_dir.as_path())
        );
    }
}
