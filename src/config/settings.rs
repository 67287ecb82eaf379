//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! There is deliberately no global settings state: the loaded [`AppConfig`]
//! is owned by the application root and handed to each subsystem explicitly.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// MediaConfig
// ---------------------------------------------------------------------------

/// Settings for the media collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory scanned for images/animations.  `None` means the
    /// platform-default data directory from [`AppPaths`].
    pub media_dir: Option<PathBuf>,
    /// Optional display-name/description store.  `None` means
    /// `metadata.json` inside the media directory.
    pub metadata_file: Option<PathBuf>,
}

impl MediaConfig {
    /// Resolve the media directory, falling back to the platform default.
    pub fn media_dir(&self, paths: &AppPaths) -> PathBuf {
        self.media_dir
            .clone()
            .unwrap_or_else(|| paths.media_dir.clone())
    }

    /// Resolve the metadata file, falling back to `metadata.json` inside the
    /// resolved media directory.
    pub fn metadata_file(&self, paths: &AppPaths) -> PathBuf {
        self.metadata_file
            .clone()
            .unwrap_or_else(|| self.media_dir(paths).join("metadata.json"))
    }
}

// ---------------------------------------------------------------------------
// TimingConfig
// ---------------------------------------------------------------------------

/// Periods for the presentation loop's cooperative timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Seconds between slideshow advances.
    pub slideshow_secs: f32,
    /// Milliseconds between animation frames for multi-frame items.
    pub animation_ms: u64,
    /// Milliseconds between command-queue drain ticks.
    pub dispatch_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            slideshow_secs: 3.0,
            animation_ms: 100,
            dispatch_ms: 550,
        }
    }
}

// ---------------------------------------------------------------------------
// ListenConfig
// ---------------------------------------------------------------------------

/// Settings for voice capture and the utterance boundary detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenConfig {
    /// GGML model name / file stem (e.g. `"ggml-base.en"`).
    pub model: String,
    /// Speech language as an ISO-639-1 code, or `"auto"`.
    pub language: String,
    /// Seconds of ambient audio sampled at startup to set the noise floor.
    pub calibration_secs: f32,
    /// Seconds of trailing silence that end an utterance.
    pub silence_secs: f32,
    /// Hard cap on utterance length in seconds.
    pub max_utterance_secs: f32,
    /// Lower bound for the calibrated RMS threshold, so a dead-quiet room
    /// does not produce a hair-trigger gate.
    pub threshold_floor: f32,
    /// Multiplier applied to the measured ambient RMS.
    pub threshold_factor: f32,
    /// Seconds to back off after a device/backend failure before retrying.
    pub retry_backoff_secs: f32,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            model: "ggml-base.en".into(),
            language: "en".into(),
            calibration_secs: 1.0,
            silence_secs: 0.8,
            max_utterance_secs: 6.0,
            threshold_floor: 0.01,
            threshold_factor: 2.5,
            retry_backoff_secs: 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// FetchConfig
// ---------------------------------------------------------------------------

/// Settings for the image search + download pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Result count used when a download command carries no explicit count.
    pub default_count: usize,
    /// Per-request timeout in seconds (search and each download).
    pub timeout_secs: u64,
    /// User-Agent header sent to the search provider.
    pub user_agent: String,
    /// Prefix for generated download filenames.
    pub filename_prefix: String,
    /// When set (e.g. `"jpeg"`), only responses of that image subtype are
    /// saved; `None` accepts any `image/*` payload.
    pub require_format: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_count: 5,
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            filename_prefix: "fetched_".into(),
            require_format: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeakConfig
// ---------------------------------------------------------------------------

/// Settings for spoken announcements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakConfig {
    /// Master switch; `false` silences all announcements.
    pub enabled: bool,
    /// Override the synthesis command (e.g. `"espeak-ng"`).  `None` probes
    /// the platform defaults.
    pub command: Option<String>,
}

impl Default for SpeakConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_gallery::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Media collection settings.
    pub media: MediaConfig,
    /// Presentation-loop timer periods.
    pub timing: TimingConfig,
    /// Voice capture settings.
    pub listen: ListenConfig,
    /// Image search/download settings.
    pub fetch: FetchConfig,
    /// Spoken announcement settings.
    pub speak: SpeakConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(original, loaded);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    /// Verify default values match the design constants.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert!(cfg.media.media_dir.is_none());
        assert!((cfg.timing.slideshow_secs - 3.0).abs() < f32::EPSILON);
        assert_eq!(cfg.timing.animation_ms, 100);
        assert_eq!(cfg.timing.dispatch_ms, 550);
        assert_eq!(cfg.listen.language, "en");
        assert!((cfg.listen.max_utterance_secs - 6.0).abs() < f32::EPSILON);
        assert_eq!(cfg.fetch.default_count, 5);
        assert_eq!(cfg.fetch.timeout_secs, 10);
        assert!(cfg.fetch.require_format.is_none());
        assert!(cfg.speak.enabled);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.media.media_dir = Some(PathBuf::from("/tmp/pictures"));
        cfg.timing.slideshow_secs = 5.0;
        cfg.listen.language = "de".into();
        cfg.fetch.default_count = 12;
        cfg.fetch.require_format = Some("jpeg".into());
        cfg.speak.enabled = false;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
    }

    /// Media paths resolve against `AppPaths` when not set explicitly.
    #[test]
    fn media_paths_fall_back_to_app_paths() {
        let paths = AppPaths::new();
        let cfg = MediaConfig::default();

        assert_eq!(cfg.media_dir(&paths), paths.media_dir);
        assert_eq!(
            cfg.metadata_file(&paths),
            paths.media_dir.join("metadata.json")
        );

        let explicit = MediaConfig {
            media_dir: Some(PathBuf::from("/somewhere/else")),
            metadata_file: None,
        };
        assert_eq!(
            explicit.metadata_file(&paths),
            PathBuf::from("/somewhere/else/metadata.json")
        );
    }
}
