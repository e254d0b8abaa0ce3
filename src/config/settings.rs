//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// CaptionMode
// ---------------------------------------------------------------------------

/// Selects the captioning engine on the platform side.
///
/// | Variant | Engine                          | Needs API credits |
/// |---------|---------------------------------|-------------------|
/// | Local   | On-server BLIP model            | No                |
/// | Cloud   | Hosted vision model (richer)    | Yes               |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CaptionMode {
    /// On-server model — short caption only.
    Local,
    /// Hosted vision model — caption plus detailed description and insights.
    Cloud,
}

impl CaptionMode {
    /// Wire value sent in the multipart `mode` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Cloud => "cloud",
        }
    }
}

impl Default for CaptionMode {
    fn default() -> Self {
        Self::Cloud
    }
}

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

/// Settings for the platform HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the platform backend.
    pub base_url: String,
    /// Maximum seconds to wait for a response — `None` leaves the
    /// transport's own default in place.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            timeout_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// OcrConfig
// ---------------------------------------------------------------------------

/// Settings for the text-extraction operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Language codes passed to the recognizer (e.g. `["en", "es"]`).
    pub languages: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".into()],
        }
    }
}

// ---------------------------------------------------------------------------
// CaptionConfig
// ---------------------------------------------------------------------------

/// Settings for the captioning operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Which captioning engine to request.
    pub mode: CaptionMode,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            mode: CaptionMode::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// TranslationConfig
// ---------------------------------------------------------------------------

/// Settings for the translation operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Default target language as an ISO-639-1 code.
    pub target_language: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_language: "es".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-synthesis operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Voice language code sent to the synthesizer.
    pub language: String,
    /// Speaking rate in words per minute (useful range 50 – 400).
    pub rate: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en".into(),
            rate: 200,
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
/// use image_to_speech::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Platform API settings.
    pub api: ApiConfig,
    /// Text-extraction settings.
    pub ocr: OcrConfig,
    /// Captioning settings.
    pub caption: CaptionConfig,
    /// Translation settings.
    pub translation: TranslationConfig,
    /// Speech-synthesis settings.
    pub speech: SpeechConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            ocr: OcrConfig::default(),
            caption: CaptionConfig::default(),
            translation: TranslationConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
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

    /// Returns `true` when no `settings.toml` file exists yet — first-run
    /// detection used by the startup banner.
    pub fn is_first_run() -> bool {
        !AppPaths::new().settings_file.exists()
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

        // ApiConfig
        assert_eq!(original.api.base_url, loaded.api.base_url);
        assert_eq!(original.api.timeout_secs, loaded.api.timeout_secs);

        // OcrConfig
        assert_eq!(original.ocr.languages, loaded.ocr.languages);

        // CaptionConfig
        assert_eq!(original.caption.mode, loaded.caption.mode);

        // TranslationConfig
        assert_eq!(
            original.translation.target_language,
            loaded.translation.target_language
        );

        // SpeechConfig
        assert_eq!(original.speech.language, loaded.speech.language);
        assert_eq!(original.speech.rate, loaded.speech.rate);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.api.base_url, default.api.base_url);
        assert_eq!(config.ocr.languages, default.ocr.languages);
        assert_eq!(config.caption.mode, default.caption.mode);
        assert_eq!(
            config.translation.target_language,
            default.translation.target_language
        );
        assert_eq!(config.speech.rate, default.speech.rate);
    }

    /// Verify default values match the shipped backend defaults.
    #[test]
    fn default_values_match_backend() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.api.base_url, "http://localhost:8000");
        assert!(cfg.api.timeout_secs.is_none());
        assert_eq!(cfg.ocr.languages, vec!["en".to_string()]);
        assert_eq!(cfg.caption.mode, CaptionMode::Cloud);
        assert_eq!(cfg.translation.target_language, "es");
        assert_eq!(cfg.speech.language, "en");
        assert_eq!(cfg.speech.rate, 200);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.api.base_url = "http://imgspeak.example.com:9000".into();
        cfg.api.timeout_secs = Some(30);
        cfg.ocr.languages = vec!["en".into(), "fr".into()];
        cfg.caption.mode = CaptionMode::Local;
        cfg.translation.target_language = "de".into();
        cfg.speech.language = "fr".into();
        cfg.speech.rate = 150;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.api.base_url, "http://imgspeak.example.com:9000");
        assert_eq!(loaded.api.timeout_secs, Some(30));
        assert_eq!(loaded.ocr.languages, vec!["en".to_string(), "fr".to_string()]);
        assert_eq!(loaded.caption.mode, CaptionMode::Local);
        assert_eq!(loaded.translation.target_language, "de");
        assert_eq!(loaded.speech.language, "fr");
        assert_eq!(loaded.speech.rate, 150);
    }

    /// Wire values for the caption mode field.
    #[test]
    fn caption_mode_wire_values() {
        assert_eq!(CaptionMode::Local.as_str(), "local");
        assert_eq!(CaptionMode::Cloud.as_str(), "cloud");
    }
}
