//! Configuration module for Image-to-Speech.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each operation,
//! `AppPaths` for cross-platform data directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    ApiConfig, AppConfig, CaptionConfig, CaptionMode, OcrConfig, SpeechConfig, TranslationConfig,
};
