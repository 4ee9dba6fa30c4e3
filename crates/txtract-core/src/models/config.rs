//! Configuration structures for the extraction pipeline.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the txtract pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Escalation and normalization settings.
    pub extraction: ExtractionConfig,

    /// Page rasterization settings.
    pub render: RenderConfig,

    /// OCR engine settings.
    pub ocr: OcrConfig,

    /// Vision model settings.
    pub vision: VisionConfig,
}

/// Escalation and normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum deduplicated yield before a PDF strategy is considered enough.
    pub yield_threshold: usize,

    /// Year used when a statement carries no year at all.
    /// Unset means the current processing year.
    pub default_year: Option<i32>,

    /// Maximum pages rasterized per document (0 = unlimited).
    pub max_pages: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            yield_threshold: 3,
            default_year: None,
            max_pages: 0,
        }
    }
}

impl ExtractionConfig {
    /// The configured default year, or the year of the system clock.
    pub fn processing_year(&self) -> i32 {
        self.default_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

/// Page rasterization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// `pdftoppm` executable.
    pub pdftoppm_path: PathBuf,

    /// DPI for pages sent to OCR.
    pub ocr_dpi: u32,

    /// DPI for pages sent to the vision model.
    pub vision_dpi: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pdftoppm_path: PathBuf::from("pdftoppm"),
            ocr_dpi: 300,
            vision_dpi: 150,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable. Unset disables the OCR strategy.
    pub tesseract_path: Option<PathBuf>,

    /// Tesseract language code.
    pub language: String,

    /// Per-page timeout in seconds (0 = no timeout).
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: Some(PathBuf::from("/usr/local/bin/tesseract")),
            language: "eng".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Vision model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// API key. Takes precedence over `api_key_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable consulted when `api_key` is unset.
    pub api_key_env: String,

    /// Model name.
    pub model: String,

    /// Base URL of the generative language API.
    pub endpoint: String,

    /// Per-page timeout in seconds (0 = no timeout).
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-2.0-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 90,
        }
    }
}

impl VisionConfig {
    /// Resolve the API key from config or environment. Blank keys count as missing.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"extraction": {"default_year": 2024}}"#).unwrap();
        assert_eq!(config.extraction.default_year, Some(2024));
        assert_eq!(config.extraction.yield_threshold, 3);
        assert_eq!(config.render.ocr_dpi, 300);
        assert_eq!(config.render.vision_dpi, 150);
    }

    #[test]
    fn test_processing_year_prefers_injected_value() {
        let config = ExtractionConfig {
            default_year: Some(2019),
            ..Default::default()
        };
        assert_eq!(config.processing_year(), 2019);
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = VisionConfig {
            api_key: Some("  ".to_string()),
            api_key_env: "TXTRACT_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolved_api_key(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = PipelineConfig::default();
        config.extraction.yield_threshold = 5;
        config.ocr.tesseract_path = None;
        config.save(&path).unwrap();

        let loaded = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.yield_threshold, 5);
        assert_eq!(loaded.ocr.tesseract_path, None);
    }
}
