//! Tesseract invoked as an external process.

use async_trait::async_trait;
use image::DynamicImage;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace};

use super::{OcrEngine, Result, validate_image};
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Runs `tesseract <image> stdout -l <lang>` on a grayscale PNG of the page.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    executable: Option<PathBuf>,
    language: String,
    timeout: Option<Duration>,
}

impl TesseractEngine {
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self {
            executable,
            language: "eng".to_string(),
            timeout: None,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        let engine = Self::new(config.tesseract_path.clone()).with_language(config.language.clone());
        if config.timeout_secs > 0 {
            engine.with_timeout(Duration::from_secs(config.timeout_secs))
        } else {
            engine
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn executable(&self) -> Result<&PathBuf> {
        self.executable
            .as_ref()
            .ok_or_else(|| OcrError::Unavailable("tesseract path not configured".to_string()))
    }

    async fn run(&self, executable: &PathBuf, image: &DynamicImage) -> Result<String> {
        let workdir = tempfile::tempdir()
            .map_err(|e| OcrError::Recognition(format!("failed to create temp dir: {}", e)))?;
        let input = workdir.path().join("page.png");

        let gray = image.to_luma8();
        let target = input.clone();
        tokio::task::spawn_blocking(move || gray.save(&target))
            .await
            .map_err(|e| OcrError::Recognition(e.to_string()))?
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let output = Command::new(executable)
            .arg(&input)
            .arg("stdout")
            .args(["-l", &self.language])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    OcrError::Unavailable(format!("{} not found", executable.display()))
                }
                _ => OcrError::Recognition(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!("tesseract produced {} bytes", text.len());
        Ok(text)
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn is_available(&self) -> bool {
        let Some(executable) = &self.executable else {
            return false;
        };
        match Command::new(executable).arg("--version").output().await {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("tesseract at {} not usable: {}", executable.display(), e);
                false
            }
        }
    }

    async fn recognize(&self, image: &DynamicImage) -> Result<String> {
        validate_image(image)?;
        let executable = self.executable()?;

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(executable, image))
                .await
                .map_err(|_| OcrError::Timeout(limit.as_secs()))?,
            None => self.run(executable, image).await,
        }
    }
}
