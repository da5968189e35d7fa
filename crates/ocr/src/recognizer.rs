use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Language set handed to Tesseract; energy labels come from many markets.
pub const DEFAULT_LANGUAGES: &str = "eng+hin+tam+tel+fra+deu+spa+ita+por+jpn+kor+ara";

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR engine did not finish within {0:?}")]
    Timeout(Duration),
    #[error("OCR engine not available: {0}")]
    NotAvailable(String),
}

/// Abstraction over an OCR backend.
/// Implementations accept PNG image bytes and return the recognized text.
///
/// Callers bound the call with a timeout by dropping the future, so a backend
/// must release whatever it started (child processes included) when dropped.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    async fn recognize(&self, image_bytes: Vec<u8>) -> Result<String, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string — useful for unit testing the extraction pipeline
/// without requiring Tesseract to be installed.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl OcrBackend for MockRecognizer {
    async fn recognize(&self, _image_bytes: Vec<u8>) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Tesseract command-line backend ────────────────────────────────────────────

/// Pipes the image into the `tesseract` binary (`tesseract stdin stdout -l <langs>`).
///
/// The child is spawned with `kill_on_drop`, so an abandoned call kills it.
pub struct TesseractCli {
    program: PathBuf,
    languages: String,
}

impl TesseractCli {
    pub fn new(program: impl Into<PathBuf>, languages: &str) -> Self {
        Self {
            program: program.into(),
            languages: languages.to_string(),
        }
    }
}

#[async_trait]
impl OcrBackend for TesseractCli {
    async fn recognize(&self, image_bytes: Vec<u8>) -> Result<String, OcrError> {
        let mut child = Command::new(&self.program)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    OcrError::NotAvailable(format!("{} not found", self.program.display()))
                }
                _ => OcrError::Engine(format!("failed to start tesseract: {e}")),
            })?;

        // Closing stdin marks the end of the image.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&image_bytes)
                .await
                .map_err(|e| OcrError::Engine(format!("failed to pipe image: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ── Tesseract library backend (optional, gated behind `tesseract` feature) ────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use async_trait::async_trait;
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self {
                data_path,
                lang: lang.to_string(),
            }
        }
    }

    impl TesseractRecognizer {
        fn recognize_blocking(
            data_path: Option<&str>,
            lang: &str,
            image_bytes: &[u8],
        ) -> Result<String, OcrError> {
            let mut lt =
                LepTess::new(data_path, lang).map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }

    // In-process recognition cannot be interrupted: on timeout the blocking
    // thread runs to completion and its result is discarded.
    #[async_trait]
    impl OcrBackend for TesseractRecognizer {
        async fn recognize(&self, image_bytes: Vec<u8>) -> Result<String, OcrError> {
            let data_path = self.data_path.clone();
            let lang = self.lang.clone();
            tokio::task::spawn_blocking(move || {
                Self::recognize_blocking(data_path.as_deref(), &lang, &image_bytes)
            })
            .await
            .map_err(|e| OcrError::Engine(e.to_string()))?
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_preset_text() {
        let r = MockRecognizer::new("ENERGY\n250 kWh/annum");
        assert_eq!(
            r.recognize(b"fake image data".to_vec()).await.unwrap(),
            "ENERGY\n250 kWh/annum"
        );
    }

    #[tokio::test]
    async fn mock_ignores_image_content() {
        let r = MockRecognizer::new("hello");
        assert_eq!(r.recognize(b"anything".to_vec()).await.unwrap(), "hello");
        assert_eq!(r.recognize(Vec::new()).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn missing_cli_binary_is_not_available() {
        let r = TesseractCli::new("/nonexistent/wattcompare/tesseract", "eng");
        let err = r.recognize(b"png".to_vec()).await.unwrap_err();
        assert!(matches!(err, OcrError::NotAvailable(_)), "got {err:?}");
    }

    #[test]
    fn timeout_error_names_the_limit() {
        let err = OcrError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "OCR engine did not finish within 30s");
    }
}
