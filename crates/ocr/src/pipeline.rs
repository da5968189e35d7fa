use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinError;

use crate::extract::Extractor;
use crate::preprocess;
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::EnergyReading;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("Worker task failed: {0}")]
    Join(#[from] JoinError),
}

/// Orchestrates: preprocess → OCR (bounded by a timeout) → unit normalization.
///
/// The filter is CPU-bound and runs on tokio's blocking pool. On timeout the
/// OCR future is dropped, which kills an external engine process.
#[derive(Clone)]
pub struct LabelPipeline {
    recognizer: Arc<dyn OcrBackend>,
    ocr_timeout: Duration,
}

impl LabelPipeline {
    pub fn new(recognizer: Arc<dyn OcrBackend>, ocr_timeout: Duration) -> Self {
        Self {
            recognizer,
            ocr_timeout,
        }
    }

    /// Read an energy figure off an uploaded label photo.
    pub async fn process_bytes(&self, data: Vec<u8>) -> Result<EnergyReading, PipelineError> {
        // 1. Grayscale + denoise.
        let image_bytes =
            tokio::task::spawn_blocking(move || preprocess::prepare_for_ocr_from_bytes(&data))
                .await??;

        // 2. Run OCR. A hung engine must not hold the request forever.
        let ocr = self.recognizer.recognize(image_bytes);
        let ocr_text = match tokio::time::timeout(self.ocr_timeout, ocr).await {
            Ok(text) => text?,
            Err(_) => {
                tracing::warn!(timeout = ?self.ocr_timeout, "OCR engine timed out");
                return Err(OcrError::Timeout(self.ocr_timeout).into());
            }
        };

        // 3. Extract and annualize.
        let reading = Extractor::extract(&ocr_text);
        tracing::debug!(
            energy_kwh = ?reading.energy_kwh,
            chars = reading.raw_text.len(),
            "label processed"
        );
        Ok(reading)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{MockRecognizer, TesseractCli};
    use async_trait::async_trait;
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(4, 4, |_, _| Luma([200u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    struct SlowRecognizer(Duration);

    #[async_trait]
    impl OcrBackend for SlowRecognizer {
        async fn recognize(&self, _image_bytes: Vec<u8>) -> Result<String, OcrError> {
            tokio::time::sleep(self.0).await;
            Ok("100 kwh".into())
        }
    }

    struct BrokenRecognizer;

    #[async_trait]
    impl OcrBackend for BrokenRecognizer {
        async fn recognize(&self, _image_bytes: Vec<u8>) -> Result<String, OcrError> {
            Err(OcrError::Engine("tessdata missing".into()))
        }
    }

    fn pipeline(backend: impl OcrBackend + 'static) -> LabelPipeline {
        LabelPipeline::new(Arc::new(backend), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn process_bytes_extracts_energy() {
        let p = pipeline(MockRecognizer::new("ENERGIA\n0.5 kW\nA+"));
        let reading = p.process_bytes(tiny_png()).await.unwrap();
        assert_eq!(reading.energy_kwh, Some(4380.0));
        assert_eq!(reading.raw_text, "ENERGIA\n0.5 kW\nA+");
    }

    #[tokio::test]
    async fn unrecognized_text_is_not_an_error() {
        let p = pipeline(MockRecognizer::new("nothing useful"));
        let reading = p.process_bytes(tiny_png()).await.unwrap();
        assert_eq!(reading.energy_kwh, None);
    }

    #[tokio::test]
    async fn malformed_image_fails_preprocessing() {
        let p = pipeline(MockRecognizer::new("250 kwh"));
        let err = p.process_bytes(b"not an image".to_vec()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Preprocess(_)));
    }

    #[tokio::test]
    async fn slow_engine_times_out() {
        let p = LabelPipeline::new(
            Arc::new(SlowRecognizer(Duration::from_millis(300))),
            Duration::from_millis(20),
        );
        let err = p.process_bytes(tiny_png()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Ocr(OcrError::Timeout(_))), "got {err:?}");
    }

    #[tokio::test]
    async fn engine_failure_is_typed() {
        let err = pipeline(BrokenRecognizer).process_bytes(tiny_png()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Ocr(OcrError::Engine(_))));
    }

    /// Reports whether `pid` is still a live process. A zombie awaiting reaping
    /// has already been killed and counts as gone.
    #[cfg(target_os = "linux")]
    fn process_alive(pid: &str) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .and_then(|rest| rest.split_whitespace().next())
                .is_some_and(|state| state != "Z" && state != "X"),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn timed_out_engine_process_is_killed() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("engine.pid");
        let engine = dir.path().join("fake-tesseract");
        std::fs::write(
            &engine,
            format!(
                "#!/bin/sh\necho $$ > '{}'\ncat > /dev/null\nexec sleep 30\n",
                pid_file.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&engine, std::fs::Permissions::from_mode(0o755)).unwrap();

        let p = LabelPipeline::new(
            Arc::new(TesseractCli::new(&engine, "eng")),
            Duration::from_millis(500),
        );
        let err = p.process_bytes(tiny_png()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Ocr(OcrError::Timeout(_))), "got {err:?}");

        tokio::time::sleep(Duration::from_millis(200)).await;
        let pid = std::fs::read_to_string(&pid_file).unwrap();
        assert!(!process_alive(pid.trim()), "engine {} still running", pid.trim());
    }
}
