pub mod extract;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;

pub use extract::Extractor;
pub use pipeline::{LabelPipeline, PipelineError};
pub use preprocess::{bilateral_filter, prepare_for_ocr_from_bytes, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, TesseractCli, DEFAULT_LANGUAGES};
pub use types::{EnergyQuantity, EnergyReading, EnergyUnit};
