pub mod face;
pub mod pdf;
pub mod tesseract;

pub use self::face::CommandFaceVerifier;
pub use self::pdf::PdftoppmRenderer;
pub use self::tesseract::TesseractRecognizer;

use crate::utils::{FaceError, KycError};
use image::GrayImage;
use std::path::{Path, PathBuf};

/// Which enhancement was applied to the image before OCR. The extractor
/// applies the enhancement itself; the mode is passed through as a hint so
/// engines (and test stubs) can tell the passes apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhancementMode {
    Plain,
    ContrastEnhanced,
    Binarized,
}

/// Optical character recognition over a grayscale image.
pub trait TextRecognizer {
    fn recognize(&self, image: &GrayImage, mode: EnhancementMode) -> Result<String, KycError>;
}

/// Rasterizes page 1 of a paged document at high resolution and returns the
/// path of the rendered image.
pub trait PageRenderer {
    fn render_first_page(&self, document: &Path) -> Result<PathBuf, KycError>;
}

/// Outcome of comparing two face images. Lower distance means more similar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceComparison {
    pub verified: bool,
    pub distance: f64,
    pub threshold: f64,
}

/// Face similarity between a document photo and a selfie, with strict face
/// presence required in both images.
pub trait FaceVerifier {
    fn compare(&self, document: &Path, selfie: &Path) -> Result<FaceComparison, FaceError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub label: String,
    pub confidence: f32,
}

/// Advisory object detection over the document image. Failures never alter
/// the verdict.
pub trait ObjectDetector {
    fn detect(&self, image: &Path) -> Result<Vec<DetectedObject>, KycError>;
}
