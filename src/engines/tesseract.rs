use crate::engines::{EnhancementMode, TextRecognizer};
use crate::utils::KycError;
use image::GrayImage;
use tesseract::Tesseract;

/// Tesseract-backed recognizer. The engine reads from a file, so the image
/// is written to a temporary PNG for the duration of the call.
pub struct TesseractRecognizer {
    language: String,
}

impl TesseractRecognizer {
    pub fn new() -> Self {
        TesseractRecognizer {
            language: "eng".to_string(),
        }
    }

    pub fn with_language(language: &str) -> Self {
        TesseractRecognizer {
            language: language.to_string(),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &GrayImage, mode: EnhancementMode) -> Result<String, KycError> {
        log::debug!(
            "Running tesseract on {}x{} image ({:?} pass)",
            image.width(),
            image.height(),
            mode
        );

        let temp_file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .map_err(|e| KycError::Ocr(format!("Failed to create temp file: {}", e)))?;

        image
            .save(temp_file.path())
            .map_err(|e| KycError::Ocr(format!("Failed to write temp image: {}", e)))?;

        let image_path_str = temp_file
            .path()
            .to_str()
            .ok_or_else(|| KycError::Ocr("Failed to convert path to string".to_string()))?;

        let text = Tesseract::new(None, Some(self.language.as_str()))
            .map_err(|e| KycError::Ocr(format!("Tesseract init error: {}", e)))?
            .set_image(image_path_str)
            .map_err(|e| KycError::Ocr(format!("Tesseract set image error: {}", e)))?
            .get_text()
            .map_err(|e| KycError::Ocr(format!("Tesseract error: {}", e)))?;

        // Tesseract keeps line structure; the pipeline wants one flowing block.
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}
