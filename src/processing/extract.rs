use crate::engines::{EnhancementMode, TextRecognizer};
use image::GrayImage;
use imageproc::contrast::{equalize_histogram, threshold};

/// Below this length an OCR pass is considered to have found nothing useful
/// and the next enhancement variant is tried.
const MIN_USEFUL_TEXT_LEN: usize = 10;

/// Fixed global binarization threshold for the last-resort pass.
const BINARY_THRESHOLD: u8 = 127;

/// Runs OCR on up to three enhancement variants of one image, in fixed
/// order, keeping the longest text found:
/// 1. the grayscale image as-is (best for clean scans),
/// 2. histogram equalization (low contrast, shadows),
/// 3. global binarization (faint text).
///
/// A short result is not a failure here; length policy lives downstream.
/// An OCR engine fault degrades to empty text for that variant only.
pub struct MultiPassExtractor;

impl MultiPassExtractor {
    pub fn extract(recognizer: &dyn TextRecognizer, image: &GrayImage) -> String {
        let mut best = Self::run_pass(recognizer, image, EnhancementMode::Plain);

        if best.len() < MIN_USEFUL_TEXT_LEN {
            let enhanced = equalize_histogram(image);
            let text = Self::run_pass(recognizer, &enhanced, EnhancementMode::ContrastEnhanced);
            if text.len() > best.len() {
                best = text;
            }
        }

        if best.len() < MIN_USEFUL_TEXT_LEN {
            let binarized = threshold(image, BINARY_THRESHOLD);
            let text = Self::run_pass(recognizer, &binarized, EnhancementMode::Binarized);
            if text.len() > best.len() {
                best = text;
            }
        }

        best
    }

    fn run_pass(
        recognizer: &dyn TextRecognizer,
        image: &GrayImage,
        mode: EnhancementMode,
    ) -> String {
        match recognizer.recognize(image, mode) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("OCR {:?} pass failed: {}", mode, e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::KycError;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct ScriptedRecognizer {
        responses: RefCell<VecDeque<Result<String, KycError>>>,
        calls: RefCell<Vec<EnhancementMode>>,
    }

    impl ScriptedRecognizer {
        fn new(responses: Vec<Result<String, KycError>>) -> Self {
            ScriptedRecognizer {
                responses: RefCell::new(responses.into()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextRecognizer for ScriptedRecognizer {
        fn recognize(
            &self,
            _image: &GrayImage,
            mode: EnhancementMode,
        ) -> Result<String, KycError> {
            self.calls.borrow_mut().push(mode);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn blank_image() -> GrayImage {
        GrayImage::new(32, 16)
    }

    #[test]
    fn test_short_circuits_when_first_pass_is_long_enough() {
        let recognizer =
            ScriptedRecognizer::new(vec![Ok("PERMANENT ACCOUNT NUMBER".to_string())]);
        let text = MultiPassExtractor::extract(&recognizer, &blank_image());
        assert_eq!(text, "PERMANENT ACCOUNT NUMBER");
        assert_eq!(*recognizer.calls.borrow(), vec![EnhancementMode::Plain]);
    }

    #[test]
    fn test_longer_later_pass_replaces_short_first_pass() {
        let recognizer = ScriptedRecognizer::new(vec![
            Ok("abc".to_string()),
            Ok("GOVT OF INDIA ID".to_string()),
        ]);
        let text = MultiPassExtractor::extract(&recognizer, &blank_image());
        assert_eq!(text, "GOVT OF INDIA ID");
        assert_eq!(
            *recognizer.calls.borrow(),
            vec![EnhancementMode::Plain, EnhancementMode::ContrastEnhanced]
        );
    }

    #[test]
    fn test_shorter_later_pass_does_not_replace_best() {
        let recognizer = ScriptedRecognizer::new(vec![
            Ok("abcdefg".to_string()),
            Ok("ab".to_string()),
            Ok("a".to_string()),
        ]);
        let text = MultiPassExtractor::extract(&recognizer, &blank_image());
        assert_eq!(text, "abcdefg");
    }

    #[test]
    fn test_engine_fault_degrades_to_empty_for_that_variant() {
        let recognizer = ScriptedRecognizer::new(vec![
            Err(KycError::Ocr("engine crashed".to_string())),
            Ok("DATE OF BIRTH 01/01/1990".to_string()),
        ]);
        let text = MultiPassExtractor::extract(&recognizer, &blank_image());
        assert_eq!(text, "DATE OF BIRTH 01/01/1990");
    }

    #[test]
    fn test_all_passes_failing_yields_empty_text() {
        let recognizer = ScriptedRecognizer::new(vec![
            Err(KycError::Ocr("x".to_string())),
            Err(KycError::Ocr("y".to_string())),
            Err(KycError::Ocr("z".to_string())),
        ]);
        let text = MultiPassExtractor::extract(&recognizer, &blank_image());
        assert_eq!(text, "");
    }
}
