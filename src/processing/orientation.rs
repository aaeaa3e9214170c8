use crate::engines::TextRecognizer;
use crate::processing::extract::MultiPassExtractor;
use crate::utils::KycError;
use crate::validation::{count_keywords, letters_only, token_set_ratio};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use std::path::{Path, PathBuf};

/// OCR works best around this width; smaller images are upscaled (digital
/// zoom), larger ones downscaled.
const TARGET_WIDTH: u32 = 1600;

/// Name-match score at which an extraction pass is accepted outright and no
/// further passes run.
const ACCEPT_SCORE: u8 = 60;

/// The text the pipeline settles on, with the (possibly rotated) image the
/// face stage should use.
#[derive(Debug)]
pub struct ResolvedText {
    pub text: String,
    pub name_score: u8,
    pub image_path: PathBuf,
}

struct OrientationCandidate {
    angle: u32,
    text: String,
    name_score: u8,
    keyword_score: usize,
}

/// Picks the extraction pass and image rotation that yields the most
/// document-like text. Tries a width-normalized pass, then the raw image,
/// then a rotation search over 90/180/270 degrees.
pub struct OrientationResolver;

impl OrientationResolver {
    pub fn resolve(
        recognizer: &dyn TextRecognizer,
        image: &DynamicImage,
        source_path: &Path,
        claimed_name: &str,
    ) -> Result<ResolvedText, KycError> {
        let gray = image.to_luma8();

        let optimized = Self::normalize_width(&gray);
        let text_opt = MultiPassExtractor::extract(recognizer, &optimized);
        let score_opt = Self::name_score(&text_opt, claimed_name);
        log::info!(
            "Optimized OCR score: {}% (text: {:.30}...)",
            score_opt,
            text_opt
        );

        if score_opt >= ACCEPT_SCORE {
            return Ok(ResolvedText {
                text: text_opt,
                name_score: score_opt,
                image_path: source_path.to_path_buf(),
            });
        }

        log::info!("Score too low ({}%), retrying raw image", score_opt);
        let text_raw = MultiPassExtractor::extract(recognizer, &gray);
        let score_raw = Self::name_score(&text_raw, claimed_name);
        log::info!("Raw OCR score: {}% (text: {:.30}...)", score_raw, text_raw);

        if score_raw >= ACCEPT_SCORE {
            return Ok(ResolvedText {
                text: text_raw,
                name_score: score_raw,
                image_path: source_path.to_path_buf(),
            });
        }

        // Rotation search, seeded from the raw 0-degree result. Keyword
        // legibility dominates the name score: when the claimed name matches
        // nothing (identity theft), every rotation scores near zero on the
        // name, and only legibility tells the upright text from gibberish.
        let mut best = OrientationCandidate {
            angle: 0,
            keyword_score: count_keywords(&text_raw),
            name_score: score_raw,
            text: text_raw,
        };

        for angle in [90u32, 180, 270] {
            log::info!("Retrying rotation {}...", angle);
            let rotated = Self::rotate_gray(&gray, angle);
            let text = MultiPassExtractor::extract(recognizer, &rotated);
            let name_score = Self::name_score(&text, claimed_name);
            let keyword_score = count_keywords(&text);
            log::info!(
                "Angle {} score: {}% keywords: {} (text: {:.20}...)",
                angle,
                name_score,
                keyword_score,
                text
            );

            if keyword_score > best.keyword_score
                || (keyword_score == best.keyword_score && name_score > best.name_score)
            {
                best = OrientationCandidate {
                    angle,
                    text,
                    name_score,
                    keyword_score,
                };
            }
        }

        // A sideways document photo fails face detection downstream, so the
        // winning rotation is persisted and replaces the working image.
        let image_path = if best.angle != 0 {
            log::info!(
                "Saving rotated image ({} deg) for face verification",
                best.angle
            );
            let rotated = match best.angle {
                90 => image.rotate90(),
                180 => image.rotate180(),
                _ => image.rotate270(),
            };
            let mut rotated_path = source_path.as_os_str().to_owned();
            rotated_path.push("_rotated.jpg");
            let rotated_path = PathBuf::from(rotated_path);
            rotated.save(&rotated_path).map_err(|e| {
                KycError::ImageProcessing(format!("Failed to save rotated image: {}", e))
            })?;
            rotated_path
        } else {
            source_path.to_path_buf()
        };

        Ok(ResolvedText {
            text: best.text,
            name_score: best.name_score,
            image_path,
        })
    }

    /// Token-set similarity of the claimed name against the extracted text,
    /// both reduced to letters and spaces.
    pub fn name_score(text: &str, claimed_name: &str) -> u8 {
        if text.is_empty() || claimed_name.is_empty() {
            return 0;
        }
        token_set_ratio(&letters_only(claimed_name), &letters_only(text))
    }

    fn rotate_gray(gray: &GrayImage, angle: u32) -> GrayImage {
        match angle {
            90 => imageops::rotate90(gray),
            180 => imageops::rotate180(gray),
            _ => imageops::rotate270(gray),
        }
    }

    fn normalize_width(gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return gray.clone();
        }
        let scale = TARGET_WIDTH as f32 / width as f32;
        let new_height = ((height as f32 * scale).round() as u32).max(1);
        // Smooth interpolation when blowing the image up, area-style when
        // shrinking it.
        let filter = if scale > 1.0 {
            FilterType::Triangle
        } else {
            FilterType::Lanczos3
        };
        imageops::resize(gray, TARGET_WIDTH, new_height, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::EnhancementMode;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct ScriptedRecognizer {
        responses: RefCell<VecDeque<String>>,
        call_count: RefCell<usize>,
    }

    impl ScriptedRecognizer {
        fn new(responses: &[&str]) -> Self {
            ScriptedRecognizer {
                responses: RefCell::new(responses.iter().map(|s| s.to_string()).collect()),
                call_count: RefCell::new(0),
            }
        }
    }

    impl TextRecognizer for ScriptedRecognizer {
        fn recognize(
            &self,
            _image: &GrayImage,
            _mode: EnhancementMode,
        ) -> Result<String, KycError> {
            *self.call_count.borrow_mut() += 1;
            Ok(self.responses.borrow_mut().pop_front().unwrap_or_default())
        }
    }

    fn test_image(dir: &tempfile::TempDir) -> (DynamicImage, PathBuf) {
        let image = DynamicImage::new_rgb8(24, 12);
        let path = dir.path().join("id.png");
        image.save(&path).unwrap();
        (image, path)
    }

    #[test]
    fn test_accepts_optimized_pass_on_good_score() {
        let dir = tempfile::tempdir().unwrap();
        let (image, path) = test_image(&dir);
        let recognizer = ScriptedRecognizer::new(&["JOHN DOE GOVT OF INDIA"]);

        let resolved =
            OrientationResolver::resolve(&recognizer, &image, &path, "John Doe").unwrap();

        assert_eq!(resolved.text, "JOHN DOE GOVT OF INDIA");
        assert_eq!(resolved.name_score, 100);
        assert_eq!(resolved.image_path, path);
        assert_eq!(*recognizer.call_count.borrow(), 1);
    }

    #[test]
    fn test_legibility_beats_spurious_name_score() {
        let dir = tempfile::tempdir().unwrap();
        let (image, path) = test_image(&dir);
        // Optimized and raw passes read gibberish; 90 degrees happens to
        // score a perfect name match on keyword-free text, while 180 degrees
        // reads genuine document boilerplate with a different name.
        let recognizer = ScriptedRecognizer::new(&[
            "qqqq wwww eeee rrrr",
            "zzzz xxxx cccc vvvv",
            "JOHN DOE JOHN DOE",
            "INCOME TAX GOVT OF INDIA PERMANENT ACCOUNT NUMBER RAHUL SHARMA",
            "mmmm nnnn bbbb llll",
        ]);

        let resolved =
            OrientationResolver::resolve(&recognizer, &image, &path, "John Doe").unwrap();

        assert!(resolved.text.contains("RAHUL SHARMA"));
        assert!(resolved.name_score < 40);
        // The winning angle was non-zero, so a rotated image was persisted
        // and replaces the working image.
        assert_ne!(resolved.image_path, path);
        assert!(resolved.image_path.exists());
    }

    #[test]
    fn test_keyword_tie_broken_by_name_score() {
        let dir = tempfile::tempdir().unwrap();
        let (image, path) = test_image(&dir);
        let recognizer = ScriptedRecognizer::new(&[
            "aaaa bbbb cccc dddd",
            "TAX qq john",
            "TAX mm john doe",
            "qqqq wwww eeee rrrr",
            "ssss tttt uuuu hhhh",
        ]);

        let resolved =
            OrientationResolver::resolve(&recognizer, &image, &path, "John Doe").unwrap();

        assert_eq!(resolved.text, "TAX mm john doe");
        assert_eq!(resolved.name_score, 100);
    }

    #[test]
    fn test_raw_zero_degrees_result_is_reused_as_seed() {
        let dir = tempfile::tempdir().unwrap();
        let (image, path) = test_image(&dir);
        // Raw pass has the most keywords; no rotation improves on it, so no
        // rotated image is written and only five OCR passes run in total.
        let recognizer = ScriptedRecognizer::new(&[
            "aaaa bbbb cccc dddd",
            "INCOME TAX GOVT INDIA somebody else",
            "qqqq wwww eeee rrrr",
            "zzzz xxxx cccc vvvv",
            "mmmm nnnn bbbb llll",
        ]);

        let resolved =
            OrientationResolver::resolve(&recognizer, &image, &path, "John Doe").unwrap();

        assert_eq!(resolved.text, "INCOME TAX GOVT INDIA somebody else");
        assert_eq!(resolved.image_path, path);
        assert_eq!(*recognizer.call_count.borrow(), 5);
    }
}
