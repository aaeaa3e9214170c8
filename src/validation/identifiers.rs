use crate::utils::KycError;
use crate::validation::fuzzy::{partial_ratio, strip_whitespace};
use crate::validation::patterns::PAN_PATTERN;
use regex::Regex;

/// Header/boilerplate words stripped from OCR text before showing a
/// name-mismatch snippet, so the visible text is the printed name rather
/// than document headers.
const BOILERPLATE_WORDS: [&str; 17] = [
    "income",
    "tax",
    "department",
    "govt",
    "of",
    "india",
    "permanent",
    "account",
    "number",
    "government",
    "election",
    "commission",
    "identity",
    "card",
    "unique",
    "identification",
    "authority",
];

/// Finds a primary-ID-shaped (PAN) substring in the extracted text.
pub fn find_primary_id(text: &str) -> Option<String> {
    PAN_PATTERN.find(text).map(|m| m.as_str().to_string())
}

/// Three-tier secondary-ID check against the OCR text. Each tier is only
/// attempted when the previous one fails:
/// 1. exact substring match after stripping all whitespace from both sides,
/// 2. a whitespace-tolerant regex built from the claim's characters, run
///    against the unstripped text (OCR often splits digit groups),
/// 3. partial-ratio fuzzy fallback.
pub fn secondary_id_score(claimed: &str, full_text: &str) -> Result<u8, KycError> {
    let claim = strip_whitespace(claimed);
    let clean_text = strip_whitespace(full_text);

    if clean_text.contains(&claim) {
        log::info!("Secondary ID found via exact match");
        return Ok(100);
    }

    let flexible_pattern: String = claim
        .chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect::<Vec<_>>()
        .join(r"\s*");
    let flexible = Regex::new(&flexible_pattern)
        .map_err(|e| KycError::Validation(format!("Bad secondary ID pattern: {}", e)))?;
    if flexible.is_match(full_text) {
        log::info!("Secondary ID found via whitespace-tolerant pattern");
        return Ok(100);
    }

    Ok(partial_ratio(&claim, &clean_text))
}

/// Snippet of the whitespace-stripped OCR text around the claim's first four
/// characters, for secondary-ID mismatch reasons. Falls back to the first 20
/// characters when the prefix is nowhere in the text.
pub fn secondary_mismatch_snippet(claimed: &str, full_text: &str) -> String {
    let claim = strip_whitespace(claimed);
    let clean_text = strip_whitespace(full_text);
    let chars: Vec<char> = clean_text.chars().collect();
    let prefix: Vec<char> = claim.chars().take(4).collect();

    let found_at = (!prefix.is_empty() && chars.len() >= prefix.len())
        .then(|| {
            chars
                .windows(prefix.len())
                .position(|window| window == prefix.as_slice())
        })
        .flatten();

    match found_at {
        Some(idx) => {
            let start = idx.saturating_sub(5);
            let end = (start + 20).min(chars.len());
            chars[start..end].iter().collect()
        }
        None => chars.iter().take(20).collect(),
    }
}

/// Strips document boilerplate from normalized OCR text and truncates it, so
/// a name-mismatch reason shows the actual printed name instead of header
/// noise.
pub fn cleaned_name_snippet(clean_ocr_text: &str) -> String {
    let mut display = clean_ocr_text.to_string();
    for word in BOILERPLATE_WORDS {
        display = display.replace(word, "");
    }
    let collapsed = display.split_whitespace().collect::<Vec<_>>().join(" ");

    let chars: Vec<char> = collapsed.chars().collect();
    if chars.len() > 50 {
        format!("{}...", chars[..50].iter().collect::<String>())
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_primary_id() {
        assert_eq!(
            find_primary_id("PAN ABCDE1234F GOVT OF INDIA"),
            Some("ABCDE1234F".to_string())
        );
        assert_eq!(find_primary_id("no id here"), None);
    }

    #[test]
    fn test_secondary_exact_match_scores_100() {
        let score = secondary_id_score("123456789012", "Aadhaar No 123456789012 Male").unwrap();
        assert_eq!(score, 100);
    }

    #[test]
    fn test_secondary_spaced_digits_score_100_via_pattern() {
        // OCR kept the printed grouping and even a line break.
        let score = secondary_id_score("123456789012", "Aadhaar 1234 5678\n9012 DOB").unwrap();
        assert_eq!(score, 100);
    }

    #[test]
    fn test_secondary_corrupted_digit_scores_below_100() {
        let score = secondary_id_score("123456789012", "Aadhaar 123456789013 Male").unwrap();
        assert!(score < 100);
        assert!(score >= 70, "score was {}", score);
    }

    #[test]
    fn test_secondary_unrelated_text_scores_low() {
        let score = secondary_id_score("123456789012", "completely unrelated words").unwrap();
        assert!(score < 70, "score was {}", score);
    }

    #[test]
    fn test_mismatch_snippet_centers_on_claim_prefix() {
        let snippet = secondary_mismatch_snippet("123456789012", "noise 1234X678 more noise");
        assert!(snippet.contains("1234"), "snippet was {}", snippet);
    }

    #[test]
    fn test_mismatch_snippet_falls_back_to_text_start() {
        let snippet = secondary_mismatch_snippet("999988887777", "some unrelated ocr output text");
        assert_eq!(snippet, "someunrelatedocroutp");
    }

    #[test]
    fn test_cleaned_snippet_strips_boilerplate() {
        let snippet = cleaned_name_snippet("income tax department rahul sharma govt india");
        assert_eq!(snippet, "rahul sharma");
    }
}
