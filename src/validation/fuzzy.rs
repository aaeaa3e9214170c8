use std::collections::BTreeSet;
use strsim::normalized_levenshtein;

/// Normalizes for name/document comparisons: letters and whitespace only,
/// lower-cased.
pub fn letters_only(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Normalizes for numeric-ID comparisons: whitespace stripped, case kept.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn ratio(a: &str, b: &str) -> u8 {
    (normalized_levenshtein(a, b) * 100.0).round() as u8
}

/// Order-insensitive, partial-overlap-tolerant token comparison, 0..100.
/// Tokens common to both sides are factored out so "John Doe" scores 100
/// against "ID Card Name: John Doe" after normalization.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    let base = intersection.join(" ");
    let combined_a = [intersection.as_slice(), only_a.as_slice()]
        .concat()
        .join(" ");
    let combined_b = [intersection.as_slice(), only_b.as_slice()]
        .concat()
        .join(" ");

    ratio(&base, &combined_a)
        .max(ratio(&base, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

/// Best-substring alignment score, 0..100. Slides a window the length of the
/// shorter string across the longer one; a substring fully contained in the
/// other string therefore scores 100.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let chars_a: Vec<char> = a.chars().collect();
    let chars_b: Vec<char> = b.chars().collect();
    let (shorter, longer) = if chars_a.len() <= chars_b.len() {
        (&chars_a, &chars_b)
    } else {
        (&chars_b, &chars_a)
    };

    let needle: String = shorter.iter().collect();
    let mut best = 0u8;
    for window in longer.windows(shorter.len()) {
        let candidate: String = window.iter().collect();
        let score = ratio(&needle, &candidate);
        if score > best {
            best = score;
            if best == 100 {
                break;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_set_identity_is_100() {
        assert_eq!(token_set_ratio("john doe", "john doe"), 100);
    }

    #[test]
    fn test_token_set_is_symmetric() {
        let a = "john doe income tax";
        let b = "doe john";
        assert_eq!(token_set_ratio(a, b), token_set_ratio(b, a));
    }

    #[test]
    fn test_token_set_ignores_word_order() {
        assert_eq!(token_set_ratio("doe john", "john doe"), 100);
    }

    #[test]
    fn test_token_set_tolerates_surrounding_text() {
        let score = token_set_ratio("john doe", "income tax department john doe card");
        assert_eq!(score, 100);
    }

    #[test]
    fn test_token_set_low_for_different_names() {
        let score = token_set_ratio("amit kumar", "rahul sharma govt of india");
        assert!(score < 40, "score was {}", score);
    }

    #[test]
    fn test_token_set_empty_inputs_score_zero() {
        assert_eq!(token_set_ratio("", "john doe"), 0);
        assert_eq!(token_set_ratio("john doe", ""), 0);
    }

    #[test]
    fn test_partial_contained_substring_is_100() {
        assert_eq!(partial_ratio("ABCDE1234F", "PAN ABCDE1234F GOVT"), 100);
    }

    #[test]
    fn test_partial_corrupted_digit_below_100() {
        let score = partial_ratio("123456789012", "xx123456789013xx");
        assert!(score < 100);
        assert!(score >= 70, "score was {}", score);
    }

    #[test]
    fn test_partial_empty_input_scores_zero() {
        assert_eq!(partial_ratio("", "anything"), 0);
    }

    #[test]
    fn test_letters_only_normalization() {
        assert_eq!(letters_only("John Doe-123!"), "john doe");
    }

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace("1234 5678\n9012"), "123456789012");
    }
}
