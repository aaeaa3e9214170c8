/// Boilerplate words printed on government ID documents. Finding these in
/// OCR output means the text is legible, whether or not the identity fields
/// match.
const DOCUMENT_KEYWORDS: [&str; 13] = [
    "INCOME",
    "TAX",
    "INDIA",
    "GOVT",
    "GOVERNMENT",
    "DOB",
    "DATE",
    "BIRTH",
    "PERMANENT",
    "ACCOUNT",
    "NUMBER",
    "MALE",
    "FEMALE",
];

/// Counts how many document keywords appear in the text. Used as a proxy for
/// OCR quality that is independent of any identity match.
pub fn count_keywords(text: &str) -> usize {
    let upper = text.to_uppercase();
    DOCUMENT_KEYWORDS
        .iter()
        .filter(|keyword| upper.contains(**keyword))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_each_keyword_once() {
        let text = "INCOME TAX DEPARTMENT GOVT OF INDIA income tax";
        assert_eq!(count_keywords(text), 4);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(count_keywords("date of birth: 01/01/1990"), 2);
    }

    #[test]
    fn test_gibberish_scores_zero() {
        assert_eq!(count_keywords("xq zzv 8181 lorem"), 0);
    }
}
