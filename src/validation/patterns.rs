use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// PAN: 5 letters, 4 digits, 1 letter (e.g. ABCDE1234F).
    pub static ref PAN_PATTERN: Regex = Regex::new(r"[A-Z]{5}[0-9]{4}[A-Z]").unwrap();
    /// Aadhaar: 12 digits, usually printed in groups of four.
    static ref AADHAAR_PATTERN: Regex = Regex::new(r"[0-9]{12}").unwrap();
    /// Driving license (generic India format, e.g. MH12 20110012345).
    static ref DL_PATTERN: Regex = Regex::new(r"[A-Z]{2}[0-9]{2}[0-9]{11}").unwrap();
    /// Grouped 12-digit number as printed on Aadhaar cards.
    pub static ref AADHAAR_GROUPED_PATTERN: Regex =
        Regex::new(r"\b\d{4}\s?\d{4}\s?\d{4}\b").unwrap();
    /// Date of birth in DD/MM/YYYY or ISO format.
    pub static ref DATE_PATTERN: Regex =
        Regex::new(r"\b(\d{2}/\d{2}/\d{4}|\d{4}-\d{2}-\d{2})\b").unwrap();
}

/// Passport machine-readable-zone marker.
const MRZ_MARKER: &str = "P<IND";

/// Classifies raw text against known government ID signatures. Spaces are
/// stripped and the text upper-cased before matching, so grouped numbers
/// ("1234 5678 9012") still hit the contiguous patterns. First match wins.
/// Never fails; no match yields `(false, "Unknown")`.
pub fn validate_id_patterns(text: &str) -> (bool, &'static str) {
    let clean_text: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if PAN_PATTERN.is_match(&clean_text) {
        return (true, "PAN Card");
    }
    if AADHAAR_PATTERN.is_match(&clean_text) {
        return (true, "Aadhaar Card");
    }
    if clean_text.contains(MRZ_MARKER) {
        return (true, "Passport");
    }
    // A stripped DL number is 2 letters + 13 digits, which always contains a
    // 12-digit run, so the Aadhaar signature above claims it first. Last in
    // the priority order.
    if DL_PATTERN.is_match(&clean_text) {
        return (true, "Driving License");
    }

    (false, "Unknown")
}
