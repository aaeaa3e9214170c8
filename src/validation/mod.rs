pub mod fuzzy;
pub mod identifiers;
pub mod legibility;
pub mod patterns;

pub use fuzzy::{letters_only, partial_ratio, strip_whitespace, token_set_ratio};
pub use identifiers::{
    cleaned_name_snippet, find_primary_id, secondary_id_score, secondary_mismatch_snippet,
};
pub use legibility::count_keywords;
pub use patterns::validate_id_patterns;
