use cds_model::Dictionary;
use unicode_normalization::UnicodeNormalization;

use crate::provider::DictionaryError;

/// Map an uploaded file name to a schema name in the dictionary.
///
/// Both sides are normalized with `sanitize`, so filenames differing only by
/// accents, case, extension, or non-letter suffixes (`sample_registration_1.csv`,
/// `sample_registration_5.11.tsv`) resolve to the same schema. First match wins.
pub fn select_schema(filename: &str, dictionary: &Dictionary) -> Result<String, DictionaryError> {
    let stem = match filename.find('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    };
    let cleaned = sanitize(stem);

    dictionary
        .schemas
        .iter()
        .find(|schema| sanitize(&schema.name) == cleaned)
        .map(|schema| schema.name.clone())
        .ok_or_else(|| DictionaryError::SchemaNotFound {
            filename: filename.to_string(),
        })
}

/// Normalize a name for schema matching: transliterate accented Latin
/// characters to ASCII (NFD, combining marks dropped), keep only ASCII
/// letters, strip trailing underscores, lowercase.
pub fn sanitize(name: &str) -> String {
    let latinized: String = name.nfd().filter(|c| !is_combining_mark(*c)).collect();

    let mut letters: String = latinized.chars().filter(|c| c.is_ascii_alphabetic()).collect();

    while letters.ends_with('_') {
        letters.pop();
    }

    letters.to_lowercase().trim().to_string()
}

fn is_combining_mark(c: char) -> bool {
    // Covers the combining diacritical mark blocks NFD produces for Latin text.
    matches!(c, '\u{0300}'..='\u{036f}' | '\u{1ab0}'..='\u{1aff}' | '\u{20d0}'..='\u{20ff}')
}
