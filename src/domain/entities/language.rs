use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Languages the assistant answers in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Te,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Hi, Language::Te];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Te => "te",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Te => "Telugu",
        }
    }

    /// Parse a two-letter code, case-insensitive
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" => Some(Language::En),
            "hi" => Some(Language::Hi),
            "te" => Some(Language::Te),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

const TELUGU_BLOCK: RangeInclusive<char> = '\u{0C00}'..='\u{0C7F}';
const DEVANAGARI_BLOCK: RangeInclusive<char> = '\u{0900}'..='\u{097F}';

/// Minimum share of script characters before a script decides the language
const SCRIPT_SHARE: f64 = 0.15;

/// Hindi words farmers commonly type in Roman script
const ROMAN_HINDI_WORDS: &[&str] = &[
    "kya", "hai", "mera", "meri", "kaise", "karo", "karna", "fasal", "kheti", "pani", "baarish",
];

/// Detect the language of a farmer's message.
///
/// Telugu wins over Hindi when both scripts pass the threshold. Text with
/// neither script falls back to a romanized-Hindi word scan, then English.
pub fn detect_language(text: &str) -> Language {
    let total = text.chars().count();
    if total == 0 {
        return Language::En;
    }

    let telugu = text.chars().filter(|c| TELUGU_BLOCK.contains(c)).count();
    let hindi = text.chars().filter(|c| DEVANAGARI_BLOCK.contains(c)).count();

    if telugu as f64 / total as f64 > SCRIPT_SHARE {
        return Language::Te;
    }
    if hindi as f64 / total as f64 > SCRIPT_SHARE {
        return Language::Hi;
    }

    let lower = text.to_lowercase();
    if ROMAN_HINDI_WORDS.iter().any(|w| lower.contains(w)) {
        return Language::Hi;
    }

    Language::En
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_english() {
        assert_eq!(detect_language(""), Language::En);
    }

    #[test]
    fn test_detects_telugu_script() {
        assert_eq!(detect_language("నా పంట దెబ్బతింటోంది"), Language::Te);
    }

    #[test]
    fn test_detects_devanagari_script() {
        assert_eq!(detect_language("मेरी फसल खराब हो रही है"), Language::Hi);
    }

    #[test]
    fn test_detects_romanized_hindi() {
        assert_eq!(detect_language("Meri fasal me keede lag gaye"), Language::Hi);
    }

    #[test]
    fn test_plain_english() {
        assert_eq!(detect_language("When should I sow wheat?"), Language::En);
    }

    #[test]
    fn test_sparse_script_does_not_decide() {
        // one Telugu letter in a long English sentence stays under the share
        assert_eq!(
            detect_language("Please tell me the best fertilizer dose for rice ప"),
            Language::En
        );
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Language::from_code("HI"), Some(Language::Hi));
        assert_eq!(Language::from_code(" te "), Some(Language::Te));
        assert_eq!(Language::from_code("auto"), None);
        assert_eq!(Language::Te.to_string(), "te");
    }
}
