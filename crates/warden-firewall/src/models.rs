//! # Core Types for the Description Firewall
//!
//! Detection records produced by the hidden-Unicode scanner and the error
//! type for description checks.
//!
//! ## Threat Model
//!
//! Tool descriptions are read by the model verbatim. Code points that render
//! as nothing (or reorder what is rendered) let a publisher hide instructions
//! from the human reviewing the tool while the model still reads them.
//! [`DetectionCategory`] encodes the four families of such code points.
//!
//! ## References
//!
//! - Unicode Technical Standard #39 - Security Mechanisms
//!   <https://www.unicode.org/reports/tr39/>
//! - Unicode Standard Annex #9 - Bidirectional Algorithm
//!   <https://www.unicode.org/reports/tr9/>

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Family of a flagged code point.
///
/// | Variant | Code points |
/// |---------|-------------|
/// | `TagChar` | U+E0000..=U+E007F |
/// | `BidiControl` | U+202A..=U+202E, U+2066..=U+2069, U+061C |
/// | `InvisibleFmt` | U+200B, U+200C, U+200D, U+2060, U+FEFF |
/// | `DeprecatedChar` | U+FDD0..=U+FDEF, any U+xxFFFE / U+xxFFFF |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionCategory {
    /// Unicode Tags block. Can smuggle an invisible copy of ASCII text.
    #[serde(rename = "Unicode Tag (U+E0000-U+E007F)")]
    TagChar,

    /// Bidirectional embedding, override and isolate controls.
    #[serde(rename = "Bidirectional Control")]
    BidiControl,

    /// Zero-width and joiner characters.
    #[serde(rename = "Invisible Formatting")]
    InvisibleFmt,

    /// Noncharacters. Malformed rather than hidden, still suspicious.
    #[serde(rename = "Deprecated/Non-Character")]
    DeprecatedChar,
}

impl DetectionCategory {
    /// Human-readable label, also used on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            DetectionCategory::TagChar => "Unicode Tag (U+E0000-U+E007F)",
            DetectionCategory::BidiControl => "Bidirectional Control",
            DetectionCategory::InvisibleFmt => "Invisible Formatting",
            DetectionCategory::DeprecatedChar => "Deprecated/Non-Character",
        }
    }
}

impl fmt::Display for DetectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One flagged code point in a scanned string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedCharInfo {
    /// The code point itself.
    pub rune: char,

    /// `U+XXXX` form, at least four uppercase hex digits.
    pub hex: String,

    /// UTF-8 byte offset of the code point in the scanned string.
    pub index: usize,

    pub category: DetectionCategory,

    /// Recovered ASCII for tag characters, or a bracketed mnemonic.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub translated: String,
}

/// Errors raised by description checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FirewallError {
    /// The description carries hidden characters. Only the count is
    /// reported so the payload is not echoed back into logs.
    #[error("ALERT: {count} hidden characters detected in tool description text")]
    HiddenCharacters { count: usize },

    #[error("content too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}

/// Result type for firewall operations.
pub type Result<T> = std::result::Result<T, FirewallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_string(&DetectionCategory::BidiControl).unwrap();
        assert_eq!(json, r#""Bidirectional Control""#);

        let back: DetectionCategory =
            serde_json::from_str(r#""Unicode Tag (U+E0000-U+E007F)""#).unwrap();
        assert_eq!(back, DetectionCategory::TagChar);
    }

    #[test]
    fn test_label_matches_display() {
        for category in [
            DetectionCategory::TagChar,
            DetectionCategory::BidiControl,
            DetectionCategory::InvisibleFmt,
            DetectionCategory::DeprecatedChar,
        ] {
            assert_eq!(category.to_string(), category.label());
        }
    }

    #[test]
    fn test_hidden_characters_message() {
        let err = FirewallError::HiddenCharacters { count: 3 };
        assert_eq!(
            err.to_string(),
            "ALERT: 3 hidden characters detected in tool description text"
        );
    }

    #[test]
    fn test_empty_translation_omitted() {
        let info = DetectedCharInfo {
            rune: '\u{E0002}',
            hex: "U+E0002".to_string(),
            index: 0,
            category: DetectionCategory::TagChar,
            translated: String::new(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("translated").is_none());
        assert_eq!(json["category"], "Unicode Tag (U+E0000-U+E007F)");
    }
}
