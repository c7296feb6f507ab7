//! # Hidden-Unicode Detector
//!
//! Scans text for code points that are invisible or reorder rendering, and
//! recovers a readable form of each one where possible.
//!
//! ## Threat Model
//!
//! - **Tag Smuggling**: U+E0020..=U+E007E mirror printable ASCII but render
//!   as nothing. A description can carry a full hidden instruction in them.
//! - **Trojan Source**: bidi overrides make the reviewed text differ from
//!   the logical text the model reads.
//! - **Zero-Width Padding**: joiners and zero-width spaces split keywords so
//!   naive filters miss them.
//!
//! ## Classification
//!
//! Each code point lands in at most one category, checked in this order:
//! tag, bidi control, invisible formatting, deprecated/noncharacter.
//!
//! ## References
//!
//! - Boucher & Anderson (2021) - "Trojan Source: Invisible Vulnerabilities"
//!   <https://arxiv.org/abs/2111.00169>
//! - Unicode Tags block
//!   <https://www.unicode.org/charts/PDF/UE0000.pdf>

use crate::models::{DetectedCharInfo, DetectionCategory, FirewallError, Result};
use tracing::warn;

fn is_tag(cp: u32) -> bool {
    (0xE0000..=0xE007F).contains(&cp)
}

fn is_bidi_control(cp: u32) -> bool {
    (0x202A..=0x202E).contains(&cp) || (0x2066..=0x2069).contains(&cp) || cp == 0x061C
}

fn is_invisible_formatting(cp: u32) -> bool {
    matches!(cp, 0x200B | 0x200C | 0x200D | 0x2060 | 0xFEFF)
}

fn is_deprecated(cp: u32) -> bool {
    (0xFDD0..=0xFDEF).contains(&cp) || cp & 0xFFFE == 0xFFFE
}

fn translate_tag(cp: u32) -> String {
    match cp {
        0xE0020..=0xE007E => char::from_u32(cp - 0xE0000)
            .map(String::from)
            .unwrap_or_default(),
        0xE007F => "[Cancel Tag]".to_string(),
        0xE0001 => "[Start Tag]".to_string(),
        _ => String::new(),
    }
}

fn translate_bidi(cp: u32) -> &'static str {
    match cp {
        0x202A => "[LRE]",
        0x202B => "[RLE]",
        0x202C => "[PDF]",
        0x202D => "[LRO]",
        0x202E => "[RLO]",
        0x061C => "[ALM]",
        0x2066 => "[LRI]",
        0x2067 => "[RLI]",
        0x2068 => "[FSI]",
        0x2069 => "[PDI]",
        _ => "[Bidi]",
    }
}

fn translate_invisible(cp: u32) -> &'static str {
    match cp {
        0x200B => "[ZWSP]",
        0x200C => "[ZWNJ]",
        0x200D => "[ZWJ]",
        0x2060 => "[WJ]",
        0xFEFF => "[ZWNBSP/BOM]",
        _ => "[Invisible]",
    }
}

/// Classifies a single code point, returning its category and translation.
pub fn classify(ch: char) -> Option<(DetectionCategory, String)> {
    let cp = ch as u32;
    if is_tag(cp) {
        Some((DetectionCategory::TagChar, translate_tag(cp)))
    } else if is_bidi_control(cp) {
        Some((DetectionCategory::BidiControl, translate_bidi(cp).to_string()))
    } else if is_invisible_formatting(cp) {
        Some((
            DetectionCategory::InvisibleFmt,
            translate_invisible(cp).to_string(),
        ))
    } else if is_deprecated(cp) {
        Some((
            DetectionCategory::DeprecatedChar,
            "[Deprecated/NonChar]".to_string(),
        ))
    } else {
        None
    }
}

/// Scans `text` and returns one record per flagged code point, in order.
/// An empty result means the text is clean.
///
/// ```rust
/// use warden_firewall::{detect_hidden_unicode, DetectionCategory};
///
/// let found = detect_hidden_unicode("Hello\u{202E}WRLD");
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].index, 5);
/// assert_eq!(found[0].category, DetectionCategory::BidiControl);
/// assert_eq!(found[0].translated, "[RLO]");
/// ```
pub fn detect_hidden_unicode(text: &str) -> Vec<DetectedCharInfo> {
    text.char_indices()
        .filter_map(|(index, ch)| {
            classify(ch).map(|(category, translated)| DetectedCharInfo {
                rune: ch,
                hex: format!("U+{:04X}", ch as u32),
                index,
                category,
                translated,
            })
        })
        .collect()
}

/// Concatenates the translations of every tag character in `text`,
/// recovering the ASCII payload smuggled in the Tags block.
pub fn decode_tag_payload(text: &str) -> String {
    detect_hidden_unicode(text)
        .into_iter()
        .filter(|d| d.category == DetectionCategory::TagChar)
        .map(|d| d.translated)
        .collect()
}

/// Fails if `text` contains any flagged code point.
///
/// Only the count is reported. Call [`detect_hidden_unicode`] for detail.
pub fn validate_tool_description(text: &str) -> Result<()> {
    let count = detect_hidden_unicode(text).len();
    if count > 0 {
        warn!(
            count,
            "SECURITY ALERT: hidden characters detected in tool description"
        );
        return Err(FirewallError::HiddenCharacters { count });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(s: &str) -> String {
        s.chars()
            .map(|c| char::from_u32(c as u32 + 0xE0000).unwrap())
            .collect()
    }

    #[test]
    fn test_clean_text() {
        assert!(detect_hidden_unicode("Get the weather for a city.").is_empty());
        assert!(detect_hidden_unicode("").is_empty());
        // Non-ASCII that is not hidden stays clean
        assert!(detect_hidden_unicode("Café ☕ 日本語 👍").is_empty());
    }

    #[test]
    fn test_rlo_example() {
        let found = detect_hidden_unicode("Hello\u{202E}WRLD");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rune, '\u{202E}');
        assert_eq!(found[0].hex, "U+202E");
        assert_eq!(found[0].index, 5);
        assert_eq!(found[0].category, DetectionCategory::BidiControl);
        assert_eq!(found[0].translated, "[RLO]");
    }

    #[test]
    fn test_index_is_byte_offset() {
        // "é" is two bytes, so the ZWSP starts at byte 3 not char 2
        let text = "aé\u{200B}b";
        let found = detect_hidden_unicode(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].index, 3);
        assert!(text[found[0].index..].starts_with('\u{200B}'));
    }

    #[test]
    fn test_tag_translation() {
        let hidden = tagged("rm -rf");
        let text = format!("Lists files{hidden}");
        let found = detect_hidden_unicode(&text);

        assert_eq!(found.len(), 6);
        assert!(found.iter().all(|d| d.category == DetectionCategory::TagChar));
        assert_eq!(decode_tag_payload(&text), "rm -rf");
        assert_eq!(found[0].hex, "U+E0072");
    }

    #[test]
    fn test_special_tags() {
        let found = detect_hidden_unicode("\u{E0001}\u{E007F}\u{E0002}");
        assert_eq!(found[0].translated, "[Start Tag]");
        assert_eq!(found[1].translated, "[Cancel Tag]");
        assert_eq!(found[2].translated, "");
        assert_eq!(found[2].category, DetectionCategory::TagChar);
    }

    #[test]
    fn test_all_bidi_mnemonics() {
        let cases = [
            ('\u{202A}', "[LRE]"),
            ('\u{202B}', "[RLE]"),
            ('\u{202C}', "[PDF]"),
            ('\u{202D}', "[LRO]"),
            ('\u{202E}', "[RLO]"),
            ('\u{061C}', "[ALM]"),
            ('\u{2066}', "[LRI]"),
            ('\u{2067}', "[RLI]"),
            ('\u{2068}', "[FSI]"),
            ('\u{2069}', "[PDI]"),
        ];
        for (ch, mnemonic) in cases {
            let (category, translated) = classify(ch).unwrap();
            assert_eq!(category, DetectionCategory::BidiControl);
            assert_eq!(translated, mnemonic);
        }
    }

    #[test]
    fn test_invisible_mnemonics() {
        let cases = [
            ('\u{200B}', "[ZWSP]"),
            ('\u{200C}', "[ZWNJ]"),
            ('\u{200D}', "[ZWJ]"),
            ('\u{2060}', "[WJ]"),
            ('\u{FEFF}', "[ZWNBSP/BOM]"),
        ];
        for (ch, mnemonic) in cases {
            let (category, translated) = classify(ch).unwrap();
            assert_eq!(category, DetectionCategory::InvisibleFmt);
            assert_eq!(translated, mnemonic);
        }
    }

    #[test]
    fn test_noncharacters() {
        for ch in ['\u{FDD0}', '\u{FDEF}', '\u{FFFE}', '\u{FFFF}', '\u{1FFFE}', '\u{10FFFF}'] {
            let (category, translated) = classify(ch).unwrap();
            assert_eq!(category, DetectionCategory::DeprecatedChar);
            assert_eq!(translated, "[Deprecated/NonChar]");
        }
        assert!(classify('\u{FDCF}').is_none());
        assert!(classify('\u{FFFD}').is_none());
    }

    #[test]
    fn test_neighbors_not_flagged() {
        for ch in ['\u{2029}', '\u{202F}', '\u{2065}', '\u{206A}', '\u{200E}', '\u{061B}'] {
            assert!(classify(ch).is_none(), "U+{:04X} flagged", ch as u32);
        }
    }

    #[test]
    fn test_hex_padding() {
        let found = detect_hidden_unicode("\u{061C}");
        assert_eq!(found[0].hex, "U+061C");
    }

    #[test]
    fn test_validate_reports_count_only() {
        assert!(validate_tool_description("Plain description").is_ok());

        let err = validate_tool_description("a\u{200B}b\u{200D}c\u{202E}").unwrap_err();
        assert_eq!(err, FirewallError::HiddenCharacters { count: 3 });
        assert!(!err.to_string().contains('\u{200B}'));
    }
}
