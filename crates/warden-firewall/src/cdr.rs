//! Content Disarm & Reconstruct (CDR) for tool descriptions.
//!
//! Rebuilds a description without any code point the detector flags, plus
//! stray C0/C1 controls. Newlines and tabs survive.

use crate::models::{FirewallError, Result};
use crate::unicode::classify;

/// Maximum description size accepted for sanitization (1MB)
pub const MAX_DESCRIPTION_SIZE: usize = 1024 * 1024;

/// Returns `input` with every hidden or control character removed.
///
/// ```rust
/// use warden_firewall::sanitize_description;
///
/// let clean = sanitize_description("Sum\u{200B}s two\u{202E} numbers").unwrap();
/// assert_eq!(clean, "Sums two numbers");
/// ```
pub fn sanitize_description(input: &str) -> Result<String> {
    if input.len() > MAX_DESCRIPTION_SIZE {
        return Err(FirewallError::TooLarge {
            size: input.len(),
            max: MAX_DESCRIPTION_SIZE,
        });
    }

    let output = input
        .chars()
        .filter(|&c| match c {
            '\n' | '\r' | '\t' => true,
            c if c.is_control() => false,
            c => classify(c).is_none(),
        })
        .collect();

    Ok(output)
}
