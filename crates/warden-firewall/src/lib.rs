//! # Warden Firewall - Hidden-Unicode Screening
//!
//! Screens tool descriptions for code points that hide text from a human
//! reviewer while the model still reads it.
//!
//! ## Purpose
//!
//! 1. **Detection** - [`detect_hidden_unicode`] returns one record per
//!    flagged code point with its byte offset and a readable translation.
//!
//! 2. **Validation** - [`validate_tool_description`] fails on any detection
//!    and reports only the count.
//!
//! 3. **Disarm** - [`sanitize_description`] rebuilds a description without
//!    the flagged code points.
//!
//! ## Threat Model
//!
//! | Threat | Description | Defense |
//! |--------|-------------|---------|
//! | Tag Smuggling | ASCII mirrored into U+E0000 block | Tag detection + decode |
//! | Trojan Source | Bidi overrides reorder rendered text | Bidi control detection |
//! | Keyword Splitting | Zero-width characters inside words | Invisible formatting detection |
//! | Malformed Input | Noncharacters in text | Noncharacter detection |
//!
//! ## References
//!
//! - **Boucher & Anderson (2021)** - "Trojan Source: Invisible Vulnerabilities"
//!   <https://arxiv.org/abs/2111.00169>
//!
//! - **Greshake et al. (2023)** - "Not What You've Signed Up For: Compromising
//!   Real-World LLM-Integrated Applications with Indirect Prompt Injection"
//!   <https://arxiv.org/abs/2302.12173>
//!
//! ## Usage
//!
//! ```rust
//! use warden_firewall::{detect_hidden_unicode, validate_tool_description};
//!
//! let description = "Fetches a URL\u{200B}";
//! if let Err(e) = validate_tool_description(description) {
//!     println!("{e}");
//!     for hit in detect_hidden_unicode(description) {
//!         println!("{} at byte {}: {}", hit.hex, hit.index, hit.translated);
//!     }
//! }
//! ```

pub mod cdr;
pub mod models;
pub mod unicode;

pub use cdr::sanitize_description;
pub use models::{DetectedCharInfo, DetectionCategory, FirewallError, Result};
pub use unicode::{decode_tag_payload, detect_hidden_unicode, validate_tool_description};
