//! # Warden Envelope - Authenticated Transport
//!
//! Ships any serializable value across an untrusted channel: AES-256-GCM for
//! confidentiality, HMAC-SHA256 over nonce‖ciphertext for authenticity.
//!
//! ## Threat Model
//!
//! | Threat | Description | Defense |
//! |--------|-------------|---------|
//! | Eavesdropping | Payload read in transit | AES-256-GCM |
//! | Field Splicing | Nonce or ciphertext swapped independently | HMAC covers both |
//! | Decryption Oracle | Attacker probes cipher with forged input | Verify before decrypt |
//! | Timing | Signature compared byte by byte | Constant-time compare |
//!
//! ## References
//!
//! - **NIST SP 800-38D** - "Galois/Counter Mode (GCM) and GMAC"
//!   <https://csrc.nist.gov/publications/detail/sp/800-38d/final>
//! - **RFC 2104** - "HMAC: Keyed-Hashing for Message Authentication"
//!   <https://www.rfc-editor.org/rfc/rfc2104>
//!
//! ## Usage
//!
//! ```rust
//! use warden_envelope::{secure, validate_and_open, EnvelopeError};
//! use serde_json::{json, Value};
//!
//! let enc_key = [1u8; 32];
//! let sign_key = b"shared signing secret";
//!
//! let sealed = secure(&json!({"tool": "get_weather"}), &enc_key, sign_key)?;
//! let opened: Value = validate_and_open(&sealed, &enc_key, sign_key)?;
//! assert_eq!(opened["tool"], "get_weather");
//!
//! let forged = validate_and_open::<Value>(&sealed, &enc_key, b"wrong");
//! assert!(matches!(forged, Err(EnvelopeError::AuthenticationFailed)));
//! # Ok::<(), EnvelopeError>(())
//! ```

pub mod envelope;
pub mod error;

pub use envelope::{secure, validate_and_open, SecuredPayload, AES_KEY_SIZE, NONCE_SIZE};
pub use error::{EnvelopeError, Result};
