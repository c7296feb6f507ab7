use thiserror::Error;
use warden_registry::ErrorClass;

/// Errors from sealing or opening an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Encryption key is not 32 bytes, or the signing key is empty.
    #[error("invalid key size: {0}")]
    InvalidKey(&'static str),

    /// Payload is empty, undecodable, or missing a field.
    #[error("invalid input data for validation: {0}")]
    InvalidInput(String),

    /// HMAC over nonce and ciphertext did not match.
    #[error("message authentication failed")]
    AuthenticationFailed,

    /// AEAD tag check failed after the signature verified.
    #[error("message decryption failed")]
    DecryptionFailed,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EnvelopeError {
    pub fn class(&self) -> ErrorClass {
        match self {
            EnvelopeError::InvalidKey(_) | EnvelopeError::InvalidInput(_) => {
                ErrorClass::Structural
            }
            EnvelopeError::AuthenticationFailed | EnvelopeError::DecryptionFailed => {
                ErrorClass::Integrity
            }
            EnvelopeError::EncryptionFailed(_) | EnvelopeError::Serialization(_) => {
                ErrorClass::Internal
            }
        }
    }
}

/// Result type for envelope operations.
pub type Result<T> = std::result::Result<T, EnvelopeError>;
