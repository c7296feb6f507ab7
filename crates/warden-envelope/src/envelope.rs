//! Seal and open.
//!
//! Opening always verifies the HMAC before any decryption runs. A payload
//! that fails authentication never reaches the cipher.

use crate::error::{EnvelopeError, Result};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// AES-256 key length in bytes.
pub const AES_KEY_SIZE: usize = 32;

/// GCM nonce length in bytes.
pub const NONCE_SIZE: usize = 12;

/// Transport form: `{"n": nonce, "c": ciphertext, "s": signature}`, each
/// base64-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuredPayload {
    #[serde(rename = "n", default, with = "b64")]
    pub nonce: Option<Vec<u8>>,
    #[serde(rename = "c", default, with = "b64")]
    pub ciphertext: Option<Vec<u8>>,
    #[serde(rename = "s", default, with = "b64")]
    pub signature: Option<Vec<u8>>,
}

impl SecuredPayload {
    /// Nonce, ciphertext and signature, once presence and nonce length hold.
    fn parts(&self) -> Result<(&[u8], &[u8], &[u8])> {
        let nonce = present(&self.nonce)
            .ok_or_else(|| incomplete("nonce missing"))?;
        if nonce.len() != NONCE_SIZE {
            return Err(incomplete("nonce must be 12 bytes"));
        }
        let ciphertext = present(&self.ciphertext)
            .ok_or_else(|| incomplete("ciphertext missing"))?;
        let signature = present(&self.signature)
            .ok_or_else(|| incomplete("signature missing"))?;
        Ok((nonce, ciphertext, signature))
    }
}

fn present(field: &Option<Vec<u8>>) -> Option<&[u8]> {
    field.as_deref().filter(|b| !b.is_empty())
}

fn incomplete(detail: &str) -> EnvelopeError {
    EnvelopeError::InvalidInput(format!("incomplete secured payload structure: {detail}"))
}

fn check_keys(encryption_key: &[u8], signing_key: &[u8]) -> Result<()> {
    if encryption_key.len() != AES_KEY_SIZE {
        return Err(EnvelopeError::InvalidKey("expected 32 bytes for AES key"));
    }
    if signing_key.is_empty() {
        return Err(EnvelopeError::InvalidKey("HMAC key cannot be empty"));
    }
    Ok(())
}

fn sign(nonce: &[u8], ciphertext: &[u8], signing_key: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(signing_key)
        .map_err(|_| EnvelopeError::InvalidKey("HMAC key rejected"))?;
    mac.update(nonce);
    mac.update(ciphertext);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// JSON-encodes `data`, encrypts it under a fresh random nonce, signs
/// nonce‖ciphertext and returns the encoded [`SecuredPayload`].
pub fn secure<T: Serialize + ?Sized>(
    data: &T,
    encryption_key: &[u8],
    signing_key: &[u8],
) -> Result<Vec<u8>> {
    check_keys(encryption_key, signing_key)?;

    let plaintext = serde_json::to_vec(data)?;

    let cipher = Aes256Gcm::new_from_slice(encryption_key)
        .map_err(|_| EnvelopeError::InvalidKey("expected 32 bytes for AES key"))?;
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
        .map_err(|e| EnvelopeError::EncryptionFailed(e.to_string()))?;

    let signature = sign(&nonce, &ciphertext, signing_key)?;

    let payload = SecuredPayload {
        nonce: Some(nonce.to_vec()),
        ciphertext: Some(ciphertext),
        signature: Some(signature),
    };
    debug!(bytes = plaintext.len(), "Payload sealed");
    Ok(serde_json::to_vec(&payload)?)
}

/// Verifies, decrypts and decodes a payload produced by [`secure`].
///
/// Structure and key sizes are checked before any cryptography. A signature
/// mismatch returns [`EnvelopeError::AuthenticationFailed`] without
/// attempting decryption.
pub fn validate_and_open<T: DeserializeOwned>(
    secured: &[u8],
    encryption_key: &[u8],
    signing_key: &[u8],
) -> Result<T> {
    check_keys(encryption_key, signing_key)?;

    if secured.is_empty() {
        return Err(EnvelopeError::InvalidInput(
            "secured data cannot be empty".into(),
        ));
    }

    let payload: SecuredPayload = serde_json::from_slice(secured).map_err(|e| {
        EnvelopeError::InvalidInput(format!("failed to decode secured payload: {e}"))
    })?;
    let (nonce, ciphertext, signature) = payload.parts()?;

    let expected = sign(nonce, ciphertext, signing_key)?;
    if !bool::from(expected.as_slice().ct_eq(signature)) {
        warn!("SECURITY ALERT: secured payload signature verification failed");
        return Err(EnvelopeError::AuthenticationFailed);
    }

    let cipher = Aes256Gcm::new_from_slice(encryption_key)
        .map_err(|_| EnvelopeError::InvalidKey("expected 32 bytes for AES key"))?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| {
            warn!("SECURITY ALERT: secured payload failed decryption after signature check");
            EnvelopeError::DecryptionFailed
        })?;

    Ok(serde_json::from_slice(&plaintext)?)
}

mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| STANDARD.decode(s).map_err(D::Error::custom))
            .transpose()
    }
}
