//! Pin derivation.
//!
//! `key = AES-128(initiator_nonce, responder_nonce)`,
//! `digest = HMAC-SHA256(key, initiator_message || responder_message)`,
//! and the pin is `digest[i] % 10` for the first `pin_length` bytes.

use std::fmt;

use aes::Aes128Enc;
use cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::Nonce;

type HmacSha256 = Hmac<Sha256>;

/// Default number of digits in a pin.
pub const DEFAULT_PIN_LENGTH: usize = 8;

/// Length of the digest pins are truncated from.
pub const DIGEST_LENGTH: usize = 32;

/// A pin derivation error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PinError {
    /// The digest does not have enough bytes for the requested pin length.
    #[error("digest too short: need {expected} bytes, got {actual}")]
    DigestTooShort {
        /// Requested pin length.
        expected: usize,
        /// Digest length.
        actual: usize,
    },
    /// The MAC rejected the derived key.
    #[error("invalid key length")]
    InvalidKeyLength,
}

/// A short authentication string made of decimal digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pin(String);

impl Pin {
    /// Truncates `digest` into a pin of `length` digits.
    ///
    /// Each byte contributes `byte % 10`. Fails if `digest` has fewer than
    /// `length` bytes.
    pub fn from_digest(digest: &[u8], length: usize) -> Result<Self, PinError> {
        if digest.len() < length {
            return Err(PinError::DigestTooShort {
                expected: length,
                actual: digest.len(),
            });
        }

        Ok(Self(
            digest[..length]
                .iter()
                .map(|b| char::from(b'0' + b % 10))
                .collect(),
        ))
    }

    /// Returns the pin as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number of digits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the pin has no digits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Pin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives the session key, encrypting the responder's nonce under the
/// initiator's nonce.
pub fn session_key(initiator_nonce: Nonce, responder_nonce: Nonce) -> Nonce {
    let cipher = Aes128Enc::new(&GenericArray::from(initiator_nonce));

    let mut block = GenericArray::from(responder_nonce);
    cipher.encrypt_block(&mut block);

    Nonce::from(block)
}

/// Computes the HMAC-SHA256 digest over both messages, initiator first.
pub fn transcript_digest(
    key: Nonce,
    initiator_message: &[u8],
    responder_message: &[u8],
) -> Result<[u8; DIGEST_LENGTH], PinError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_ref())
        .map_err(|_| PinError::InvalidKeyLength)?;
    mac.update(initiator_message);
    mac.update(responder_message);

    Ok(mac.finalize().into_bytes().into())
}

/// Derives the pin for a transcript.
pub fn derive_pin(
    initiator_nonce: Nonce,
    responder_nonce: Nonce,
    initiator_message: &[u8],
    responder_message: &[u8],
    pin_length: usize,
) -> Result<Pin, PinError> {
    let key = session_key(initiator_nonce, responder_nonce);
    let digest = transcript_digest(key, initiator_message, responder_message)?;

    Pin::from_digest(&digest, pin_length)
}
