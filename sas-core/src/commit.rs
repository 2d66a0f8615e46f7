//! Commitments to a nonce.
//!
//! A commitment is created protected and can only be opened after it has been
//! decommitted. Two schemes are provided:
//!
//! * [`IdealCommitment`] models the ideal commitment functionality. Hiding and
//!   binding are assumed, not constructed: the committed value travels inside
//!   the commitment and only the protection flag guards it. Use it for
//!   demonstration and testing.
//! * [`HashCommitment`] is a salted blake3 commitment. Only the digest is
//!   sent to the peer, and the decommitment carries the value and salt.
//!
//! The opened state never travels on the wire: a deserialized commitment is
//! always protected.

use std::fmt;

use rand::{CryptoRng, Rng};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::Nonce;

/// Domain separator for hash commitments.
const HASH_COMMIT_DOMAIN: &[u8] = b"SAS_HASH_COMMITMENT";

/// A commitment error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommitmentError {
    /// The commitment has not been decommitted yet.
    #[error("commitment is protected")]
    Protected,
    /// The decommitment does not match the commitment.
    #[error("decommitment does not match the commitment")]
    InvalidDecommitment,
    /// The commitment was received already opened.
    #[error("commitment was received already opened")]
    NotProtected,
}

/// A commitment scheme over a [`Nonce`].
///
/// The commitment value is what the committer sends to its peer. It is an
/// owned snapshot; the committer keeps the [`Commitment::Decommitment`] and
/// sends it when it reveals.
pub trait Commitment:
    fmt::Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The decommitment sent by the committer when it reveals.
    type Decommitment: fmt::Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Commits to `value`. The returned commitment is protected.
    fn commit<R: Rng + CryptoRng + ?Sized>(value: Nonce, rng: &mut R) -> (Self, Self::Decommitment);

    /// Returns `true` until the commitment has been decommitted.
    fn is_protected(&self) -> bool;

    /// Decommits, returning an unprotected commitment.
    ///
    /// Decommitting an already unprotected commitment is a no-op.
    fn decommit(self, decommitment: Self::Decommitment) -> Result<Self, CommitmentError>;

    /// Returns the committed value, or [`CommitmentError::Protected`] if the
    /// commitment has not been decommitted.
    fn open(&self) -> Result<Nonce, CommitmentError>;
}

/// An ideal commitment.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdealCommitment {
    value: Nonce,
    #[serde(skip, default = "protected")]
    is_protected: bool,
}

fn protected() -> bool {
    true
}

opaque_debug::implement!(IdealCommitment);

/// The reveal signal of an [`IdealCommitment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdealDecommitment;

impl Commitment for IdealCommitment {
    type Decommitment = IdealDecommitment;

    fn commit<R: Rng + CryptoRng + ?Sized>(value: Nonce, _rng: &mut R) -> (Self, IdealDecommitment) {
        (
            Self {
                value,
                is_protected: true,
            },
            IdealDecommitment,
        )
    }

    fn is_protected(&self) -> bool {
        self.is_protected
    }

    fn decommit(self, _decommitment: IdealDecommitment) -> Result<Self, CommitmentError> {
        Ok(Self {
            is_protected: false,
            ..self
        })
    }

    fn open(&self) -> Result<Nonce, CommitmentError> {
        if self.is_protected {
            return Err(CommitmentError::Protected);
        }

        Ok(self.value)
    }
}

/// A salted blake3 hash commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCommitment {
    digest: [u8; 32],
    #[serde(skip)]
    opened: Option<Nonce>,
}

impl HashCommitment {
    /// Returns the commitment digest.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }
}

/// The opening of a [`HashCommitment`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDecommitment {
    value: Nonce,
    salt: [u8; 16],
}

opaque_debug::implement!(HashDecommitment);

impl HashDecommitment {
    fn digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(HASH_COMMIT_DOMAIN);
        hasher.update(&self.salt);
        hasher.update(self.value.as_ref());
        hasher.finalize().into()
    }
}

impl Commitment for HashCommitment {
    type Decommitment = HashDecommitment;

    fn commit<R: Rng + CryptoRng + ?Sized>(value: Nonce, rng: &mut R) -> (Self, HashDecommitment) {
        let decommitment = HashDecommitment {
            value,
            salt: rng.gen(),
        };

        (
            Self {
                digest: decommitment.digest(),
                opened: None,
            },
            decommitment,
        )
    }

    fn is_protected(&self) -> bool {
        self.opened.is_none()
    }

    fn decommit(self, decommitment: HashDecommitment) -> Result<Self, CommitmentError> {
        if decommitment.digest() != self.digest {
            return Err(CommitmentError::InvalidDecommitment);
        }

        Ok(Self {
            opened: Some(decommitment.value),
            ..self
        })
    }

    fn open(&self) -> Result<Nonce, CommitmentError> {
        self.opened.ok_or(CommitmentError::Protected)
    }
}
