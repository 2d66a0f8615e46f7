//! A 2-party Short Authentication String (SAS) protocol.
//!
//! The initiator commits to a random nonce and sends the commitment with its
//! message. The responder replies with its message and nonce in the clear,
//! after which the initiator reveals its nonce. Both parties then derive the
//! same short decimal pin from both nonces and both messages. Comparing the
//! pins over an authentic channel (e.g. reading them aloud) detects a
//! man-in-the-middle that altered either message.
//!
//! See Vaudenay, "Secure Communications over Insecure Channels Based on Short
//! Authenticated Strings" (CRYPTO 2005) and the MA-3 variant in
//! <https://eprint.iacr.org/2005/424>.
//!
//! # Example
//!
//! ```
//! use rand::thread_rng;
//! use sas_core::{commit::IdealCommitment, Initiator, Nonce, Responder, SasConfig};
//! # use sas_core::SasError;
//!
//! # fn main() -> Result<(), SasError> {
//! let initiator = Initiator::new(
//!     SasConfig::default(),
//!     "AlicePublicKey",
//!     Nonce::random(&mut thread_rng()),
//! );
//! let responder = Responder::new(
//!     SasConfig::default(),
//!     "BobPublicKey",
//!     Nonce::random(&mut thread_rng()),
//! );
//!
//! let (initiator, commit) = initiator.commit::<IdealCommitment>(&mut thread_rng());
//! let (responder, payload) = responder.send(commit)?;
//! let (initiator, reveal) = initiator.receive(payload).reveal();
//! let responder = responder.open(reveal)?;
//!
//! assert_eq!(initiator.check()?, responder.check()?);
//! # Ok(())
//! # }
//! ```

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

pub mod commit;
mod config;
pub mod exchange;
mod initiator;
pub mod msgs;
mod nonce;
pub mod pin;
mod responder;

pub use config::{SasConfig, SasConfigBuilder, SasConfigBuilderError};
pub use initiator::{initiator_state, Initiator};
pub use nonce::Nonce;
pub use responder::{responder_state, Responder};

/// A SAS protocol error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SasError {
    #[error(transparent)]
    Commitment(#[from] commit::CommitmentError),
    #[error(transparent)]
    Pin(#[from] pin::PinError),
    #[error("entropy source unavailable: {0}")]
    Entropy(#[from] rand::Error),
}
