//! A 2-party Short Authentication String (SAS) pairing protocol over a
//! message channel.
//!
//! # Example
//!
//! ```
//! use sas_pairing::{
//!     commit::IdealCommitment, io::duplex, msgs::SasMessage, sas_initiator, sas_responder, SasConfig,
//! };
//! # use sas_pairing::SasError;
//! # use futures::executor::block_on;
//!
//! # fn main() {
//! # block_on(async {
//! let (mut io_initiator, mut io_responder) = duplex::<SasMessage<IdealCommitment>>(8);
//!
//! let (initiator_pin, responder_pin) = futures::try_join!(
//!     sas_initiator::<IdealCommitment>(&mut io_initiator, SasConfig::default(), "AlicePublicKey"),
//!     sas_responder::<IdealCommitment>(&mut io_responder, SasConfig::default(), "BobPublicKey"),
//! )?;
//!
//! assert_eq!(initiator_pin, responder_pin);
//! # Ok::<_, SasError>(())
//! # }).unwrap();
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

pub mod io;

use rand::thread_rng;
use sas_core::{
    commit::Commitment,
    msgs::{MessageError, SasMessage},
    Initiator as CoreInitiator, Responder as CoreResponder, SasError as CoreError,
};
use tracing::debug;

use crate::io::{duplex, expect_next, send, Duplex};

pub use sas_core::{
    commit, initiator_state, msgs, pin, pin::Pin, responder_state, Nonce, SasConfig,
    SasConfigBuilderError,
};

/// SAS pairing error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SasError {
    /// An I/O error occurred.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A core error occurred.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    /// The peer sent a message out of order.
    #[error(transparent)]
    Message(#[from] MessageError),
    /// The configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] SasConfigBuilderError),
}

/// A SAS initiator.
#[derive(Debug)]
pub struct Initiator<T: initiator_state::State = initiator_state::Initialized> {
    inner: CoreInitiator<T>,
}

impl Initiator {
    /// Creates a new initiator.
    pub fn new(config: SasConfig, message: impl Into<Vec<u8>>, nonce: Nonce) -> Self {
        Self {
            inner: CoreInitiator::new(config, message, nonce),
        }
    }

    /// Creates a new initiator with a nonce drawn from the OS entropy source.
    pub fn from_entropy(config: SasConfig, message: impl Into<Vec<u8>>) -> Result<Self, SasError> {
        Ok(Self {
            inner: CoreInitiator::from_entropy(config, message)?,
        })
    }

    /// Sends the commitment to the initiator's nonce, along with its message.
    pub async fn commit<C: Commitment>(
        self,
        io: &mut impl Duplex<SasMessage<C>>,
    ) -> Result<Initiator<initiator_state::Committed<C>>, SasError> {
        let (inner, commit) = self.inner.commit::<C>(&mut thread_rng());
        send(io, SasMessage::<C>::Commit(commit)).await?;
        debug!(role = "initiator", "sent commitment");
        Ok(Initiator { inner })
    }

    /// Executes the SAS protocol to completion, returning the initiator's pin.
    pub async fn execute<C: Commitment>(
        self,
        io: &mut impl Duplex<SasMessage<C>>,
    ) -> Result<Pin, SasError> {
        let initiator = self
            .commit::<C>(io)
            .await?
            .receive(io)
            .await?
            .reveal(io)
            .await?;
        initiator.check()
    }
}

impl<C: Commitment> Initiator<initiator_state::Committed<C>> {
    /// Receives the responder's message and nonce.
    pub async fn receive(
        self,
        io: &mut impl Duplex<SasMessage<C>>,
    ) -> Result<Initiator<initiator_state::Received<C>>, SasError> {
        let payload = expect_next::<SasMessage<C>, _>(io).await?.try_into_responder_payload()?;
        debug!(role = "initiator", "received responder payload");
        Ok(Initiator {
            inner: self.inner.receive(payload),
        })
    }
}

impl<C: Commitment> Initiator<initiator_state::Received<C>> {
    /// Reveals the initiator's nonce.
    pub async fn reveal(
        self,
        io: &mut impl Duplex<SasMessage<C>>,
    ) -> Result<Initiator<initiator_state::Revealed>, SasError> {
        let (inner, reveal) = self.inner.reveal();
        send(io, SasMessage::<C>::Reveal(reveal)).await?;
        debug!(role = "initiator", "sent decommitment");
        Ok(Initiator { inner })
    }
}

impl Initiator<initiator_state::Revealed> {
    /// Computes the initiator's pin.
    pub fn check(&self) -> Result<Pin, SasError> {
        Ok(self.inner.check()?)
    }
}

/// A SAS responder.
#[derive(Debug)]
pub struct Responder<T: responder_state::State = responder_state::Initialized> {
    inner: CoreResponder<T>,
}

impl Responder {
    /// Creates a new responder.
    pub fn new(config: SasConfig, message: impl Into<Vec<u8>>, nonce: Nonce) -> Self {
        Self {
            inner: CoreResponder::new(config, message, nonce),
        }
    }

    /// Creates a new responder with a nonce drawn from the OS entropy source.
    pub fn from_entropy(config: SasConfig, message: impl Into<Vec<u8>>) -> Result<Self, SasError> {
        Ok(Self {
            inner: CoreResponder::from_entropy(config, message)?,
        })
    }

    /// Receives the initiator's commitment and sends the responder's message
    /// and nonce.
    pub async fn send<C: Commitment>(
        self,
        io: &mut impl Duplex<SasMessage<C>>,
    ) -> Result<Responder<responder_state::Received<C>>, SasError> {
        let commit = expect_next::<SasMessage<C>, _>(io).await?.try_into_commit()?;
        debug!(role = "responder", "received commitment");
        let (inner, payload) = self.inner.send(commit)?;
        send(io, SasMessage::<C>::ResponderPayload(payload)).await?;
        debug!(role = "responder", "sent payload");
        Ok(Responder { inner })
    }

    /// Executes the SAS protocol to completion, returning the responder's pin.
    pub async fn execute<C: Commitment>(
        self,
        io: &mut impl Duplex<SasMessage<C>>,
    ) -> Result<Pin, SasError> {
        let responder = self.send::<C>(io).await?.open(io).await?;
        responder.check()
    }
}

impl<C: Commitment> Responder<responder_state::Received<C>> {
    /// Attempts to compute the pin before the initiator has revealed, which
    /// always fails.
    pub fn check(&self) -> Result<Pin, SasError> {
        Ok(self.inner.check()?)
    }

    /// Receives the initiator's decommitment.
    pub async fn open(
        self,
        io: &mut impl Duplex<SasMessage<C>>,
    ) -> Result<Responder<responder_state::Revealed<C>>, SasError> {
        let reveal = expect_next::<SasMessage<C>, _>(io).await?.try_into_reveal()?;
        debug!(role = "responder", "received decommitment");
        Ok(Responder {
            inner: self.inner.open(reveal)?,
        })
    }
}

impl<C: Commitment> Responder<responder_state::Revealed<C>> {
    /// Computes the responder's pin.
    pub fn check(&self) -> Result<Pin, SasError> {
        Ok(self.inner.check()?)
    }
}

/// Executes the SAS protocol as the initiator.
///
/// # Arguments
///
/// * `io` - The channel to the responder.
/// * `config` - The protocol configuration.
/// * `message` - The value to authenticate.
pub async fn sas_initiator<C: Commitment>(
    io: &mut impl Duplex<SasMessage<C>>,
    config: SasConfig,
    message: impl Into<Vec<u8>>,
) -> Result<Pin, SasError> {
    Initiator::from_entropy(config, message)?
        .execute::<C>(io)
        .await
}

/// Executes the SAS protocol as the responder.
///
/// # Arguments
///
/// * `io` - The channel to the initiator.
/// * `config` - The protocol configuration.
/// * `message` - The value to authenticate.
pub async fn sas_responder<C: Commitment>(
    io: &mut impl Duplex<SasMessage<C>>,
    config: SasConfig,
    message: impl Into<Vec<u8>>,
) -> Result<Pin, SasError> {
    Responder::from_entropy(config, message)?
        .execute::<C>(io)
        .await
}

/// Runs both parties of one exchange over an in-memory channel, returning the
/// initiator's pin and the responder's pin.
pub async fn pair<C: Commitment>(
    config: SasConfig,
    initiator_message: impl Into<Vec<u8>>,
    responder_message: impl Into<Vec<u8>>,
) -> Result<(Pin, Pin), SasError> {
    let (mut io_initiator, mut io_responder) = duplex::<SasMessage<C>>(8);

    futures::try_join!(
        sas_initiator::<C>(&mut io_initiator, config.clone(), initiator_message),
        sas_responder::<C>(&mut io_responder, config, responder_message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::executor::block_on;
    use rand_chacha::ChaCha12Rng;
    use rand_core::SeedableRng;
    use rstest::*;

    use crate::{
        commit::{CommitmentError, HashCommitment, IdealCommitment},
        io::MemoryDuplex,
        msgs::{CommitMessage, Message, ResponderPayload},
    };

    fn pair_many<C: Commitment>() {
        block_on(async {
            for _ in 0..64 {
                let (initiator_pin, responder_pin) =
                    pair::<C>(SasConfig::default(), "AlicePublicKey", "BobPublicKey")
                        .await
                        .unwrap();

                assert_eq!(initiator_pin.len(), 8);
                assert!(initiator_pin.as_str().bytes().all(|b| b.is_ascii_digit()));
                assert_eq!(initiator_pin, responder_pin);
            }
        });
    }

    #[rstest]
    #[case::ideal(pair_many::<IdealCommitment>)]
    #[case::hash(pair_many::<HashCommitment>)]
    fn test_pair(#[case] test: fn()) {
        test()
    }

    #[test]
    fn test_pair_matches_core_exchange() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let initiator_nonce = Nonce::random(&mut rng);
        let responder_nonce = Nonce::random(&mut rng);

        let (expected, _) = sas_core::exchange::exchange::<IdealCommitment>(
            sas_core::Initiator::new(SasConfig::default(), "AlicePublicKey", initiator_nonce),
            sas_core::Responder::new(SasConfig::default(), "BobPublicKey", responder_nonce),
            &mut rng,
        )
        .unwrap();

        let (mut io_initiator, mut io_responder) = duplex::<SasMessage<IdealCommitment>>(8);
        let (initiator_pin, responder_pin) = block_on(async {
            futures::try_join!(
                Initiator::new(SasConfig::default(), "AlicePublicKey", initiator_nonce)
                    .execute::<IdealCommitment>(&mut io_initiator),
                Responder::new(SasConfig::default(), "BobPublicKey", responder_nonce)
                    .execute::<IdealCommitment>(&mut io_responder),
            )
        })
        .unwrap();

        assert_eq!(initiator_pin, expected);
        assert_eq!(responder_pin, expected);
    }

    #[test]
    fn test_responder_check_before_reveal() {
        let (mut io_initiator, mut io_responder) = duplex::<SasMessage<IdealCommitment>>(8);

        block_on(async {
            let initiator = Initiator::from_entropy(SasConfig::default(), "AlicePublicKey")
                .unwrap()
                .commit::<IdealCommitment>(&mut io_initiator)
                .await
                .unwrap();
            let responder = Responder::from_entropy(SasConfig::default(), "BobPublicKey")
                .unwrap()
                .send::<IdealCommitment>(&mut io_responder)
                .await
                .unwrap();

            assert!(matches!(
                responder.check().unwrap_err(),
                SasError::Core(CoreError::Commitment(CommitmentError::Protected))
            ));

            let initiator = initiator
                .receive(&mut io_initiator)
                .await
                .unwrap()
                .reveal(&mut io_initiator)
                .await
                .unwrap();
            let responder = responder.open(&mut io_responder).await.unwrap();

            assert_eq!(initiator.check().unwrap(), responder.check().unwrap());
        });
    }

    #[test]
    fn test_unexpected_message() {
        let (mut io_peer, mut io_responder): (
            MemoryDuplex<SasMessage<IdealCommitment>>,
            MemoryDuplex<SasMessage<IdealCommitment>>,
        ) = duplex(8);

        let err = block_on(async {
            io::send(
                &mut io_peer,
                Message::ResponderPayload(ResponderPayload {
                    message: b"BobPublicKey".to_vec(),
                    nonce: Nonce::ZERO,
                }),
            )
            .await
            .unwrap();

            Responder::from_entropy(SasConfig::default(), "BobPublicKey")
                .unwrap()
                .execute::<IdealCommitment>(&mut io_responder)
                .await
                .unwrap_err()
        });

        assert!(matches!(
            err,
            SasError::Message(MessageError {
                expected: "Commit",
                actual: "ResponderPayload"
            })
        ));
    }

    #[test]
    fn test_opened_commitment_is_rejected() {
        let (mut io_peer, mut io_responder) = duplex::<SasMessage<IdealCommitment>>(8);
        let mut rng = ChaCha12Rng::seed_from_u64(1);

        let (commitment, decommitment) = IdealCommitment::commit(Nonce::random(&mut rng), &mut rng);
        let commitment = commitment.decommit(decommitment).unwrap();

        let err = block_on(async {
            io::send(
                &mut io_peer,
                Message::Commit(CommitMessage {
                    commitment,
                    message: b"AlicePublicKey".to_vec(),
                }),
            )
            .await
            .unwrap();

            Responder::from_entropy(SasConfig::default(), "BobPublicKey")
                .unwrap()
                .execute::<IdealCommitment>(&mut io_responder)
                .await
                .unwrap_err()
        });

        assert!(matches!(
            err,
            SasError::Core(CoreError::Commitment(CommitmentError::NotProtected))
        ));
    }

    #[test]
    fn test_peer_disconnects() {
        let (io_initiator, mut io_responder) = duplex::<SasMessage<IdealCommitment>>(8);
        drop(io_initiator);

        let err = block_on(
            Responder::from_entropy(SasConfig::default(), "BobPublicKey")
                .unwrap()
                .execute::<IdealCommitment>(&mut io_responder),
        )
        .unwrap_err();

        assert!(matches!(err, SasError::Io(_)));
    }
}
