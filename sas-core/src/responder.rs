use crate::{
    commit::{Commitment, CommitmentError},
    msgs::{CommitMessage, ResponderPayload, RevealMessage},
    pin::{derive_pin, Pin},
    Nonce, SasConfig, SasError,
};

/// A SAS responder.
///
/// The responder sends its nonce in the clear once it holds the initiator's
/// commitment, and can only compute its pin after the initiator reveals.
#[derive(Debug)]
pub struct Responder<S: responder_state::State = responder_state::Initialized> {
    config: SasConfig,
    state: S,
}

impl Responder {
    /// Creates a new responder.
    ///
    /// # Arguments
    ///
    /// * `config` - The protocol configuration.
    /// * `message` - The value to authenticate, e.g. a public key fingerprint.
    /// * `nonce` - A fresh random nonce, never reused across runs.
    pub fn new(config: SasConfig, message: impl Into<Vec<u8>>, nonce: Nonce) -> Self {
        Self {
            config,
            state: responder_state::Initialized {
                nonce,
                message: message.into(),
            },
        }
    }

    /// Creates a new responder with a nonce drawn from the OS entropy source.
    pub fn from_entropy(config: SasConfig, message: impl Into<Vec<u8>>) -> Result<Self, SasError> {
        Ok(Self::new(config, message, Nonce::from_entropy()?))
    }

    /// Receives the initiator's commitment and sends the responder's message
    /// and nonce.
    ///
    /// Fails with [`CommitmentError::NotProtected`] if the commitment is
    /// already opened.
    pub fn send<C: Commitment>(
        self,
        commit: CommitMessage<C>,
    ) -> Result<(Responder<responder_state::Received<C>>, ResponderPayload), SasError> {
        if !commit.commitment.is_protected() {
            return Err(CommitmentError::NotProtected.into());
        }

        let responder_state::Initialized { nonce, message } = self.state;

        Ok((
            Responder {
                config: self.config,
                state: responder_state::Received {
                    nonce,
                    message: message.clone(),
                    peer_message: commit.message,
                    commitment: commit.commitment,
                },
            },
            ResponderPayload { message, nonce },
        ))
    }
}

impl<C: Commitment> Responder<responder_state::Received<C>> {
    /// Attempts to compute the pin before the initiator has revealed.
    ///
    /// The initiator's commitment is still protected, so this always fails
    /// with [`CommitmentError::Protected`].
    pub fn check(&self) -> Result<Pin, SasError> {
        let responder_state::Received {
            nonce,
            message,
            peer_message,
            commitment,
        } = &self.state;

        responder_pin(&self.config, *nonce, message, peer_message, commitment)
    }

    /// Applies the initiator's decommitment.
    pub fn open(
        self,
        reveal: RevealMessage<C::Decommitment>,
    ) -> Result<Responder<responder_state::Revealed<C>>, SasError> {
        let responder_state::Received {
            nonce,
            message,
            peer_message,
            commitment,
        } = self.state;

        let commitment = commitment.decommit(reveal.decommitment)?;

        Ok(Responder {
            config: self.config,
            state: responder_state::Revealed {
                nonce,
                message,
                peer_message,
                commitment,
            },
        })
    }
}

impl<C: Commitment> Responder<responder_state::Revealed<C>> {
    /// Computes the responder's pin.
    pub fn check(&self) -> Result<Pin, SasError> {
        let responder_state::Revealed {
            nonce,
            message,
            peer_message,
            commitment,
        } = &self.state;

        responder_pin(&self.config, *nonce, message, peer_message, commitment)
    }
}

fn responder_pin<C: Commitment>(
    config: &SasConfig,
    nonce: Nonce,
    message: &[u8],
    peer_message: &[u8],
    commitment: &C,
) -> Result<Pin, SasError> {
    let peer_nonce = commitment.open()?;

    Ok(derive_pin(
        peer_nonce,
        nonce,
        peer_message,
        message,
        config.pin_length(),
    )?)
}

/// SAS responder state.
pub mod responder_state {
    use std::fmt;

    use super::*;

    mod sealed {
        use super::*;

        pub trait Sealed {}

        impl Sealed for Initialized {}
        impl<C: Commitment> Sealed for Received<C> {}
        impl<C: Commitment> Sealed for Revealed<C> {}
    }

    /// The responder's state.
    pub trait State: sealed::Sealed {}

    /// The responder's initial state.
    pub struct Initialized {
        pub(super) nonce: Nonce,
        pub(super) message: Vec<u8>,
    }

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The responder's state after receiving the initiator's commitment.
    pub struct Received<C: Commitment> {
        pub(super) nonce: Nonce,
        pub(super) message: Vec<u8>,
        pub(super) peer_message: Vec<u8>,
        pub(super) commitment: C,
    }

    impl<C: Commitment> State for Received<C> {}

    impl<C: Commitment> fmt::Debug for Received<C> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Received { ... }")
        }
    }

    /// The responder's state after the initiator revealed its nonce.
    pub struct Revealed<C: Commitment> {
        pub(super) nonce: Nonce,
        pub(super) message: Vec<u8>,
        pub(super) peer_message: Vec<u8>,
        pub(super) commitment: C,
    }

    impl<C: Commitment> State for Revealed<C> {}

    impl<C: Commitment> fmt::Debug for Revealed<C> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Revealed { ... }")
        }
    }
}
