use rand::{CryptoRng, Rng};

use crate::{
    commit::Commitment,
    msgs::{CommitMessage, ResponderPayload, RevealMessage},
    pin::{derive_pin, Pin},
    Nonce, SasConfig, SasError,
};

/// A SAS initiator.
///
/// The initiator commits to its nonce before it sees the responder's nonce,
/// and reveals it afterwards.
#[derive(Debug)]
pub struct Initiator<S: initiator_state::State = initiator_state::Initialized> {
    config: SasConfig,
    state: S,
}

impl Initiator {
    /// Creates a new initiator.
    ///
    /// # Arguments
    ///
    /// * `config` - The protocol configuration.
    /// * `message` - The value to authenticate, e.g. a public key fingerprint.
    /// * `nonce` - A fresh random nonce, never reused across runs.
    pub fn new(config: SasConfig, message: impl Into<Vec<u8>>, nonce: Nonce) -> Self {
        Self {
            config,
            state: initiator_state::Initialized {
                nonce,
                message: message.into(),
            },
        }
    }

    /// Creates a new initiator with a nonce drawn from the OS entropy source.
    pub fn from_entropy(config: SasConfig, message: impl Into<Vec<u8>>) -> Result<Self, SasError> {
        Ok(Self::new(config, message, Nonce::from_entropy()?))
    }

    /// Commits to the initiator's nonce, returning the message for the responder.
    pub fn commit<C: Commitment>(
        self,
        rng: &mut (impl Rng + CryptoRng + ?Sized),
    ) -> (Initiator<initiator_state::Committed<C>>, CommitMessage<C>) {
        let initiator_state::Initialized { nonce, message } = self.state;

        let (commitment, decommitment) = C::commit(nonce, rng);

        (
            Initiator {
                config: self.config,
                state: initiator_state::Committed {
                    nonce,
                    message: message.clone(),
                    decommitment,
                },
            },
            CommitMessage {
                commitment,
                message,
            },
        )
    }
}

impl<C: Commitment> Initiator<initiator_state::Committed<C>> {
    /// Receives the responder's message and nonce.
    pub fn receive(self, payload: ResponderPayload) -> Initiator<initiator_state::Received<C>> {
        let initiator_state::Committed {
            nonce,
            message,
            decommitment,
        } = self.state;

        Initiator {
            config: self.config,
            state: initiator_state::Received {
                nonce,
                message,
                peer_message: payload.message,
                peer_nonce: payload.nonce,
                decommitment,
            },
        }
    }
}

impl<C: Commitment> Initiator<initiator_state::Received<C>> {
    /// Reveals the initiator's nonce, returning the decommitment for the responder.
    pub fn reveal(
        self,
    ) -> (
        Initiator<initiator_state::Revealed>,
        RevealMessage<C::Decommitment>,
    ) {
        let initiator_state::Received {
            nonce,
            message,
            peer_message,
            peer_nonce,
            decommitment,
        } = self.state;

        (
            Initiator {
                config: self.config,
                state: initiator_state::Revealed {
                    nonce,
                    message,
                    peer_message,
                    peer_nonce,
                },
            },
            RevealMessage { decommitment },
        )
    }
}

impl Initiator<initiator_state::Revealed> {
    /// Computes the initiator's pin.
    pub fn check(&self) -> Result<Pin, SasError> {
        let initiator_state::Revealed {
            nonce,
            message,
            peer_message,
            peer_nonce,
        } = &self.state;

        Ok(derive_pin(
            *nonce,
            *peer_nonce,
            message,
            peer_message,
            self.config.pin_length(),
        )?)
    }
}

/// SAS initiator state.
pub mod initiator_state {
    use std::fmt;

    use super::*;

    mod sealed {
        use super::*;

        pub trait Sealed {}

        impl Sealed for Initialized {}
        impl<C: Commitment> Sealed for Committed<C> {}
        impl<C: Commitment> Sealed for Received<C> {}
        impl Sealed for Revealed {}
    }

    /// The initiator's state.
    pub trait State: sealed::Sealed {}

    /// The initiator's initial state.
    pub struct Initialized {
        pub(super) nonce: Nonce,
        pub(super) message: Vec<u8>,
    }

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The initiator's state after committing to its nonce.
    pub struct Committed<C: Commitment> {
        pub(super) nonce: Nonce,
        pub(super) message: Vec<u8>,
        pub(super) decommitment: C::Decommitment,
    }

    impl<C: Commitment> State for Committed<C> {}

    impl<C: Commitment> fmt::Debug for Committed<C> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Committed { ... }")
        }
    }

    /// The initiator's state after receiving the responder's payload.
    pub struct Received<C: Commitment> {
        pub(super) nonce: Nonce,
        pub(super) message: Vec<u8>,
        pub(super) peer_message: Vec<u8>,
        pub(super) peer_nonce: Nonce,
        pub(super) decommitment: C::Decommitment,
    }

    impl<C: Commitment> State for Received<C> {}

    impl<C: Commitment> fmt::Debug for Received<C> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Received { ... }")
        }
    }

    /// The initiator's state after revealing its nonce.
    pub struct Revealed {
        pub(super) nonce: Nonce,
        pub(super) message: Vec<u8>,
        pub(super) peer_message: Vec<u8>,
        pub(super) peer_nonce: Nonce,
    }

    impl State for Revealed {}

    opaque_debug::implement!(Revealed);
}
