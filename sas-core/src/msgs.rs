//! SAS protocol messages.

use serde::{Deserialize, Serialize};

use crate::{commit::Commitment, Nonce};

/// A SAS protocol message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Message<C, D> {
    Commit(CommitMessage<C>),
    ResponderPayload(ResponderPayload),
    Reveal(RevealMessage<D>),
}

/// The message type for a commitment scheme.
pub type SasMessage<C> = Message<C, <C as Commitment>::Decommitment>;

/// A message of the wrong kind was received.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unexpected message: expected {expected}, got {actual}")]
pub struct MessageError {
    /// The expected message kind.
    pub expected: &'static str,
    /// The received message kind.
    pub actual: &'static str,
}

impl<C, D> Message<C, D> {
    /// Returns the name of the message variant.
    pub fn name(&self) -> &'static str {
        match self {
            Message::Commit(_) => "Commit",
            Message::ResponderPayload(_) => "ResponderPayload",
            Message::Reveal(_) => "Reveal",
        }
    }

    /// Returns the initiator's commitment message.
    pub fn try_into_commit(self) -> Result<CommitMessage<C>, MessageError> {
        match self {
            Message::Commit(msg) => Ok(msg),
            other => Err(other.unexpected("Commit")),
        }
    }

    /// Returns the responder's payload.
    pub fn try_into_responder_payload(self) -> Result<ResponderPayload, MessageError> {
        match self {
            Message::ResponderPayload(msg) => Ok(msg),
            other => Err(other.unexpected("ResponderPayload")),
        }
    }

    /// Returns the initiator's decommitment message.
    pub fn try_into_reveal(self) -> Result<RevealMessage<D>, MessageError> {
        match self {
            Message::Reveal(msg) => Ok(msg),
            other => Err(other.unexpected("Reveal")),
        }
    }

    fn unexpected(&self, expected: &'static str) -> MessageError {
        MessageError {
            expected,
            actual: self.name(),
        }
    }
}

/// The initiator's commitment and message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitMessage<C> {
    /// The commitment to the initiator's nonce.
    pub commitment: C,
    /// The initiator's message.
    pub message: Vec<u8>,
}

/// The responder's message and nonce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderPayload {
    /// The responder's message.
    pub message: Vec<u8>,
    /// The responder's nonce, in the clear.
    pub nonce: Nonce,
}

/// The initiator's decommitment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealMessage<D> {
    /// The decommitment to the initiator's nonce.
    pub decommitment: D,
}

impl<C, D> From<CommitMessage<C>> for Message<C, D> {
    fn from(msg: CommitMessage<C>) -> Self {
        Message::Commit(msg)
    }
}

impl<C, D> From<ResponderPayload> for Message<C, D> {
    fn from(msg: ResponderPayload) -> Self {
        Message::ResponderPayload(msg)
    }
}

impl<C, D> From<RevealMessage<D>> for Message<C, D> {
    fn from(msg: RevealMessage<D>) -> Self {
        Message::Reveal(msg)
    }
}
