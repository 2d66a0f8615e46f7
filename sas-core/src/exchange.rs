//! Local four-step exchange between an initiator and a responder.

use rand::{CryptoRng, Rng};

use crate::{commit::Commitment, pin::Pin, Initiator, Responder, SasError};

/// Runs the exchange between two local parties in protocol order, returning
/// the initiator's pin and the responder's pin.
///
/// Each delivery moves an owned message from one party to the other.
pub fn exchange<C: Commitment>(
    initiator: Initiator,
    responder: Responder,
    rng: &mut (impl Rng + CryptoRng + ?Sized),
) -> Result<(Pin, Pin), SasError> {
    let (initiator, commit) = initiator.commit::<C>(rng);
    let (responder, payload) = responder.send(commit)?;
    let (initiator, reveal) = initiator.receive(payload).reveal();
    let responder = responder.open(reveal)?;

    Ok((initiator.check()?, responder.check()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand::thread_rng;
    use rand_chacha::ChaCha12Rng;
    use rand_core::SeedableRng;
    use rstest::*;

    use crate::{
        commit::{CommitmentError, HashCommitment, IdealCommitment},
        msgs::CommitMessage,
        pin::PinError,
        Nonce, SasConfig,
    };

    const ALICE: &[u8] = b"AlicePublicKey";
    const BOB: &[u8] = b"BobPublicKey";

    fn is_pin(pin: &Pin, len: usize) -> bool {
        pin.len() == len && pin.as_str().bytes().all(|b| b.is_ascii_digit())
    }

    fn pins_always_match<C: Commitment>() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        for _ in 0..256 {
            let initiator = Initiator::new(SasConfig::default(), ALICE, Nonce::random(&mut rng));
            let responder = Responder::new(SasConfig::default(), BOB, Nonce::random(&mut rng));

            let (initiator_pin, responder_pin) =
                exchange::<C>(initiator, responder, &mut rng).unwrap();

            assert!(is_pin(&initiator_pin, 8));
            assert_eq!(initiator_pin, responder_pin);
        }
    }

    #[rstest]
    #[case::ideal(pins_always_match::<IdealCommitment>)]
    #[case::hash(pins_always_match::<HashCommitment>)]
    fn test_pins_always_match(#[case] test: fn()) {
        test()
    }

    #[test]
    fn test_pins_match_with_os_entropy() {
        for _ in 0..32 {
            let initiator = Initiator::from_entropy(SasConfig::default(), ALICE).unwrap();
            let responder = Responder::from_entropy(SasConfig::default(), BOB).unwrap();

            let (initiator_pin, responder_pin) =
                exchange::<IdealCommitment>(initiator, responder, &mut thread_rng()).unwrap();

            assert_eq!(initiator_pin, responder_pin);
        }
    }

    #[test]
    fn test_pin_binds_messages() {
        let a = Nonce::new([1; 16]);
        let b = Nonce::new([2; 16]);
        let mut rng = thread_rng();

        let (pin, _) = exchange::<IdealCommitment>(
            Initiator::new(SasConfig::default(), ALICE, a),
            Responder::new(SasConfig::default(), BOB, b),
            &mut rng,
        )
        .unwrap();
        let (swapped, _) = exchange::<IdealCommitment>(
            Initiator::new(SasConfig::default(), BOB, a),
            Responder::new(SasConfig::default(), ALICE, b),
            &mut rng,
        )
        .unwrap();
        let (same, _) = exchange::<HashCommitment>(
            Initiator::new(SasConfig::default(), ALICE, a),
            Responder::new(SasConfig::default(), BOB, b),
            &mut rng,
        )
        .unwrap();

        assert_ne!(pin, swapped);
        assert_eq!(pin, same);
    }

    #[test]
    fn test_check_before_reveal_is_protected() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let initiator = Initiator::new(SasConfig::default(), ALICE, Nonce::random(&mut rng));
        let responder = Responder::new(SasConfig::default(), BOB, Nonce::random(&mut rng));

        let (initiator, commit) = initiator.commit::<IdealCommitment>(&mut rng);
        let (responder, payload) = responder.send(commit).unwrap();

        let err = responder.check().unwrap_err();
        assert!(matches!(
            err,
            SasError::Commitment(CommitmentError::Protected)
        ));

        // still protected after the initiator received the payload
        let initiator = initiator.receive(payload);
        assert!(matches!(
            responder.check().unwrap_err(),
            SasError::Commitment(CommitmentError::Protected)
        ));

        let (initiator, reveal) = initiator.reveal();
        let responder = responder.open(reveal).unwrap();

        assert_eq!(initiator.check().unwrap(), responder.check().unwrap());
    }

    #[test]
    fn test_hash_commitment_rejects_substituted_reveal() {
        let mut rng = ChaCha12Rng::seed_from_u64(2);
        let initiator = Initiator::new(SasConfig::default(), ALICE, Nonce::random(&mut rng));
        let responder = Responder::new(SasConfig::default(), BOB, Nonce::random(&mut rng));
        let other = Initiator::new(SasConfig::default(), ALICE, Nonce::random(&mut rng));

        let (_, commit) = initiator.commit::<HashCommitment>(&mut rng);
        let (responder, payload) = responder.send(commit).unwrap();

        let (other, _) = other.commit::<HashCommitment>(&mut rng);
        let (_, forged) = other.receive(payload).reveal();

        assert!(matches!(
            responder.open(forged).unwrap_err(),
            SasError::Commitment(CommitmentError::InvalidDecommitment)
        ));
    }

    fn opened_commitment_is_rejected<C: Commitment>() {
        let mut rng = ChaCha12Rng::seed_from_u64(4);
        let responder = Responder::new(SasConfig::default(), BOB, Nonce::random(&mut rng));

        let (commitment, decommitment) = C::commit(Nonce::random(&mut rng), &mut rng);
        let commit = CommitMessage {
            commitment: commitment.decommit(decommitment).unwrap(),
            message: ALICE.to_vec(),
        };

        assert!(matches!(
            responder.send(commit).unwrap_err(),
            SasError::Commitment(CommitmentError::NotProtected)
        ));
    }

    #[rstest]
    #[case::ideal(opened_commitment_is_rejected::<IdealCommitment>)]
    #[case::hash(opened_commitment_is_rejected::<HashCommitment>)]
    fn test_opened_commitment_is_rejected(#[case] test: fn()) {
        test()
    }

    #[test]
    fn test_check_before_reveal_with_received_snapshot() {
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let responder = Responder::new(SasConfig::default(), BOB, Nonce::random(&mut rng));

        // A value followed by an "opened" flag byte.
        let mut bytes = vec![7u8; Nonce::LEN];
        bytes.push(0);
        let commit = CommitMessage {
            commitment: bincode::deserialize::<IdealCommitment>(&bytes).unwrap(),
            message: ALICE.to_vec(),
        };

        let (responder, _) = responder.send(commit).unwrap();

        assert!(matches!(
            responder.check().unwrap_err(),
            SasError::Commitment(CommitmentError::Protected)
        ));
    }

    #[rstest]
    #[case(1)]
    #[case(6)]
    #[case(32)]
    fn test_pin_length(#[case] pin_length: usize) {
        let config = SasConfig::builder().pin_length(pin_length).build().unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(3);

        let (initiator_pin, responder_pin) = exchange::<IdealCommitment>(
            Initiator::new(config.clone(), ALICE, Nonce::random(&mut rng)),
            Responder::new(config, BOB, Nonce::random(&mut rng)),
            &mut rng,
        )
        .unwrap();

        assert!(is_pin(&initiator_pin, pin_length));
        assert_eq!(initiator_pin, responder_pin);
    }

    #[test]
    fn test_pin_error_is_surfaced() {
        let err = SasError::from(PinError::DigestTooShort {
            expected: 8,
            actual: 4,
        });

        assert_eq!(err.to_string(), "digest too short: need 8 bytes, got 4");
    }
}
