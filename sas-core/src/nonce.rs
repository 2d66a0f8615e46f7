use cipher::{consts::U16, generic_array::GenericArray};
use rand::{distributions::Standard, prelude::Distribution, rngs::OsRng, CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};

/// A 128-bit nonce, one AES block.
#[repr(transparent)]
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce([u8; 16]);

opaque_debug::implement!(Nonce);

impl Nonce {
    /// The length of a nonce in bytes
    pub const LEN: usize = 16;
    /// A zero nonce
    pub const ZERO: Self = Self([0; 16]);

    /// Create a new nonce
    #[inline]
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the byte representation of the nonce
    #[inline]
    pub fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Generate a random nonce using the provided RNG
    #[inline]
    pub fn random<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen())
    }

    /// Generate a random nonce from the operating system's entropy source.
    ///
    /// There is no fallback: if the OS source is unavailable the error is
    /// returned and the run must be abandoned.
    pub fn from_entropy() -> Result<Self, rand::Error> {
        let mut bytes = [0u8; 16];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 16]> for Nonce {
    #[inline]
    fn from(bytes: [u8; 16]) -> Self {
        Nonce::new(bytes)
    }
}

impl<'a> TryFrom<&'a [u8]> for Nonce {
    type Error = <[u8; 16] as TryFrom<&'a [u8]>>::Error;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        <[u8; 16]>::try_from(value).map(Self::from)
    }
}

impl From<Nonce> for GenericArray<u8, U16> {
    #[inline]
    fn from(n: Nonce) -> Self {
        n.0.into()
    }
}

impl From<GenericArray<u8, U16>> for Nonce {
    #[inline]
    fn from(n: GenericArray<u8, U16>) -> Self {
        Nonce::new(n.into())
    }
}

impl From<Nonce> for [u8; 16] {
    #[inline]
    fn from(n: Nonce) -> Self {
        n.0
    }
}

impl AsRef<[u8]> for Nonce {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Distribution<Nonce> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Nonce {
        Nonce::new(rng.gen())
    }
}
