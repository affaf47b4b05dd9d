//! Key management for Phantasma wallets
//!
//! A wallet identity is a 32-byte Ed25519 seed. At rest it travels as a WIF
//! string: Base58Check (4-byte double-SHA-256 checksum) over
//! `0x80 || seed || 0x01`, the compressed-key envelope inherited from the
//! Bitcoin ecosystem. [`PhantasmaKeys`] bundles the seed with the derived
//! public key and address so signing and identity checks need no further
//! derivation.
//!
//! Seed copies are scrubbed before their buffers are released; WIF strings
//! contain the seed and must be treated with the same care.

use base58::{FromBase58, ToBase58};
use phantasma_addresses::Address;
use phantasma_crypto::{
    hash::Hasher,
    key::ed25519::{PublicKey, SecretKey, Signature},
    memsec::Scrubbed as _,
};
use rand_core::{CryptoRng, RngCore};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid WIF format")]
    InvalidWif,

    #[error("WIF checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid Base58 character in WIF")]
    BadBase58,
}

const WIF_VERSION: u8 = 0x80;
const WIF_COMPRESSED_FLAG: u8 = 0x01;
const WIF_PAYLOAD_LENGTH: usize = 34;
const CHECKSUM_LENGTH: usize = 4;

fn base58check_encode(payload: &[u8]) -> String {
    let checksum = Hasher::double_sha256(payload);
    let mut buffer = Vec::with_capacity(payload.len() + CHECKSUM_LENGTH);
    buffer.extend_from_slice(payload);
    buffer.extend_from_slice(&checksum[..CHECKSUM_LENGTH]);
    let encoded = buffer.to_base58();
    buffer.scrub();
    encoded
}

fn base58check_decode(text: &str) -> Result<Vec<u8>, Error> {
    let mut decoded = text.from_base58().map_err(|_| Error::BadBase58)?;
    if decoded.len() < CHECKSUM_LENGTH {
        decoded.scrub();
        return Err(Error::InvalidWif);
    }
    let split = decoded.len() - CHECKSUM_LENGTH;
    let expected = Hasher::double_sha256(&decoded[..split]);
    if decoded[split..] != expected[..CHECKSUM_LENGTH] {
        decoded.scrub();
        return Err(Error::ChecksumMismatch);
    }
    decoded.truncate(split);
    Ok(decoded)
}

/// A seed plus everything derived from it.
pub struct PhantasmaKeys {
    secret: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl PhantasmaKeys {
    /// Wrap a raw 32-byte seed.
    pub fn from_seed(seed: [u8; SecretKey::SIZE]) -> Self {
        let secret = SecretKey::from(seed);
        let public_key = secret.public_key();
        let address = Address::from_key(&public_key);
        Self {
            secret,
            public_key,
            address,
        }
    }

    /// Generate a fresh identity from the given random number generator.
    pub fn generate<Rng>(rng: Rng) -> Self
    where
        Rng: RngCore + CryptoRng,
    {
        let secret = SecretKey::new(rng);
        let public_key = secret.public_key();
        let address = Address::from_key(&public_key);
        Self {
            secret,
            public_key,
            address,
        }
    }

    /// Import a WIF string, verifying the envelope and checksum.
    pub fn from_wif(wif: &str) -> Result<Self, Error> {
        if wif.is_empty() {
            return Err(Error::InvalidWif);
        }
        let mut payload = base58check_decode(wif)?;
        let valid = payload.len() == WIF_PAYLOAD_LENGTH
            && payload[0] == WIF_VERSION
            && payload[WIF_PAYLOAD_LENGTH - 1] == WIF_COMPRESSED_FLAG;
        if !valid {
            payload.scrub();
            return Err(Error::InvalidWif);
        }
        let mut seed = [0u8; SecretKey::SIZE];
        seed.copy_from_slice(&payload[1..1 + SecretKey::SIZE]);
        payload.scrub();
        let keys = Self::from_seed(seed);
        seed.scrub();
        Ok(keys)
    }

    /// Export the seed as a WIF string. The result contains the secret.
    pub fn to_wif(&self) -> String {
        let mut payload = [0u8; WIF_PAYLOAD_LENGTH];
        payload[0] = WIF_VERSION;
        payload[WIF_PAYLOAD_LENGTH - 1] = WIF_COMPRESSED_FLAG;
        let mut seed = unsafe { SecretKey::leak_into_bytes(self.secret.clone()) };
        payload[1..1 + SecretKey::SIZE].copy_from_slice(&seed);
        seed.scrub();
        let encoded = base58check_encode(&payload);
        payload.scrub();
        encoded
    }

    /// Sign the exact message bytes with this identity's seed.
    pub fn sign<T>(&self, message: T) -> Signature
    where
        T: AsRef<[u8]>,
    {
        self.secret.sign(message)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl std::fmt::Debug for PhantasmaKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhantasmaKeys")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
