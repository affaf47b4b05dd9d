//! The legacy Phantasma transaction
//!
//! Wire layout, fields in order: VarString nexus, VarString chain, VarInt
//! framed script, u32 expiration seconds, VarInt framed payload, and — in
//! the signed form only — a VarInt count of signatures followed by each
//! signature. The transaction hash is the SHA-256 of the unsigned
//! serialization and is refreshed whenever the content changes.

use phantasma_addresses::Address;
use phantasma_codec::{
    legacy::{read_var_bytes, read_var_int, read_var_string, write_var_bytes, write_var_int,
        write_var_string},
    Bytes64, ReadView, WriteView,
};
use phantasma_crypto::{hash::Hash, hash::Hasher, key::ed25519::PublicKey};
use phantasma_primitives::signature::Signature;
use phantasma_wallet::PhantasmaKeys;

use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    nexus_name: String,
    chain_name: String,
    script: Vec<u8>,
    expiration: u32,
    payload: Vec<u8>,
    signatures: Vec<Signature>,
    hash: Hash<32>,
}

impl Transaction {
    /// Transactions are always created unsigned; call [`Transaction::sign`]
    /// to attach signatures.
    pub fn new(
        nexus_name: &str,
        chain_name: &str,
        script: Vec<u8>,
        expiration: u32,
        payload: Vec<u8>,
    ) -> Result<Self, Error> {
        if script.is_empty() {
            return Err(Error::EmptyScript);
        }
        let mut tx = Self {
            nexus_name: nexus_name.to_string(),
            chain_name: chain_name.to_string(),
            script,
            expiration,
            payload,
            signatures: Vec::new(),
            hash: Hash::default(),
        };
        tx.update_hash();
        Ok(tx)
    }

    pub fn nexus_name(&self) -> &str {
        &self.nexus_name
    }

    pub fn chain_name(&self) -> &str {
        &self.chain_name
    }

    pub fn script(&self) -> &[u8] {
        &self.script
    }

    pub fn expiration(&self) -> u32 {
        self.expiration
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn hash(&self) -> &Hash<32> {
        &self.hash
    }

    pub fn has_signatures(&self) -> bool {
        !self.signatures.is_empty()
    }

    fn serialize(&self, w: &mut WriteView, with_signatures: bool) -> Result<(), Error> {
        write_var_string(w, &self.nexus_name);
        write_var_string(w, &self.chain_name);
        write_var_bytes(w, &self.script);
        w.write_u32(self.expiration);
        write_var_bytes(w, &self.payload);

        if with_signatures {
            write_var_int(w, self.signatures.len() as u64);
            for signature in &self.signatures {
                signature.write(w)?;
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self, with_signatures: bool) -> Result<Vec<u8>, Error> {
        let mut w = WriteView::new();
        self.serialize(&mut w, with_signatures)?;
        Ok(w.into_inner())
    }

    fn update_hash(&mut self) {
        // the unsigned serialization of a constructed transaction cannot
        // fail: only unwritable signature kinds do, and they are excluded
        let mut w = WriteView::new();
        if self.serialize(&mut w, false).is_ok() {
            self.hash = Hasher::sha256(w.as_slice());
        }
    }

    /// Append an Ed25519 signature over the unsigned serialization.
    pub fn sign(&mut self, keys: &PhantasmaKeys) -> Result<(), Error> {
        let message = self.to_bytes(false)?;
        let signature = keys.sign(&message);
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(signature.as_ref());
        self.signatures.push(Signature::Ed25519(Bytes64::new(bytes)));
        Ok(())
    }

    pub fn is_signed_by(&self, addresses: &[Address]) -> bool {
        if !self.has_signatures() {
            return false;
        }
        let message = match self.to_bytes(false) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        self.signatures.iter().any(|signature| {
            let Signature::Ed25519(bytes) = signature else {
                return false;
            };
            let Ok(sig) =
                phantasma_crypto::key::ed25519::Signature::try_from(bytes.as_ref())
            else {
                return false;
            };
            addresses.iter().any(|address| {
                address.is_user()
                    && PublicKey::try_from(address.payload().as_ref())
                        .map(|key| key.verify(&message, &sig))
                        .unwrap_or(false)
            })
        })
    }

    /// Grind a nonce into the payload until the hash difficulty reaches
    /// `target_difficulty` (0 disables mining, 256 is the ceiling). Must be
    /// called before signing, since it rewrites the payload.
    pub fn mine(&mut self, target_difficulty: u32) -> Result<(), Error> {
        if target_difficulty > 256 {
            return Err(Error::InvalidDifficulty);
        }
        if self.has_signatures() {
            return Err(Error::AlreadySigned);
        }
        if target_difficulty == 0 {
            return Ok(()); // no mining necessary
        }

        let mut nonce: u32 = 0;
        let mut payload_size = 4usize;

        loop {
            if self.hash.difficulty() >= target_difficulty {
                return Ok(());
            }

            if nonce == 0 {
                if self.payload.is_empty() {
                    self.payload = vec![0u8; 4];
                } else {
                    payload_size = self.payload.len() + 5;
                    self.payload.resize(payload_size, 0);
                }
            }

            nonce = match nonce.checked_add(1) {
                Some(next) => next,
                None => return Err(Error::MiningFailed),
            };

            self.payload[payload_size - 4..].copy_from_slice(&nonce.to_le_bytes());
            self.update_hash();
        }
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut r = ReadView::new(bytes);
        let nexus_name = read_var_string(&mut r)?;
        let chain_name = read_var_string(&mut r)?;
        let script = read_var_bytes(&mut r)?;
        let expiration = r.read_u32();
        r.result().map_err(Error::Codec)?;
        let payload = read_var_bytes(&mut r)?;

        // the signature section is optional; a malformed or absent tail
        // leaves the transaction unsigned, as the original reader does
        let signatures = if r.finished() {
            Vec::new()
        } else {
            read_signatures(&mut r).unwrap_or_default()
        };

        let mut tx = Self {
            nexus_name,
            chain_name,
            script,
            expiration,
            payload,
            signatures,
            hash: Hash::default(),
        };
        tx.update_hash();
        Ok(tx)
    }
}

fn read_signatures(r: &mut ReadView) -> Result<Vec<Signature>, Error> {
    let count = read_var_int(r)?;
    let mut signatures = Vec::with_capacity((count as usize).min(r.remaining()));
    for _ in 0..count {
        signatures.push(Signature::read(r)?);
    }
    Ok(signatures)
}
