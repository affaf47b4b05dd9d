//! Interact with Phantasma addresses
//!
//! An address is 34 bytes: one kind byte, one reserved byte (always zero on
//! this chain), and a 32-byte payload. User addresses carry an Ed25519
//! public key as the payload; system addresses carry the SHA-256 of a
//! contract name, which is how contracts are addressed by the script
//! builder.
//!
//! The text form is the literal character `P` followed by the plain Base58
//! encoding of the 34 bytes — no checksum, unlike WIF. A pure null address
//! renders as the fixed literal `[Null address]` and does not decode.

use std::{fmt, str::FromStr};

use base58::{FromBase58, ToBase58};
use phantasma_codec::Bytes32;
use phantasma_crypto::{hash::Hasher, key::ed25519::PublicKey};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("error decoding base58 value")]
    BadBase58,

    #[error("unknown or bad string format for address {0}")]
    UnknownStringFormat(String),

    #[error("address kind is invalid {0:#04x}")]
    InvalidKind(u8),

    #[error("invalid address length {0}")]
    InvalidLength(usize),
}

/// The first byte of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    System,
    User,
    Interop,
}

impl AddressKind {
    pub fn to_byte(self) -> u8 {
        match self {
            AddressKind::System => 0,
            AddressKind::User => 1,
            AddressKind::Interop => 2,
        }
    }

    pub fn from_byte(b: u8) -> Result<Self, Error> {
        match b {
            0 => Ok(AddressKind::System),
            1 => Ok(AddressKind::User),
            2 => Ok(AddressKind::Interop),
            other => Err(Error::InvalidKind(other)),
        }
    }
}

/// A 34-byte Phantasma address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; Self::LENGTH]);

impl Address {
    pub const LENGTH: usize = 34;

    /// The sentinel rendering of an all-zero address.
    pub const NULL_TEXT: &'static str = "[Null address]";

    /// The all-zero address.
    pub fn null() -> Self {
        Self([0; Self::LENGTH])
    }

    /// A user address wrapping an Ed25519 public key.
    pub fn from_key(public_key: &PublicKey) -> Self {
        let mut bytes = [0u8; Self::LENGTH];
        bytes[0] = AddressKind::User.to_byte();
        bytes[2..].copy_from_slice(public_key.as_ref());
        Self(bytes)
    }

    /// A system address for a named contract: the payload is the SHA-256 of
    /// the name.
    pub fn from_contract_name(name: &str) -> Self {
        let mut bytes = [0u8; Self::LENGTH];
        bytes[0] = AddressKind::System.to_byte();
        bytes[2..].copy_from_slice(Hasher::sha256(name.as_bytes()).as_ref());
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::LENGTH {
            return Err(Error::InvalidLength(bytes.len()));
        }
        AddressKind::from_byte(bytes[0])?;
        let mut out = [0u8; Self::LENGTH];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Parse the text form. The null sentinel does not decode.
    pub fn from_text(text: &str) -> Result<Self, Error> {
        let encoded = text
            .strip_prefix('P')
            .ok_or_else(|| Error::UnknownStringFormat(text.to_string()))?;
        let bytes = encoded.from_base58().map_err(|_| Error::BadBase58)?;
        Self::from_bytes(&bytes).map_err(|_| Error::UnknownStringFormat(text.to_string()))
    }

    pub fn is_valid_address(text: &str) -> bool {
        Self::from_text(text).is_ok()
    }

    pub fn kind(&self) -> AddressKind {
        // the constructor already rejected unknown kind bytes
        match self.0[0] {
            0 => AddressKind::System,
            1 => AddressKind::User,
            _ => AddressKind::Interop,
        }
    }

    pub fn is_null(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn is_user(&self) -> bool {
        self.0[0] == AddressKind::User.to_byte()
    }

    pub fn is_system(&self) -> bool {
        self.0[0] == AddressKind::System.to_byte()
    }

    /// The 32-byte payload: a public key for user addresses, a name hash
    /// for system addresses. This is the form Carbon messages carry.
    pub fn payload(&self) -> Bytes32 {
        Bytes32::padded(&self.0[2..])
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.0
    }

    /// The canonical text form, `'P' + base58(bytes)`.
    pub fn text(&self) -> String {
        format!("P{}", self.0.to_base58())
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::null()
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str(Self::NULL_TEXT)
        } else {
            f.write_str(&self.text())
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&self.to_string()).finish()
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

#[cfg(feature = "json")]
impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "json")]
impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        Address::from_text(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_TEXT: &str = "P2KFEyFevpQfSaW8G4VjSmhWUZXR4QrG9YQR1HbMpTUCpCL";
    const FIXTURE_KEY: &str = "aa53be71fc41bc0889b694f4d6d03f7906a3d9a21705943caf9632eeafbb4895";

    fn fixture_key() -> PublicKey {
        FIXTURE_KEY.parse().unwrap()
    }

    #[test]
    fn from_key_layout() {
        let addr = Address::from_key(&fixture_key());
        let bytes = addr.to_bytes();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1], 0);
        assert_eq!(hex::encode(&bytes[2..]), FIXTURE_KEY);
        assert!(addr.is_user());
    }

    #[test]
    fn text_roundtrip() {
        let addr = Address::from_key(&fixture_key());
        assert_eq!(addr.text(), FIXTURE_TEXT);
        assert_eq!(Address::from_text(FIXTURE_TEXT).unwrap(), addr);
        assert!(Address::is_valid_address(FIXTURE_TEXT));
    }

    #[test]
    fn null_address_renders_as_sentinel() {
        let null = Address::null();
        assert!(null.is_null());
        assert_eq!(null.to_string(), "[Null address]");
        assert!(Address::from_text("[Null address]").is_err());
    }

    #[test]
    fn contract_addresses_hash_the_name(){
        let addr = Address::from_contract_name("gas");
        assert!(addr.is_system());
        assert_eq!(
            addr.payload().as_ref(),
            Hasher::sha256(b"gas").as_ref()
        );
        assert_ne!(addr, Address::from_contract_name("token"));
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(Address::from_text("").is_err());
        assert!(Address::from_text("Q123").is_err());
        assert!(Address::from_text("P0OIl").is_err()); // invalid base58 digits
        assert!(Address::from_text("P2KFEy").is_err()); // too short
    }
}
