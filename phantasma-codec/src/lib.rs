//! Shared byte primitives and wire framing for the Phantasma codecs
//!
//! This crate is the base layer for both wire formats spoken by the SDK: the
//! legacy Phantasma format (VarInt-framed scripts, transactions and
//! signatures) and the Carbon format (fixed-width little-endian primitives
//! with schema-aware records). It provides the owned byte containers, the
//! read cursor with its sticky failure flag, the append-only write buffer,
//! and the framing helpers both codecs are built from.

pub mod bytes;
pub mod carbon;
pub mod cursor;
pub mod legacy;

pub use bytes::{Bytes16, Bytes32, Bytes64, BytesN, SmallString};
pub use cursor::{Mark, ReadView, WriteView};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("end of stream reached")]
    UnexpectedEof,

    #[error("non-standard serialization form rejected in strict mode")]
    NonStandardData,

    #[error("SmallString was too long")]
    StringTooLong,

    #[error("invalid array length")]
    NegativeLength,

    #[error("string contains zero byte")]
    InteriorNul,

    #[error("variable-length integer is malformed")]
    BadVarInt,
}
