//! Data model and codecs for the Carbon wire format
//!
//! Carbon is the successor format of the Phantasma chain: fixed-width
//! little-endian primitives, schema-aware structured records with sorted
//! field names, and a polymorphic transaction message whose witness layout
//! depends on the variant. This crate holds the typed model and its exact
//! byte layout; building and signing live in `phantasma-txbuilder`.

pub mod config;
pub mod signature;
pub mod token;
pub mod tx;
pub mod vm;

pub use signature::SignatureKind;
pub use tx::{SignedTxMsg, TxBody, TxMsg, Witness};
pub use vm::{VmDynamicStruct, VmDynamicValue, VmStructSchema, VmType};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] phantasma_codec::Error),

    #[error(transparent)]
    Math(#[from] phantasma_math::Error),

    #[error("unknown vm type tag {0:#04x}")]
    UnknownVmType(u8),

    #[error("unsupported transaction type {0}")]
    UnknownTxType(u8),

    #[error("unsupported signature kind {0}")]
    UnknownSignatureKind(u8),

    #[error("struct field {0} does not match its schema type")]
    SchemaTypeMismatch(String),

    #[error("struct is missing schema field {0}")]
    MissingSchemaField(String),

    #[error("invalid witness")]
    InvalidWitness,

    #[error("call argument sections have an invalid count")]
    InvalidCallSections,
}
