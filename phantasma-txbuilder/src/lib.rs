//! Builders for the Phantasma chain
//!
//! Everything that turns intent into bytes lives here: the legacy VM script
//! builder and transaction (sign, hash, proof-of-work), the token / series /
//! NFT builders with their eager validation rules, the fee profiles, and
//! the Carbon transaction helpers that assemble and sign `TxMsg`s. The
//! transport-free RPC boundary is declared in [`rpc`].

pub mod fees;
pub mod rpc;
pub mod scriptbuilder;
pub mod tokens;
pub mod transaction;
pub mod txmsg;

pub use fees::{CreateSeriesFeeOptions, CreateTokenFeeOptions, FeeOptions, MintNftFeeOptions};
pub use scriptbuilder::{BehaviorVersion, Opcode, ScriptArg, ScriptBuilder};
pub use transaction::Transaction;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("script operand too long for a single length byte")]
    OperandTooLong,

    #[error("null script in transaction")]
    EmptyScript,

    #[error("invalid difficulty")]
    InvalidDifficulty,

    #[error("cannot be signed")]
    AlreadySigned,

    #[error("Transaction mining failed")]
    MiningFailed,

    #[error("Symbol validation error: Empty string is invalid")]
    SymbolEmpty,

    #[error("Symbol validation error: Too long")]
    SymbolTooLong,

    #[error("Symbol validation error: Anything outside A-Z is forbidden (digits, accents, etc.)")]
    SymbolInvalidCharacter,

    #[error("metadata is required")]
    MetadataRequired,

    #[error("Token metadata is mandatory")]
    MetadataMandatory,

    #[error("Token metadata is missing required fields: {0}")]
    MetadataMissingFields(String),

    #[error("Token metadata icon must be a base64-encoded data URI (PNG, JPEG, or WebP)")]
    IconNotDataUri,

    #[error("Token metadata icon must include a non-empty base64 payload")]
    IconEmptyPayload,

    #[error("Token metadata icon payload is not valid base64")]
    IconInvalidBase64,

    #[error("NFT maximum supply must fit into Int64")]
    NftSupplyTooLarge,

    #[error("tokenSchemas is required for NFTs")]
    NftSchemasRequired,

    #[error("series metadata is required")]
    SeriesMetadataRequired,

    #[error("Invalid token schema: {0}")]
    InvalidTokenSchema(String),

    #[error("metadata field '{field}' must be a number")]
    FieldNotNumber { field: String },

    #[error("metadata field '{field}' must be between {min} and {max}")]
    FieldOutOfRange {
        field: String,
        min: i64,
        max: u64,
    },

    #[error("metadata field '{field}' must be a byte array or hex string")]
    FieldNotBytes { field: String },

    #[error("metadata field '{field}' must hold exactly {expected} bytes")]
    FieldWrongSize { field: String, expected: usize },

    #[error("metadata field '{field}' must be a string")]
    FieldNotString { field: String },

    #[error("metadata field '{field}' must be a struct")]
    FieldNotStruct { field: String },

    #[error("metadata field '{field}' must be an array")]
    FieldNotArray { field: String },

    #[error("metadata field '{field}' received unknown property '{property}'")]
    FieldUnknownProperty { field: String, property: String },

    #[error("metadata field '{field}' is mandatory")]
    FieldMandatory { field: String },

    #[error("unsigned arithmetic overflow in fee calculation")]
    FeeOverflow,

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error(transparent)]
    Codec(#[from] phantasma_codec::Error),

    #[error(transparent)]
    Math(#[from] phantasma_math::Error),

    #[error(transparent)]
    Primitives(#[from] phantasma_primitives::Error),

    #[error(transparent)]
    Address(#[from] phantasma_addresses::Error),
}
