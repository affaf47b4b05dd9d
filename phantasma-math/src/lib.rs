//! 256-bit integers for the Phantasma wire formats
//!
//! The chain represents amounts and ids as 256-bit integers stored in eight
//! little-endian 32-bit limbs, with the signed view being the two's
//! complement of the unsigned one. Three serializations exist and all are
//! compatibility constraints with the live chain:
//!
//! * the Carbon compact envelope (`header = len | sign`, then the minimal
//!   little-endian two's-complement payload),
//! * the [`IntX`] envelope, which collapses to a fixed 8-byte form whenever
//!   the value fits a signed 64-bit integer,
//! * the legacy form, a one-byte length followed by the minimal
//!   two's-complement sequence (with the historical tolerance for one
//!   redundant trailing sign byte on decode).

mod codec;
mod int;
mod intx;
mod uint;

pub use codec::{
    read_array_int256, read_int256, read_intx, read_legacy_int256, read_uint256,
    write_array_int256, write_int256, write_intx, write_legacy_int256, write_uint256,
};
pub use int::Int256;
pub use intx::IntX;
pub use uint::Uint256;

use thiserror::Error;

/// Exponent cap for [`Uint256::pow`]; larger exponents are refused instead
/// of looping for an unbounded amount of time.
pub const MAX_POW_ITERATIONS: u64 = 255;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("division by zero")]
    DivisionByZero,

    #[error("pow exponent exceeds the iteration cap of {MAX_POW_ITERATIONS}")]
    PowRange,

    #[error("invalid digit for base {base}")]
    InvalidDigit { base: u32 },

    #[error("base {base} is not usable with the available digit dictionary")]
    InvalidBase { base: u32 },

    #[error("integer envelope header is malformed")]
    BadEnvelopeHeader,

    #[error("integer envelope is longer than 256 bits")]
    EnvelopeTooLong,

    #[error("envelope sign bit disagrees with the payload")]
    SignMismatch,

    #[error("not a valid intx header")]
    BadIntxHeader,

    #[error(transparent)]
    Codec(#[from] phantasma_codec::Error),
}
