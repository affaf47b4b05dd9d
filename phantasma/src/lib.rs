//! Rust-native client SDK for the Phantasma blockchain
//!
//! Phantasma is an expanding collection of crates that implement the client
//! side of the Phantasma chain and its Carbon successor protocol in native
//! Rust: key management and signing, the legacy and Carbon wire codecs,
//! script and transaction builders, and token/NFT construction with strict
//! schema validation. This crate doesn't provide any particular
//! application; it re-exports the member crates as a base layer for
//! wallets, explorers and tooling.

#[doc(inline)]
pub use phantasma_addresses as addresses;

#[doc(inline)]
pub use phantasma_codec as codec;

#[doc(inline)]
pub use phantasma_crypto as crypto;

#[doc(inline)]
pub use phantasma_math as math;

#[doc(inline)]
pub use phantasma_primitives as primitives;

#[doc(inline)]
pub use phantasma_txbuilder as txbuilder;

#[doc(inline)]
pub use phantasma_wallet as wallet;
