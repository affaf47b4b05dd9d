//! The legacy signature union
//!
//! On the legacy wire a signature is a kind byte followed by a kind-specific
//! body. Only Ed25519 is produced today; the ring kind is reserved and never
//! emitted by this SDK.

use phantasma_codec::{
    legacy::{read_var_bytes, write_var_bytes},
    Bytes64, ReadView, WriteView,
};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    None,
    Ed25519,
    Ring,
}

impl SignatureKind {
    pub fn to_byte(self) -> u8 {
        match self {
            SignatureKind::None => 0,
            SignatureKind::Ed25519 => 1,
            SignatureKind::Ring => 2,
        }
    }
}

/// A signature attached to a legacy transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    None,
    Ed25519(Bytes64),
    /// Reserved on-chain; this SDK neither produces nor parses ring bodies.
    Ring,
}

impl Signature {
    pub fn kind(&self) -> SignatureKind {
        match self {
            Signature::None => SignatureKind::None,
            Signature::Ed25519(_) => SignatureKind::Ed25519,
            Signature::Ring => SignatureKind::Ring,
        }
    }

    /// Legacy layout: kind byte, then a VarInt-framed body.
    pub fn write(&self, w: &mut WriteView) -> Result<(), Error> {
        match self {
            Signature::Ed25519(bytes) => {
                w.write_u8(SignatureKind::Ed25519.to_byte());
                write_var_bytes(w, bytes.as_ref());
                Ok(())
            }
            _ => Err(Error::UnknownSignatureKind(self.kind().to_byte())),
        }
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let kind = r.read_u8();
        r.result()?;
        match kind {
            1 => {
                let bytes = read_var_bytes(r)?;
                let signature = Bytes64::try_from(bytes.as_slice()).map_err(|e| {
                    r.fail();
                    Error::Codec(e)
                })?;
                Ok(Signature::Ed25519(signature))
            }
            other => {
                r.fail();
                Err(Error::UnknownSignatureKind(other))
            }
        }
    }
}
