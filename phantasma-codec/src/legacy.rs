//! Legacy Phantasma framing
//!
//! The original chain frames everything with a width-by-value VarInt:
//!
//! ```text
//! v <= 0xFC        -> [v]
//! v <= 0xFFFF      -> [0xFD, 2 bytes LE]
//! v <= 0xFFFFFFFF  -> [0xFE, 4 bytes LE]
//! otherwise        -> [0xFF, 8 bytes LE]
//! ```
//!
//! Writers always pick the shortest form. Strings are VarInt-length-prefixed
//! UTF-8; byte arrays are VarInt-length-prefixed blobs.

use crate::{
    cursor::{ReadView, WriteView},
    Error,
};

pub fn write_var_int(w: &mut WriteView, v: u64) {
    if v <= 0xFC {
        w.write_u8(v as u8);
    } else if v <= 0xFFFF {
        w.write_u8(0xFD);
        w.write_u16(v as u16);
    } else if v <= 0xFFFF_FFFF {
        w.write_u8(0xFE);
        w.write_u32(v as u32);
    } else {
        w.write_u8(0xFF);
        w.write_u64(v);
    }
}

pub fn read_var_int(r: &mut ReadView) -> Result<u64, Error> {
    let prefix = r.read_u8();
    let value = match prefix {
        0xFD => r.read_u16() as u64,
        0xFE => r.read_u32() as u64,
        0xFF => r.read_u64(),
        b => b as u64,
    };
    r.result()?;
    Ok(value)
}

pub fn write_var_bytes(w: &mut WriteView, bytes: &[u8]) {
    write_var_int(w, bytes.len() as u64);
    w.write_bytes(bytes);
}

pub fn read_var_bytes(r: &mut ReadView) -> Result<Vec<u8>, Error> {
    let len = read_var_int(r)?;
    if len > r.remaining() as u64 {
        r.fail();
        return Err(Error::UnexpectedEof);
    }
    let bytes = r.read_bytes(len as usize).to_vec();
    r.result()?;
    Ok(bytes)
}

pub fn write_var_string(w: &mut WriteView, s: &str) {
    write_var_bytes(w, s.as_bytes());
}

pub fn read_var_string(r: &mut ReadView) -> Result<String, Error> {
    let bytes = read_var_bytes(r)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
