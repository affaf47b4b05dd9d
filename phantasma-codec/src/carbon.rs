//! Carbon primitive framing
//!
//! Fixed-width integers are plain little-endian. Sequences carry a 4-byte
//! count which the reader treats as signed so that a negative count can be
//! rejected instead of interpreted as an enormous allocation. Strings come
//! in two shapes: the one-byte-length [`SmallString`] and the NUL-terminated
//! C string used inside dynamic variables.

use crate::{
    bytes::{BytesN, SmallString},
    cursor::{ReadView, WriteView},
    Error,
};

pub fn write_small_string(w: &mut WriteView, s: &SmallString) {
    w.write_u8(s.len() as u8);
    w.write_bytes(s.as_bytes());
}

pub fn read_small_string(r: &mut ReadView) -> Result<SmallString, Error> {
    let len = r.read_u8() as usize;
    let bytes = r.read_bytes(len).to_vec();
    r.result()?;
    SmallString::new(bytes)
}

/// NUL-terminated string. Interior NUL bytes cannot be represented and are
/// rejected before anything is written.
pub fn write_sz(w: &mut WriteView, s: &str) -> Result<(), Error> {
    if s.as_bytes().contains(&0) {
        return Err(Error::InteriorNul);
    }
    w.write_bytes(s.as_bytes());
    w.write_u8(0);
    Ok(())
}

pub fn read_sz(r: &mut ReadView) -> Result<String, Error> {
    let bytes = r.read_sz();
    r.result()?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn write_bytes_n<const N: usize>(w: &mut WriteView, v: &BytesN<N>) {
    w.write_bytes(v.as_ref());
}

pub fn read_bytes_n<const N: usize>(r: &mut ReadView) -> Result<BytesN<N>, Error> {
    let mut out = [0u8; N];
    r.read_into(&mut out);
    r.result()?;
    Ok(BytesN::new(out))
}

/// Read a sequence count, rejecting negative values.
pub fn read_count(r: &mut ReadView) -> Result<usize, Error> {
    let len = r.read_i32();
    r.result()?;
    if len < 0 {
        r.fail();
        return Err(Error::NegativeLength);
    }
    Ok(len as usize)
}

pub fn write_byte_array(w: &mut WriteView, bytes: &[u8]) {
    w.write_i32(bytes.len() as i32);
    w.write_bytes(bytes);
}

pub fn read_byte_array(r: &mut ReadView) -> Result<Vec<u8>, Error> {
    let len = read_count(r)?;
    let bytes = r.read_bytes(len).to_vec();
    r.result()?;
    Ok(bytes)
}

pub fn write_array_of_arrays(w: &mut WriteView, arrays: &[Vec<u8>]) {
    w.write_i32(arrays.len() as i32);
    for a in arrays {
        write_byte_array(w, a);
    }
}

pub fn read_array_of_arrays(r: &mut ReadView) -> Result<Vec<Vec<u8>>, Error> {
    let len = read_count(r)?;
    let mut out = Vec::with_capacity(len.min(r.remaining()));
    for _ in 0..len {
        out.push(read_byte_array(r)?);
    }
    Ok(out)
}

macro_rules! primitive_array {
    ($write_name:ident, $read_name:ident, $ty:ty, $write:ident, $read:ident) => {
        pub fn $write_name(w: &mut WriteView, items: &[$ty]) {
            w.write_i32(items.len() as i32);
            for v in items {
                w.$write(*v);
            }
        }

        pub fn $read_name(r: &mut ReadView) -> Result<Vec<$ty>, Error> {
            let len = read_count(r)?;
            let mut out = Vec::with_capacity(len.min(r.remaining()));
            for _ in 0..len {
                out.push(r.$read());
            }
            r.result()?;
            Ok(out)
        }
    };
}

primitive_array!(write_array_u8, read_array_u8, u8, write_u8, read_u8);
primitive_array!(write_array_i8, read_array_i8, i8, write_i8, read_i8);
primitive_array!(write_array_u16, read_array_u16, u16, write_u16, read_u16);
primitive_array!(write_array_i16, read_array_i16, i16, write_i16, read_i16);
primitive_array!(write_array_u32, read_array_u32, u32, write_u32, read_u32);
primitive_array!(write_array_i32, read_array_i32, i32, write_i32, read_i32);
primitive_array!(write_array_u64, read_array_u64, u64, write_u64, read_u64);
primitive_array!(write_array_i64, read_array_i64, i64, write_i64, read_i64);

pub fn write_array_sz(w: &mut WriteView, items: &[String]) -> Result<(), Error> {
    for s in items {
        if s.as_bytes().contains(&0) {
            return Err(Error::InteriorNul);
        }
    }
    w.write_i32(items.len() as i32);
    for s in items {
        w.write_bytes(s.as_bytes());
        w.write_u8(0);
    }
    Ok(())
}

pub fn read_array_sz(r: &mut ReadView) -> Result<Vec<String>, Error> {
    let len = read_count(r)?;
    let mut out = Vec::with_capacity(len.min(r.remaining()));
    for _ in 0..len {
        out.push(read_sz(r)?);
    }
    Ok(out)
}

pub fn write_array_bytes_n<const N: usize>(w: &mut WriteView, items: &[BytesN<N>]) {
    w.write_i32(items.len() as i32);
    for v in items {
        w.write_bytes(v.as_ref());
    }
}

pub fn read_array_bytes_n<const N: usize>(r: &mut ReadView) -> Result<Vec<BytesN<N>>, Error> {
    let len = read_count(r)?;
    let mut out = Vec::with_capacity(len.min(r.remaining()));
    for _ in 0..len {
        out.push(read_bytes_n(r)?);
    }
    Ok(out)
}
