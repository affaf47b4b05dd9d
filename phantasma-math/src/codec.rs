//! Integer wire envelopes
//!
//! Carbon compact form: `header = (len & 0x3F) | (sign & 0x80)`, then `len`
//! little-endian two's-complement bytes, minimal length. Bit 0x40 of the
//! header is reserved and must be clear. The missing bytes are filled with
//! the sign, so a header with length zero decodes to 0 (or to -1 when the
//! sign bit is set, a form no writer emits).
//!
//! The intx form collapses to `0x08`/`0x88` plus exactly 8 bytes whenever
//! the value fits a signed 64-bit slot; bit 63 of the stored payload must
//! then agree with the header sign, otherwise the bytes are re-read as the
//! 256-bit form.

use phantasma_codec::{ReadView, WriteView};

use crate::{int::Int256, intx::IntX, uint::Uint256, Error};

pub fn write_uint256(w: &mut WriteView, value: &Uint256) {
    if value.is_zero() {
        w.write_u8(0);
        return;
    }
    let payload = value.as_signed().to_signed_bytes();
    let fill: u8 = if value.as_signed().is_negative() {
        0xFF
    } else {
        0x00
    };
    let header = (payload.len() as u8 & 0x3F) | (fill & 0x80);
    w.write_u8(header);
    w.write_bytes(&payload);
}

pub fn read_uint256(r: &mut ReadView) -> Result<Uint256, Error> {
    let header = r.read_u8();
    r.result()?;
    let length = (header & 0x3F) as usize;
    if header & 0x40 != 0 {
        r.fail();
        return Err(Error::BadEnvelopeHeader);
    }
    if length > 32 {
        r.fail();
        return Err(Error::EnvelopeTooLong);
    }
    let fill = if header & 0x80 != 0 { 0xFFu8 } else { 0x00 };
    let mut bytes = [fill; 32];
    if length > 0 && !r.read_into(&mut bytes[..length]) {
        return Err(Error::Codec(phantasma_codec::Error::UnexpectedEof));
    }
    // after sign extension the top byte must agree with the header
    if (bytes[31] & 0x80) != (header & 0x80) {
        r.fail();
        return Err(Error::SignMismatch);
    }
    Ok(Uint256::from_le_bytes(bytes))
}

pub fn write_int256(w: &mut WriteView, value: &Int256) {
    write_uint256(w, &value.as_unsigned());
}

pub fn read_int256(r: &mut ReadView) -> Result<Int256, Error> {
    Ok(read_uint256(r)?.as_signed())
}

pub fn write_intx(w: &mut WriteView, value: &IntX) {
    let small = match value {
        IntX::Big(big) => {
            if !big.is_8byte_safe() {
                write_int256(w, big);
                return;
            }
            big.to_i64()
        }
        IntX::Small(v) => *v,
    };
    let header: u8 = if small < 0 { 0x88 } else { 0x08 };
    w.write_u8(header);
    w.write_i64(small);
}

pub fn read_intx(r: &mut ReadView) -> Result<IntX, Error> {
    let start = r.mark();
    let header = r.read_u8();
    r.result()?;
    let length = header & 0x3F;
    if length < 8 {
        r.fail();
        return Err(Error::BadIntxHeader);
    }
    if length == 8 {
        let value = r.read_u64();
        r.result()?;
        let header_negative = header & 0x80 != 0;
        let value_negative = (value as i64) < 0;
        if header_negative == value_negative {
            return Ok(IntX::Small(value as i64));
        }
        // sign-extension mismatch: the value needs 65 bits, so the
        // payload is actually the 256-bit form
    }
    r.rewind(start);
    let big = read_uint256(r)?;
    if big.is_8byte_safe() && !r.on_non_standard() {
        return Err(Error::Codec(phantasma_codec::Error::NonStandardData));
    }
    Ok(IntX::Big(big.as_signed()))
}

pub fn write_array_int256(w: &mut WriteView, items: &[Int256]) {
    w.write_i32(items.len() as i32);
    for v in items {
        write_int256(w, v);
    }
}

pub fn read_array_int256(r: &mut ReadView) -> Result<Vec<Int256>, Error> {
    let len = phantasma_codec::carbon::read_count(r)?;
    let mut out = Vec::with_capacity(len.min(r.remaining()));
    for _ in 0..len {
        out.push(read_int256(r)?);
    }
    Ok(out)
}

/// Legacy framing: one length byte, then the minimal two's-complement
/// sequence. The decoder keeps the historical tolerance for one redundant
/// trailing sign byte.
pub fn write_legacy_int256(w: &mut WriteView, value: &Int256) {
    let payload = value.to_signed_bytes();
    w.write_u8(payload.len() as u8);
    w.write_bytes(&payload);
}

pub fn read_legacy_int256(r: &mut ReadView) -> Result<Int256, Error> {
    let length = r.read_u8() as usize;
    let bytes = r.read_bytes(length).to_vec();
    r.result()?;
    let value = Int256::from_signed_bytes(&bytes);
    if value.is_err() {
        r.fail();
    }
    value
}
