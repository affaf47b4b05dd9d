//! Signed 256-bit arithmetic: the two's-complement view of [`Uint256`]

use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, BitAnd, BitOr, BitXor, Mul, Neg, Not, Shl, Shr, Sub},
};

use crate::{uint::Uint256, Error};

/// A signed 256-bit integer sharing its bit layout with [`Uint256`].
///
/// Division truncates toward zero and the remainder takes the dividend's
/// sign, matching both the VM and the reference big-integer behavior.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Int256(Uint256);

impl Int256 {
    pub const ZERO: Self = Self(Uint256::ZERO);
    pub const ONE: Self = Self(Uint256::ONE);

    pub(crate) const fn from_limbs(limbs: [u32; 8]) -> Self {
        Self(Uint256::from_limbs(limbs))
    }

    /// Reinterpret the bits as the unsigned view.
    #[inline]
    pub fn as_unsigned(self) -> Uint256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.to_le_bytes()[31] & 0x80 != 0
    }

    pub fn to_le_bytes(&self) -> [u8; 32] {
        self.0.to_le_bytes()
    }

    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self(Uint256::from_le_bytes(bytes))
    }

    pub(crate) fn twos_complement(&self) -> Self {
        Self((!self.0).wrapping_inc())
    }

    pub fn abs(&self) -> Self {
        if self.is_negative() {
            self.twos_complement()
        } else {
            *self
        }
    }

    /// Saturating conversion to i64.
    pub fn to_i64(&self) -> i64 {
        if *self <= Self::from(i64::MIN) {
            return i64::MIN;
        }
        if *self >= Self::from(i64::MAX) {
            return i64::MAX;
        }
        let bytes = self.to_le_bytes();
        let mut low = [0u8; 8];
        low.copy_from_slice(&bytes[..8]);
        i64::from_le_bytes(low)
    }

    /// True when the value round-trips through a signed 64-bit slot.
    pub fn is_8byte_safe(&self) -> bool {
        let fill = if self.is_negative() { 0xFFu8 } else { 0x00 };
        let bytes = self.to_le_bytes();
        if bytes[8..].iter().any(|b| *b != fill) {
            return false;
        }
        // the low word's own sign must agree, otherwise 65 bits are needed
        (bytes[7] & 0x80 != 0) == self.is_negative()
    }

    pub fn wrapping_add(&self, rhs: &Self) -> Self {
        Self(self.0.wrapping_add(&rhs.0))
    }

    pub fn wrapping_sub(&self, rhs: &Self) -> Self {
        Self(self.0.wrapping_sub(&rhs.0))
    }

    /// Multiply magnitudes, then restore the sign.
    pub fn wrapping_mul(&self, rhs: &Self) -> Self {
        let product = Self(self.abs().0.wrapping_mul(&rhs.abs().0));
        if self.is_negative() != rhs.is_negative() {
            product.twos_complement()
        } else {
            product
        }
    }

    /// Truncated division: quotient toward zero, remainder takes the
    /// dividend's sign.
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), Error> {
        if divisor.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let (q_mag, r_mag) = self.abs().0.div_rem(&divisor.abs().0)?;
        let mut quotient = Self(q_mag);
        if self.is_negative() != divisor.is_negative() {
            quotient = quotient.twos_complement();
        }
        let mut remainder = Self(r_mag);
        if self.is_negative() {
            remainder = remainder.twos_complement();
        }
        Ok((quotient, remainder))
    }

    pub fn checked_div(&self, divisor: &Self) -> Result<Self, Error> {
        Ok(self.div_rem(divisor)?.0)
    }

    pub fn checked_rem(&self, divisor: &Self) -> Result<Self, Error> {
        Ok(self.div_rem(divisor)?.1)
    }

    /// Logical shift left (bits fall off the top).
    pub fn shl(&self, nbits: u32) -> Self {
        Self(self.0.shl(nbits))
    }

    /// Arithmetic shift right, filling with the sign bit.
    pub fn shr(&self, nbits: u32) -> Self {
        if !self.is_negative() {
            return Self(self.0.shr(nbits));
        }
        if nbits >= 256 {
            return Self(Uint256::MAX);
        }
        let shifted = self.0.shr(nbits);
        let fill = Uint256::MAX.shl(256 - nbits);
        Self(shifted | fill)
    }

    /// The minimum-length little-endian two's-complement form: trailing
    /// bytes equal to the sign fill are dropped while the next byte down
    /// still carries the same sign bit.
    pub fn to_signed_bytes(&self) -> Vec<u8> {
        let bytes = self.to_le_bytes();
        let fill = if self.is_negative() { 0xFFu8 } else { 0x00 };
        let mut len = bytes.len();
        while len > 1 && bytes[len - 1] == fill && (bytes[len - 2] & 0x80) == (fill & 0x80) {
            len -= 1;
        }
        bytes[..len].to_vec()
    }

    /// Inverse of [`Int256::to_signed_bytes`]. Accepts up to 32 payload
    /// bytes, sign-extending from the top bit, plus the historical 33-byte
    /// form carrying one redundant trailing sign byte.
    pub fn from_signed_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let payload = match bytes.len() {
            0 => return Ok(Self::ZERO),
            1..=32 => bytes,
            33 => {
                let consistent = match bytes[32] {
                    0x00 => bytes[31] & 0x80 == 0,
                    0xFF => bytes[31] & 0x80 != 0,
                    _ => false,
                };
                if !consistent {
                    return Err(Error::SignMismatch);
                }
                &bytes[..32]
            }
            _ => return Err(Error::EnvelopeTooLong),
        };
        let fill = if payload[payload.len() - 1] & 0x80 != 0 {
            0xFFu8
        } else {
            0x00
        };
        let mut full = [fill; 32];
        full[..payload.len()].copy_from_slice(payload);
        Ok(Self::from_le_bytes(full))
    }

    pub fn from_str_radix(s: &str, base: u32) -> Result<Self, Error> {
        Ok(Self(Uint256::from_str_radix(s, base)?))
    }

    pub fn to_string_radix(&self, base: u32, dictionary: Option<&str>) -> Result<String, Error> {
        if !self.is_negative() {
            return self.0.to_string_radix(base, dictionary);
        }
        let magnitude = self.twos_complement().0.to_string_radix(base, dictionary)?;
        Ok(format!("-{magnitude}"))
    }
}

impl From<i64> for Int256 {
    fn from(v: i64) -> Self {
        let fill = if v < 0 { 0xFFu8 } else { 0x00 };
        let mut bytes = [fill; 32];
        bytes[..8].copy_from_slice(&v.to_le_bytes());
        Self::from_le_bytes(bytes)
    }
}

impl From<Uint256> for Int256 {
    fn from(v: Uint256) -> Self {
        v.as_signed()
    }
}

impl From<Int256> for Uint256 {
    fn from(v: Int256) -> Self {
        v.as_unsigned()
    }
}

impl PartialOrd for Int256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Int256 {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            // same sign: two's complement preserves order under unsigned compare
            _ => self.0.cmp(&other.0),
        }
    }
}

impl Neg for Int256 {
    type Output = Self;
    fn neg(self) -> Self {
        self.twos_complement()
    }
}

impl Add for Int256 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.wrapping_add(&rhs)
    }
}

impl Sub for Int256 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.wrapping_sub(&rhs)
    }
}

impl Mul for Int256 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.wrapping_mul(&rhs)
    }
}

impl Not for Int256 {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl BitAnd for Int256 {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Int256 {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitXor for Int256 {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Shl<u32> for Int256 {
    type Output = Self;
    fn shl(self, nbits: u32) -> Self {
        Int256::shl(&self, nbits)
    }
}

impl Shr<u32> for Int256 {
    type Output = Self;
    fn shr(self, nbits: u32) -> Self {
        Int256::shr(&self, nbits)
    }
}

impl fmt::Display for Int256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_string_radix(10, None) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl fmt::Debug for Int256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn big(s: &str) -> Int256 {
        Int256::from_str_radix(s, 10).unwrap()
    }

    #[quickcheck]
    fn i64_roundtrip(v: i64) -> bool {
        Int256::from(v).to_i64() == v
    }

    #[quickcheck]
    fn i64_arithmetic_agrees(a: i64, b: i64) -> bool {
        let (x, y) = (Int256::from(a), Int256::from(b));
        (a.checked_add(b).is_none() || x.wrapping_add(&y) == Int256::from(a + b))
            && (a.checked_sub(b).is_none() || x.wrapping_sub(&y) == Int256::from(a - b))
            && (a.checked_mul(b).is_none() || x.wrapping_mul(&y) == Int256::from(a * b))
    }

    #[quickcheck]
    fn truncated_division_agrees(a: i64, b: i64) -> bool {
        if b == 0 || (a == i64::MIN && b == -1) {
            return true;
        }
        let (q, r) = Int256::from(a).div_rem(&Int256::from(b)).unwrap();
        q == Int256::from(a / b) && r == Int256::from(a % b)
    }

    #[quickcheck]
    fn signed_bytes_roundtrip(v: i64) -> bool {
        let n = Int256::from(v);
        Int256::from_signed_bytes(&n.to_signed_bytes()) == Ok(n)
    }

    #[quickcheck]
    fn ordering_agrees(a: i64, b: i64) -> bool {
        Int256::from(a).cmp(&Int256::from(b)) == a.cmp(&b)
    }

    #[test]
    fn signed_bytes_are_minimal() {
        assert_eq!(Int256::ZERO.to_signed_bytes(), vec![0x00]);
        assert_eq!(Int256::from(1).to_signed_bytes(), vec![0x01]);
        assert_eq!(Int256::from(-1).to_signed_bytes(), vec![0xFF]);
        assert_eq!(Int256::from(127).to_signed_bytes(), vec![0x7F]);
        // 128 needs a second byte to keep the sign bit clear
        assert_eq!(Int256::from(128).to_signed_bytes(), vec![0x80, 0x00]);
        assert_eq!(Int256::from(-128).to_signed_bytes(), vec![0x80]);
        assert_eq!(Int256::from(-129).to_signed_bytes(), vec![0x7F, 0xFF]);
        assert_eq!(Int256::from(256).to_signed_bytes(), vec![0x00, 0x01]);
    }

    #[test]
    fn trailing_sign_byte_tolerance() {
        // 255 with a redundant 0x00 sign byte at full width
        let mut wide = vec![0xFFu8];
        wide.extend_from_slice(&[0x00; 31]);
        wide.push(0x00);
        assert_eq!(wide.len(), 33);
        assert_eq!(Int256::from_signed_bytes(&wide), Ok(Int256::from(255)));

        // -1 with a redundant 0xFF
        let wide = vec![0xFFu8; 33];
        assert_eq!(Int256::from_signed_bytes(&wide), Ok(Int256::from(-1)));

        // inconsistent marker
        let mut bad = vec![0x01u8];
        bad.extend_from_slice(&[0x00; 31]);
        bad.push(0xFF);
        assert_eq!(Int256::from_signed_bytes(&bad), Err(Error::SignMismatch));

        let too_long = vec![0x00u8; 34];
        assert_eq!(
            Int256::from_signed_bytes(&too_long),
            Err(Error::EnvelopeTooLong)
        );
    }

    #[test]
    fn big_signed_arithmetic() {
        let a = big("-1234567890123456789012345678901234567890");
        let b = big("987654321");
        let (q, r) = a.div_rem(&b).unwrap();
        assert!(q.is_negative());
        assert!(r.is_negative());
        assert_eq!(q.wrapping_mul(&b).wrapping_add(&r), a);
        assert_eq!(a.abs(), big("1234567890123456789012345678901234567890"));
        assert_eq!((-a).to_string(), "1234567890123456789012345678901234567890");
    }

    #[test]
    fn arithmetic_shift_right() {
        assert_eq!(Int256::from(-8).shr(1), Int256::from(-4));
        assert_eq!(Int256::from(-1).shr(200), Int256::from(-1));
        assert_eq!(Int256::from(8).shr(2), Int256::from(2));
    }

    #[test]
    fn eight_byte_safety_boundaries() {
        assert!(Int256::from(0).is_8byte_safe());
        assert!(Int256::from(i64::MIN).is_8byte_safe());
        assert!(Int256::from(i64::MAX).is_8byte_safe());
        assert!(!big("9223372036854775808").is_8byte_safe());
        assert!(!big("-9223372036854775809").is_8byte_safe());
    }
}
