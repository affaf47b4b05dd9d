//! The small-or-big tagged numeric

use std::fmt;

use crate::{int::Int256, uint::Uint256, Error};

/// A number that is usually a machine word but may be a full 256-bit value.
///
/// The discriminant is a storage detail: equality and ordering are by
/// numeric value, and the wire codec picks the envelope from the magnitude,
/// not from the discriminant.
#[derive(Clone, Copy)]
pub enum IntX {
    Small(i64),
    Big(Int256),
}

impl IntX {
    pub const ZERO: Self = Self::Small(0);

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Small(v) => *v == 0,
            Self::Big(v) => v.is_zero(),
        }
    }

    /// Widen to the signed 256-bit view regardless of storage.
    pub fn to_int256(&self) -> Int256 {
        match self {
            Self::Small(v) => Int256::from(*v),
            Self::Big(v) => *v,
        }
    }

    /// The unsigned view of the same bits.
    pub fn to_uint256(&self) -> Uint256 {
        self.to_int256().as_unsigned()
    }

    /// Whether the value fits a signed 64-bit slot, which decides the wire
    /// envelope.
    pub fn is_8byte_safe(&self) -> bool {
        match self {
            Self::Small(_) => true,
            Self::Big(v) => v.is_8byte_safe(),
        }
    }

    /// Parse with the fast path the original uses: short base-10 strings go
    /// through the native integer parser, everything else through the big
    /// one.
    pub fn from_str_radix(s: &str, base: u32) -> Result<Self, Error> {
        if base <= 10 && s.len() < 20 {
            if let Ok(v) = s.trim().parse::<i64>() {
                return Ok(Self::Small(v));
            }
        }
        Ok(Self::Big(Int256::from_str_radix(s, base)?))
    }

    /// Build from little-endian bytes; up to 8 bytes stays small, longer
    /// input is widened.
    pub fn from_bytes(bytes: &[u8], signed: bool) -> Result<Self, Error> {
        if bytes.is_empty() {
            return Ok(Self::ZERO);
        }
        if bytes.len() <= 8 {
            let fill = if signed && bytes[bytes.len() - 1] & 0x80 != 0 {
                0xFFu8
            } else {
                0x00
            };
            let mut full = [fill; 8];
            full[..bytes.len()].copy_from_slice(bytes);
            return Ok(Self::Small(i64::from_le_bytes(full)));
        }
        if signed {
            Ok(Self::Big(Int256::from_signed_bytes(bytes)?))
        } else {
            Ok(Self::Big(Uint256::from_bytes(bytes)?.as_signed()))
        }
    }

    pub fn to_string_unsigned(&self) -> String {
        match self {
            Self::Small(v) => format!("{}", *v as u64),
            Self::Big(v) => v.as_unsigned().to_string(),
        }
    }
}

impl Default for IntX {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for IntX {
    fn from(v: i64) -> Self {
        Self::Small(v)
    }
}

impl From<u64> for IntX {
    fn from(v: u64) -> Self {
        Self::Small(v as i64)
    }
}

impl From<i32> for IntX {
    fn from(v: i32) -> Self {
        Self::Small(v as i64)
    }
}

impl From<Int256> for IntX {
    fn from(v: Int256) -> Self {
        Self::Big(v)
    }
}

impl From<Uint256> for IntX {
    fn from(v: Uint256) -> Self {
        Self::Big(v.as_signed())
    }
}

impl PartialEq for IntX {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Small(a), Self::Small(b)) => a == b,
            _ => self.to_int256() == other.to_int256(),
        }
    }
}

impl Eq for IntX {}

impl PartialOrd for IntX {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IntX {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_int256().cmp(&other.to_int256())
    }
}

impl std::ops::Add for IntX {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::Big(self.to_int256().wrapping_add(&rhs.to_int256()))
    }
}

impl std::ops::Sub for IntX {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::Big(self.to_int256().wrapping_sub(&rhs.to_int256()))
    }
}

impl fmt::Display for IntX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Small(v) => write!(f, "{v}"),
            Self::Big(v) => fmt::Display::fmt(v, f),
        }
    }
}

impl fmt::Debug for IntX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Small(v) => write!(f, "IntX::Small({v})"),
            Self::Big(v) => write!(f, "IntX::Big({v})"),
        }
    }
}
