//! SipHash-2-4 for hashing byte keys in containers
//!
//! Collections keyed by attacker-controlled bytes (metadata names, raw
//! keys) hash with SipHash-2-4 under a process-wide random key, so an
//! attacker cannot precompute colliding inputs. The key is drawn from a
//! cryptographic RNG the first time it is needed and never changes for the
//! lifetime of the process.

use once_cell::sync::Lazy;
use rand::RngCore as _;

static PROCESS_KEY: Lazy<[u64; 2]> = Lazy::new(|| {
    let mut rng = rand::rng();
    [rng.next_u64(), rng.next_u64()]
});

#[inline]
fn rotl(x: u64, b: u32) -> u64 {
    x.rotate_left(b)
}

macro_rules! sipround {
    ($v0:ident, $v1:ident, $v2:ident, $v3:ident) => {
        $v0 = $v0.wrapping_add($v1);
        $v1 = rotl($v1, 13);
        $v1 ^= $v0;
        $v0 = rotl($v0, 32);
        $v2 = $v2.wrapping_add($v3);
        $v3 = rotl($v3, 16);
        $v3 ^= $v2;
        $v0 = $v0.wrapping_add($v3);
        $v3 = rotl($v3, 21);
        $v3 ^= $v0;
        $v2 = $v2.wrapping_add($v1);
        $v1 = rotl($v1, 17);
        $v1 ^= $v2;
        $v2 = rotl($v2, 32);
    };
}

/// SipHash-2-4 of `input` under an explicit 128-bit key.
pub fn siphash24(input: &[u8], key: &[u64; 2]) -> u64 {
    let mut v0 = key[0] ^ 0x736f_6d65_7073_6575;
    let mut v1 = key[1] ^ 0x646f_7261_6e64_6f6d;
    let mut v2 = key[0] ^ 0x6c79_6765_6e65_7261;
    let mut v3 = key[1] ^ 0x7465_6462_7974_6573;

    let mut chunks = input.chunks_exact(8);
    for chunk in &mut chunks {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        let m = u64::from_le_bytes(word);
        v3 ^= m;
        sipround!(v0, v1, v2, v3);
        sipround!(v0, v1, v2, v3);
        v0 ^= m;
    }

    let tail = chunks.remainder();
    let mut last = (input.len() as u64) << 56;
    for (i, b) in tail.iter().enumerate() {
        last |= (*b as u64) << (8 * i);
    }
    v3 ^= last;
    sipround!(v0, v1, v2, v3);
    sipround!(v0, v1, v2, v3);
    v0 ^= last;

    v2 ^= 0xFF;
    sipround!(v0, v1, v2, v3);
    sipround!(v0, v1, v2, v3);
    sipround!(v0, v1, v2, v3);
    sipround!(v0, v1, v2, v3);

    v0 ^ v1 ^ v2 ^ v3
}

/// SipHash-2-4 under the lazily seeded process key.
pub fn siphash24_random(input: &[u8]) -> u64 {
    siphash24(input, &PROCESS_KEY)
}
