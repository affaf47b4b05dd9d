use cryptoxide::{digest::Digest as _, sha2::Sha256};

use crate::hash::Hash;

/// Incremental SHA-256, the digest everything on the Phantasma chain is
/// hashed with.
///
/// ```
/// # use phantasma_crypto::hash::Hasher;
/// let mut hasher = Hasher::new();
/// hasher.input(b"hello world");
/// let digest = hasher.finalize();
/// # assert_eq!(
/// #   "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
/// #   hex::encode(digest)
/// # );
/// ```
pub struct Hasher(Sha256);

impl Hasher {
    #[inline]
    pub fn new() -> Self {
        Self(Sha256::new())
    }

    #[inline]
    pub fn input(&mut self, bytes: &[u8]) {
        self.0.input(bytes);
    }

    /// Consume the [`Hasher`] and return the computed digest.
    pub fn finalize(mut self) -> Hash<32> {
        let mut digest = [0u8; 32];
        self.0.result(&mut digest);
        Hash::new(digest)
    }

    /// Convenient function to directly hash the given bytes.
    #[inline]
    pub fn sha256(bytes: &[u8]) -> Hash<32> {
        let mut hasher = Self::new();
        hasher.input(bytes);
        hasher.finalize()
    }

    /// SHA-256 applied twice, as used by the Base58Check checksum.
    #[inline]
    pub fn double_sha256(bytes: &[u8]) -> Hash<32> {
        Self::sha256(Hasher::sha256(bytes).as_ref())
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_vectors() {
        assert_eq!(
            Hasher::sha256(b"").to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            Hasher::sha256(b"abc").to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn double_sha256_is_composed() {
        let once = Hasher::sha256(b"abc");
        assert_eq!(Hasher::double_sha256(b"abc"), Hasher::sha256(once.as_ref()));
    }

    #[test]
    fn incremental_matches_oneshot() {
        let mut hasher = Hasher::new();
        hasher.input(b"hello ");
        hasher.input(b"world");
        assert_eq!(hasher.finalize(), Hasher::sha256(b"hello world"));
    }
}
