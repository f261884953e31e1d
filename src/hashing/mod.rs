//! Content hashing for cache keys.
//!
//! Every cache in the pipeline is keyed by a BLAKE3 digest of the raw image bytes. The
//! full 256-bit output is kept: a collision here would silently return another person's
//! comparison, so the truncated forms used for fast indexing elsewhere are not acceptable.

use std::fmt;

use thiserror::Error;

/// Reasons an input cannot produce a cache key. Callers bypass caching on any of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheKeyError {
    #[error("cannot derive a cache key from empty input")]
    EmptyInput,
}

/// 32-byte BLAKE3 digest identifying an image by content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey([u8; 32]);

impl ContentKey {
    /// Hashes `bytes` unconditionally (empty input included).
    #[inline]
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        blake3::Hash::from_bytes(self.0).to_hex().to_string()
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(12);
        hex
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey({})", self.short())
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Derives the cache key for an image, refusing inputs that cannot identify anything.
#[inline]
pub fn content_key(bytes: &[u8]) -> Result<ContentKey, CacheKeyError> {
    if bytes.is_empty() {
        return Err(CacheKeyError::EmptyInput);
    }
    Ok(ContentKey::of(bytes))
}
