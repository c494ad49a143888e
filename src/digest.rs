//! Content digests using BLAKE3 hashing
//!
//! Each produced output file carries a digest so callers can detect
//! whether a re-conversion changed anything without comparing bytes.
//!
//! # Algorithm
//!
//! 1. Hash the output bytes using BLAKE3
//! 2. Take the first 128 bits (16 bytes) of the hash
//! 3. Encode as a lowercase hexadecimal string
//!
//! # Why BLAKE3?
//!
//! - **Fast**: significantly faster than MD5, SHA-1, SHA-2
//! - **Deterministic**: same input always produces the same output
//! - **Collision-resistant**: truncated 128-bit collisions are negligible
//!
//! # Example
//!
//! ```
//! use mdhtml_engine::digest::ContentDigest;
//!
//! let digest = ContentDigest::new();
//! let value = digest.compute(b"# Hello World\n\nThis is a test.");
//!
//! assert_eq!(value.len(), 32); // 16 bytes as hex
//! assert_eq!(value, digest.compute(b"# Hello World\n\nThis is a test."));
//! ```

use blake3;

/// Content digest generator using BLAKE3 hash
pub struct ContentDigest;

impl ContentDigest {
    /// Create a new digest generator
    pub fn new() -> Self {
        Self
    }

    /// Compute the digest of output bytes
    ///
    /// Uses the first 128 bits of the BLAKE3 hash formatted as a
    /// lowercase hex string.
    ///
    /// # Arguments
    ///
    /// * `content` - Output bytes to hash
    ///
    /// # Returns
    ///
    /// 32-character hex string
    pub fn compute(&self, content: &[u8]) -> String {
        let hash = blake3::hash(content);
        let hash_bytes = hash.as_bytes();

        // First 16 bytes (128 bits) is plenty for change detection
        hex::encode(&hash_bytes[..16])
    }
}

impl Default for ContentDigest {
    fn default() -> Self {
        Self::new()
    }
}
