//! Message digest algorithms used by the gateway protocol

use crate::errors::{CryptoError, CustomResult};

/// Trait for generating a message digest
pub trait GenerateDigest {
    /// Generate a digest of the given message
    fn generate_digest(&self, message: &[u8]) -> CustomResult<Vec<u8>, CryptoError>;
}

/// The MD5 algorithm. Weak by modern standards, but it is what the gateway's
/// shared-secret signature scheme is defined over.
#[derive(Debug)]
pub struct Md5;

impl GenerateDigest for Md5 {
    fn generate_digest(&self, message: &[u8]) -> CustomResult<Vec<u8>, CryptoError> {
        let digest = md5::compute(message);
        Ok(digest.to_vec())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn md5_digest_matches_known_vector() {
        let digest = Md5.generate_digest(b"abc").unwrap();
        assert_eq!(hex::encode(digest), "900150983cd24fb0d6963f7d28e17f72");
    }
}
