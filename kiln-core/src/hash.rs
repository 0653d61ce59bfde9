use std::fmt::{self, Write as _};

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

/// SHA-256 digest of generated file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash the given content.
    pub fn of(content: &str) -> Self {
        let digest = Sha256::digest(content.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Lowercase hex rendering (64 chars).
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(64);
        for b in &self.0 {
            let _ = write!(hex, "{b:02x}");
        }
        hex
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_content_same_hash() {
        assert_eq!(ContentHash::of("class Abc"), ContentHash::of("class Abc"));
    }

    #[test]
    fn test_different_content_different_hash() {
        assert_ne!(ContentHash::of("class Abc"), ContentHash::of("class Abd"));
    }

    #[test]
    fn test_hex_of_empty_content() {
        assert_eq!(
            ContentHash::of("").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
