//! Cache key derivation.

use sha2::{Digest, Sha256};
use std::fmt;

/// Folded into every key; bump when rendering output changes.
pub const KEY_VERSION: &str = "2";

/// Prefix for keys stored in the metadata cache.
pub const METADATA_PREFIX: &str = "thumbs";

/// Digest identifying one (source, action, geometry) render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a render request.
    pub fn derive(source_path: &str, action: &str, canonical_geometry: &str) -> Self {
        let mut hasher = Sha256::new();

        // Length-prefix each component so boundaries can't shift.
        for part in [KEY_VERSION, source_path, action, canonical_geometry] {
            hasher.update((part.len() as u64).to_be_bytes());
            hasher.update(part.as_bytes());
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which the render record lives in the metadata cache.
    pub fn metadata_key(&self) -> String {
        format!("{}:{}", METADATA_PREFIX, self.0)
    }

    /// Sharded storage path: `ab/cd/abcd…`.
    pub fn storage_path(&self) -> String {
        format!("{}/{}/{}", &self.0[0..2], &self.0[2..4], self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_stable() {
        let a = CacheKey::derive("photos/cat.jpg", "thumbnail", "100");
        let b = CacheKey::derive("photos/cat.jpg", "thumbnail", "100");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_component_boundaries() {
        let a = CacheKey::derive("a:b", "c", "1");
        let b = CacheKey::derive("a", "b:c", "1");
        assert_ne!(a, b);
    }

    #[test]
    fn test_storage_path_sharding() {
        let key = CacheKey::derive("photos/cat.jpg", "resize", "10x10");
        let path = key.storage_path();
        let parts: Vec<&str> = path.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], &key.as_str()[0..2]);
        assert_eq!(parts[1], &key.as_str()[2..4]);
        assert_eq!(parts[2], key.as_str());
    }

    #[test]
    fn test_metadata_key() {
        let key = CacheKey::derive("x.png", "resize", "5");
        assert_eq!(key.metadata_key(), format!("thumbs:{}", key));
    }
}
