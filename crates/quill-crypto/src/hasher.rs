/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"quill-account-v1"`) that is
/// prepended to every hash computation, so identical bytes hashed for two
/// different purposes never produce the same digest.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for stored account discriminators.
    pub const ACCOUNT: Self = Self {
        domain: "quill-account-v1",
    };
    /// Hasher for program namespace addresses.
    pub const NAMESPACE: Self = Self {
        domain: "quill-namespace-v1",
    };
    /// Hasher for signed request digests.
    pub const REQUEST: Self = Self {
        domain: "quill-request-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Hash a serializable value as JSON with domain separation.
    pub fn hash_json<T: serde::Serialize>(&self, value: &T) -> Result<[u8; 32], HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.hash(&data))
    }

    /// Eight-byte type tag for a schema name: the leading bytes of its hash.
    pub fn discriminator(&self, name: &str) -> [u8; 8] {
        let digest = self.hash(name.as_bytes());
        let mut tag = [0u8; 8];
        tag.copy_from_slice(&digest[..8]);
        tag
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"hello world";
        assert_eq!(ContentHasher::ACCOUNT.hash(data), ContentHasher::ACCOUNT.hash(data));
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        let account = ContentHasher::ACCOUNT.hash(data);
        let namespace = ContentHasher::NAMESPACE.hash(data);
        let request = ContentHasher::REQUEST.hash(data);
        assert_ne!(account, namespace);
        assert_ne!(account, request);
        assert_ne!(namespace, request);
    }

    #[test]
    fn discriminators_are_distinct_per_name() {
        let note = ContentHasher::ACCOUNT.discriminator("Note");
        let like = ContentHasher::ACCOUNT.discriminator("LikeMark");
        let save = ContentHasher::ACCOUNT.discriminator("SaveMark");
        assert_ne!(note, like);
        assert_ne!(note, save);
        assert_ne!(like, save);
        assert_eq!(note, ContentHasher::ACCOUNT.discriminator("Note"));
    }

    #[test]
    fn hash_json_matches_hash_of_encoding() {
        let value = serde_json::json!({"title": "hello", "n": 1});
        let bytes = serde_json::to_vec(&value).unwrap();
        assert_eq!(
            ContentHasher::REQUEST.hash_json(&value).unwrap(),
            ContentHasher::REQUEST.hash(&bytes)
        );
    }

    #[test]
    fn custom_domain() {
        let hasher = ContentHasher::new("my-custom-domain-v1");
        assert_eq!(hasher.domain(), "my-custom-domain-v1");
        assert_ne!(hasher.hash(b"data"), ContentHasher::NAMESPACE.hash(b"data"));
    }
}
