use std::fmt;

use ed25519_dalek::{Signer, Verifier};
use quill_types::Identity;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ed25519 signing key held by a note author or reader.
#[derive(Clone)]
pub struct SigningKey(ed25519_dalek::SigningKey);

/// Ed25519 public key. Its bytes are the holder's [`Identity`].
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// Ed25519 signature over a request digest.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl SigningKey {
    /// Fresh random key.
    pub fn generate() -> Self {
        Self(ed25519_dalek::SigningKey::generate(&mut rand::thread_rng()))
    }

    pub fn from_bytes(secret: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&secret))
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    /// Identity of the holder of this key.
    pub fn identity(&self) -> Identity {
        self.verifying_key().identity()
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message))
    }

    /// Raw secret bytes, for key files.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl VerifyingKey {
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), SignatureError> {
        self.0
            .verify(message, &signature.0)
            .map_err(|_| SignatureError::InvalidSignature)
    }

    /// The identity this key signs for.
    pub fn identity(&self) -> Identity {
        Identity::from_bytes(self.0.to_bytes())
    }

    /// Recover the verifying key behind an identity.
    ///
    /// Fails for identities that are not valid curve points.
    pub fn from_identity(identity: &Identity) -> Result<Self, SignatureError> {
        ed25519_dalek::VerifyingKey::from_bytes(identity.as_bytes())
            .map(Self)
            .map_err(|_| SignatureError::InvalidKey)
    }
}

/// Check that `signature` over `message` was made by `identity`.
///
/// An identity that is not a curve point can not have signed anything, so
/// it is reported as [`SignatureError::InvalidKey`].
pub fn verify_signed_by(
    identity: &Identity,
    message: &[u8],
    signature: &Signature,
) -> Result<(), SignatureError> {
    VerifyingKey::from_identity(identity)?.verify(message, signature)
}

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(ed25519_dalek::Signature::from_bytes(&bytes))
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

// Hex in JSON, next to hex identities and addresses; raw bytes in binary formats.
impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let bytes = if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            hex::decode(s).map_err(D::Error::custom)?
        } else {
            Vec::<u8>::deserialize(deserializer)?
        };
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| D::Error::invalid_length(b.len(), &"64 signature bytes"))?;
        Ok(Self::from_bytes(arr))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey(<redacted> for {})", self.identity().short_id())
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerifyingKey({})", self.identity().short_id())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

/// Errors from signature checks.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature does not verify")]
    InvalidSignature,
    #[error("identity is not a valid public key")]
    InvalidKey,
}
