//! Cryptographic primitives for the Quill note registry.
//!
//! Provides deterministic address derivation, domain-separated BLAKE3
//! hashing and Ed25519 signing/verification.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod address;
pub mod hasher;
pub mod signer;

pub use address::{
    AddressDeriver, DerivationError, LIKE_SEED, MAX_DERIVATION_INPUT, MAX_SEEDS, NOTE_SEED,
    SAVE_SEED,
};
pub use hasher::{ContentHasher, HasherError};
pub use signer::{verify_signed_by, Signature, SignatureError, SigningKey, VerifyingKey};
