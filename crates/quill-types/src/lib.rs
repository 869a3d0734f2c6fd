//! Foundation types for the Quill note registry.
//!
//! Every other Quill crate depends on `quill-types`.
//!
//! # Key Types
//!
//! - [`Identity`]: Public identity of a signer (Ed25519 verifying key bytes)
//! - [`Address`]: Deterministically derived storage address of a record
//! - [`UnixTimestamp`]: Ledger clock reading in seconds

pub mod address;
pub mod error;
pub mod identity;
mod serde_hex;

pub use address::Address;
pub use error::TypeError;
pub use identity::Identity;

/// Ledger clock reading, seconds since the UNIX epoch.
pub type UnixTimestamp = i64;

pub(crate) fn decode_32(s: &str) -> Result<[u8; 32], TypeError> {
    let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(TypeError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        });
    }
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}
