use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use quill_crypto::SigningKey;

/// Read a signing key stored as 64 hex characters.
pub fn read_key(path: &Path) -> anyhow::Result<SigningKey> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading key file {}", path.display()))?;
    let bytes = hex::decode(text.trim()).context("key file is not hex")?;
    let secret: [u8; 32] = match bytes.try_into() {
        Ok(secret) => secret,
        Err(bytes) => bail!("key file holds {} bytes, expected 32", bytes.len()),
    };
    Ok(SigningKey::from_bytes(secret))
}

/// Write a signing key. Refuses to replace an existing file unless `force`.
pub fn write_key(path: &Path, key: &SigningKey, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    fs::write(path, format!("{}\n", hex::encode(key.as_bytes())))
        .with_context(|| format!("writing key file {}", path.display()))
}
