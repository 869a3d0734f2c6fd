use quill_crypto::ContentHasher;
use quill_types::Identity;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Discriminator width on disk.
pub const DISCRIMINATOR_LEN: usize = 8;

/// The schema an account holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountKind {
    Note,
    LikeMark,
    SaveMark,
}

impl AccountKind {
    pub const ALL: [AccountKind; 3] = [Self::Note, Self::LikeMark, Self::SaveMark];

    /// Schema name hashed into the discriminator.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::LikeMark => "LikeMark",
            Self::SaveMark => "SaveMark",
        }
    }

    /// Leading type tag written before the record fields.
    pub fn discriminator(&self) -> [u8; DISCRIMINATOR_LEN] {
        ContentHasher::ACCOUNT.discriminator(self.name())
    }

    /// Look up the kind carrying a discriminator.
    pub fn from_discriminator(tag: &[u8; DISCRIMINATOR_LEN]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.discriminator() == *tag)
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored account: kind tag, payer, and encoded record fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredAccount {
    /// The schema of `data`.
    pub kind: AccountKind,
    /// Identity that paid for the storage; closing reclaims it to a recipient.
    pub payer: Identity,
    /// Record fields in declared order.
    pub data: Vec<u8>,
}

impl StoredAccount {
    pub fn new(kind: AccountKind, payer: Identity, data: Vec<u8>) -> Self {
        Self { kind, payer, data }
    }

    /// Storage footprint: discriminator plus record bytes.
    pub fn size(&self) -> u64 {
        (DISCRIMINATOR_LEN + self.data.len()) as u64
    }

    /// On-disk layout: discriminator followed by the record fields.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(DISCRIMINATOR_LEN + self.data.len());
        out.extend_from_slice(&self.kind.discriminator());
        out.extend_from_slice(&self.data);
        out
    }

    /// Parse the on-disk layout produced by [`Self::to_bytes`].
    pub fn from_bytes(payer: Identity, bytes: &[u8]) -> StoreResult<Self> {
        if bytes.len() < DISCRIMINATOR_LEN {
            return Err(StoreError::Serialization(format!(
                "account is {} bytes, shorter than its discriminator",
                bytes.len()
            )));
        }
        let mut tag = [0u8; DISCRIMINATOR_LEN];
        tag.copy_from_slice(&bytes[..DISCRIMINATOR_LEN]);
        let kind =
            AccountKind::from_discriminator(&tag).ok_or(StoreError::UnknownDiscriminator(tag))?;
        Ok(Self::new(kind, payer, bytes[DISCRIMINATOR_LEN..].to_vec()))
    }
}
