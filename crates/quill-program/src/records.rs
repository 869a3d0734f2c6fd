use quill_gate::TargetFacts;
use quill_store::{AccountKind, StoredAccount};
use quill_types::{Address, Identity, UnixTimestamp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ProgramError, ProgramResult};

/// Maximum title length in bytes.
pub const MAX_TITLE_LEN: usize = 100;
/// Maximum content length in bytes.
pub const MAX_CONTENT_LEN: usize = 1000;

/// A persisted record schema.
///
/// Records are stored as their account discriminator followed by their
/// fields in declared order, bincode-encoded (strings length-prefixed).
pub trait Record: Serialize + DeserializeOwned {
    const KIND: AccountKind;

    /// Encode into a stored account paid for by `payer`.
    fn to_account(&self, payer: Identity) -> ProgramResult<StoredAccount> {
        let data = bincode::serialize(self).map_err(|e| ProgramError::Serialization(e.to_string()))?;
        Ok(StoredAccount::new(Self::KIND, payer, data))
    }

    /// Decode the account stored at `address`.
    fn from_account(address: &Address, account: &StoredAccount) -> ProgramResult<Self> {
        if account.kind != Self::KIND {
            return Err(ProgramError::AccountKindMismatch(*address));
        }
        bincode::deserialize(&account.data).map_err(|e| ProgramError::Serialization(e.to_string()))
    }
}

/// A published note. One per (creator, title).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub title: String,
    pub is_private: bool,
    pub creator: Identity,
    pub like_count: u64,
    pub created_at: UnixTimestamp,
    pub content: String,
}

impl Note {
    /// The facts the authorization guard needs about this note.
    pub fn target_facts(&self) -> TargetFacts {
        TargetFacts {
            creator: self.creator,
            is_private: self.is_private,
        }
    }
}

impl Record for Note {
    const KIND: AccountKind = AccountKind::Note;
}

/// Existence-only record: `user` liked `blog`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeMark {
    pub user: Identity,
    pub blog: Address,
    /// Always `true` while the record exists.
    pub is_liked: bool,
}

impl Record for LikeMark {
    const KIND: AccountKind = AccountKind::LikeMark;
}

/// Existence-only record: `user` saved `blog`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMark {
    pub user: Identity,
    pub blog: Address,
    pub saved_at: UnixTimestamp,
    /// Always `true` while the record exists.
    pub is_saved: bool,
}

impl Record for SaveMark {
    const KIND: AccountKind = AccountKind::SaveMark;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> Note {
        Note {
            title: "Public Blog".into(),
            is_private: false,
            creator: Identity::from_bytes([1; 32]),
            like_count: 3,
            created_at: 1_700_000_000,
            content: "Content".into(),
        }
    }

    #[test]
    fn note_layout_is_discriminator_then_fields_in_order() {
        let account = note().to_account(Identity::from_bytes([1; 32])).unwrap();
        let bytes = account.to_bytes();

        assert_eq!(&bytes[..8], &AccountKind::Note.discriminator());
        // title: u64 little-endian length, then bytes
        assert_eq!(&bytes[8..16], &11u64.to_le_bytes());
        assert_eq!(&bytes[16..27], b"Public Blog");
        // is_private
        assert_eq!(bytes[27], 0);
        // creator
        assert_eq!(&bytes[28..60], &[1u8; 32]);
        // like_count
        assert_eq!(&bytes[60..68], &3u64.to_le_bytes());
    }

    #[test]
    fn note_decodes_from_its_account() {
        let original = note();
        let address = Address::from_bytes([5; 32]);
        let account = original.to_account(original.creator).unwrap();
        assert_eq!(Note::from_account(&address, &account).unwrap(), original);
    }

    #[test]
    fn decoding_the_wrong_kind_fails() {
        let address = Address::from_bytes([5; 32]);
        let mark = LikeMark {
            user: Identity::from_bytes([2; 32]),
            blog: address,
            is_liked: true,
        };
        let account = mark.to_account(mark.user).unwrap();
        assert_eq!(
            Note::from_account(&address, &account),
            Err(ProgramError::AccountKindMismatch(address))
        );
    }

    #[test]
    fn json_uses_camel_case_fields() {
        let json = serde_json::to_value(note()).unwrap();
        assert_eq!(json["isPrivate"], false);
        assert_eq!(json["likeCount"], 3);
        assert_eq!(json["createdAt"], 1_700_000_000);
    }

    #[test]
    fn target_facts_mirror_note() {
        let facts = note().target_facts();
        assert_eq!(facts.creator, Identity::from_bytes([1; 32]));
        assert!(!facts.is_private);
    }
}
