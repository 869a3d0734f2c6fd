use quill_crypto::{ContentHasher, Signature, SigningKey};
use quill_gate::Action;
use quill_types::{Address, Identity};
use serde::{Deserialize, Serialize};

use crate::error::{ProgramError, ProgramResult};

/// A state-transition request body.
///
/// Every instruction names the addresses it touches. The program re-derives
/// each one and refuses the request if they disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    CreateNote {
        note: Address,
        creator: Identity,
        title: String,
        content: String,
        is_private: bool,
    },
    DeleteNote {
        note: Address,
    },
    ToggleLike {
        note: Address,
        like: Address,
    },
    ToggleSave {
        note: Address,
        save: Address,
    },
}

impl Instruction {
    /// The guarded action this instruction performs.
    pub fn action(&self) -> Action {
        match self {
            Self::CreateNote { .. } => Action::CreateNote,
            Self::DeleteNote { .. } => Action::DeleteNote,
            Self::ToggleLike { .. } => Action::ToggleLike,
            Self::ToggleSave { .. } => Action::ToggleSave,
        }
    }

    /// The note this instruction targets.
    pub fn note(&self) -> &Address {
        match self {
            Self::CreateNote { note, .. }
            | Self::DeleteNote { note }
            | Self::ToggleLike { note, .. }
            | Self::ToggleSave { note, .. } => note,
        }
    }
}

/// An instruction plus the identity that signed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedRequest {
    pub instruction: Instruction,
    pub signer: Identity,
    pub signature: Option<Signature>,
}

impl SignedRequest {
    /// The digest a signer signs: instruction and signer together, so a
    /// signature can not be replayed under another identity.
    pub fn signing_bytes(instruction: &Instruction, signer: &Identity) -> ProgramResult<Vec<u8>> {
        let digest = ContentHasher::REQUEST
            .hash_json(&(instruction, signer))
            .map_err(|e| ProgramError::Serialization(e.to_string()))?;
        Ok(digest.to_vec())
    }

    /// Build a request signed with `key`.
    pub fn sign(instruction: Instruction, key: &SigningKey) -> ProgramResult<Self> {
        let signer = key.identity();
        let message = Self::signing_bytes(&instruction, &signer)?;
        Ok(Self {
            signature: Some(key.sign(&message)),
            instruction,
            signer,
        })
    }

    /// Build a request without a signature.
    pub fn unsigned(instruction: Instruction, signer: Identity) -> Self {
        Self {
            instruction,
            signer,
            signature: None,
        }
    }

    /// The bytes this request's signature must cover.
    pub fn message(&self) -> ProgramResult<Vec<u8>> {
        Self::signing_bytes(&self.instruction, &self.signer)
    }
}
