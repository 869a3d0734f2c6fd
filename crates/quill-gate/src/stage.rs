use std::fmt;
use std::time::Duration;

use quill_crypto::Signature;
use quill_types::Identity;

use crate::error::GuardError;

// ---------------------------------------------------------------------------
// AccessRequest
// ---------------------------------------------------------------------------

/// The state transition being attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    CreateNote,
    DeleteNote,
    ToggleLike,
    ToggleSave,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateNote => "create_note",
            Self::DeleteNote => "delete_note",
            Self::ToggleLike => "toggle_like",
            Self::ToggleSave => "toggle_save",
        };
        f.write_str(s)
    }
}

/// Stored facts about the note a request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetFacts {
    pub creator: Identity,
    pub is_private: bool,
}

/// Everything the guard needs to decide on one request.
#[derive(Clone, Debug)]
pub struct AccessRequest {
    /// What the signer is trying to do.
    pub action: Action,
    /// Identity the request claims to be signed by.
    pub signer: Identity,
    /// Signature over `message`, if any.
    pub signature: Option<Signature>,
    /// The exact bytes the signature must cover.
    pub message: Vec<u8>,
    /// Identity the request acts on behalf of (the creator of a new note).
    pub claimed_authority: Option<Identity>,
    /// The note being acted on; `None` for creation.
    pub target: Option<TargetFacts>,
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Why a request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Denial {
    /// The request carries no signature.
    MissingSignature,
    /// The signature does not verify under the signer's key.
    InvalidSignature,
    /// The signer differs from the identity the request acts for.
    SignerMismatch,
    /// The signer does not own the target note.
    Unauthorized,
    /// The target note is private and can not be liked.
    PrivateNotLikeable,
    /// The signer created the target note.
    SelfLike,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingSignature => "missing signature",
            Self::InvalidSignature => "invalid signature",
            Self::SignerMismatch => "signer mismatch",
            Self::Unauthorized => "signer does not own the note",
            Self::PrivateNotLikeable => "private note can not be liked",
            Self::SelfLike => "creator can not like own note",
        };
        f.write_str(s)
    }
}

/// The outcome of a single stage evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// Proceed to the next stage.
    Pass,
    /// Refuse the request.
    Deny(Denial),
}

impl StageDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Recorded result from a completed stage evaluation.
#[derive(Clone, Debug)]
pub struct StageResult {
    pub stage_name: String,
    pub passed: bool,
    pub denial: Option<Denial>,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// GuardStage trait
// ---------------------------------------------------------------------------

/// A single evaluation stage in the guard pipeline.
///
/// The trait is object-safe and `Send + Sync` so stages can be stored in a
/// `Vec<Box<dyn GuardStage>>`.
pub trait GuardStage: Send + Sync {
    /// Human-readable name of this stage (e.g. "signature", "ownership").
    fn name(&self) -> &str;

    /// Evaluate the request and return a decision.
    fn evaluate(&self, request: &AccessRequest) -> Result<StageDecision, GuardError>;
}

/// Target facts for a stage that can not run without them.
pub(crate) fn require_target<'a>(
    stage: &dyn GuardStage,
    request: &'a AccessRequest,
) -> Result<&'a TargetFacts, GuardError> {
    request.target.as_ref().ok_or_else(|| GuardError::MissingTarget {
        stage: stage.name().to_string(),
        action: request.action.to_string(),
    })
}
