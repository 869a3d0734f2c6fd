//! Authorization guard for the Quill note registry.
//!
//! Every state transition passes through the [`AuthorizationGuard`] before
//! it touches storage. The guard is a fail-fast pipeline of stages:
//!
//! ```text
//! Signature ──> Ownership ──> LikePolicy
//! ```
//!
//! The first stage that denies stops evaluation and its [`Denial`] is the
//! outcome. Stages only look at the request and at facts about the target
//! note the handler already loaded; they never read storage themselves.

pub mod error;
pub mod guard;
pub mod stage;
pub mod stages;

pub use error::GuardError;
pub use guard::{AuthorizationGuard, GuardDecision, GuardOutcome};
pub use stage::{AccessRequest, Action, Denial, GuardStage, StageDecision, StageResult, TargetFacts};
pub use stages::{LikePolicyStage, OwnershipStage, SignatureStage};
