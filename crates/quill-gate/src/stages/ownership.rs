use crate::error::GuardError;
use crate::stage::{require_target, AccessRequest, Action, Denial, GuardStage, StageDecision};

/// Ownership stage.
///
/// A note can only be deleted by the identity stored as its creator.
pub struct OwnershipStage;

impl GuardStage for OwnershipStage {
    fn name(&self) -> &str {
        "ownership"
    }

    fn evaluate(&self, request: &AccessRequest) -> Result<StageDecision, GuardError> {
        if request.action != Action::DeleteNote {
            return Ok(StageDecision::Pass);
        }
        let target = require_target(self, request)?;
        if target.creator != request.signer {
            return Ok(StageDecision::Deny(Denial::Unauthorized));
        }
        Ok(StageDecision::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::TargetFacts;
    use quill_types::Identity;

    fn request(action: Action, signer: u8, creator: Option<u8>) -> AccessRequest {
        AccessRequest {
            action,
            signer: Identity::from_bytes([signer; 32]),
            signature: None,
            message: Vec::new(),
            claimed_authority: None,
            target: creator.map(|c| TargetFacts {
                creator: Identity::from_bytes([c; 32]),
                is_private: false,
            }),
        }
    }

    #[test]
    fn creator_may_delete() {
        let decision = OwnershipStage.evaluate(&request(Action::DeleteNote, 1, Some(1))).unwrap();
        assert!(decision.is_pass());
    }

    #[test]
    fn non_creator_is_unauthorized() {
        assert_eq!(
            OwnershipStage.evaluate(&request(Action::DeleteNote, 2, Some(1))).unwrap(),
            StageDecision::Deny(Denial::Unauthorized)
        );
    }

    #[test]
    fn other_actions_are_not_ownership_gated() {
        let decision = OwnershipStage.evaluate(&request(Action::ToggleSave, 2, Some(1))).unwrap();
        assert!(decision.is_pass());
    }

    #[test]
    fn delete_without_target_is_an_error() {
        let err = OwnershipStage.evaluate(&request(Action::DeleteNote, 1, None)).unwrap_err();
        assert!(matches!(err, GuardError::MissingTarget { .. }));
    }
}
