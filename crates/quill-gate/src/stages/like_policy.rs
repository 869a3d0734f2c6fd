use tracing::debug;

use crate::error::GuardError;
use crate::stage::{require_target, AccessRequest, Action, Denial, GuardStage, StageDecision};

/// Like eligibility stage.
///
/// Private notes can not be liked by anyone, and nobody can like their own
/// note. Privacy is checked first. Saving is never restricted here.
pub struct LikePolicyStage;

impl GuardStage for LikePolicyStage {
    fn name(&self) -> &str {
        "like-policy"
    }

    fn evaluate(&self, request: &AccessRequest) -> Result<StageDecision, GuardError> {
        if request.action != Action::ToggleLike {
            return Ok(StageDecision::Pass);
        }
        let target = require_target(self, request)?;
        if target.is_private {
            debug!(signer = %request.signer, "like refused: private note");
            return Ok(StageDecision::Deny(Denial::PrivateNotLikeable));
        }
        if target.creator == request.signer {
            debug!(signer = %request.signer, "like refused: own note");
            return Ok(StageDecision::Deny(Denial::SelfLike));
        }
        Ok(StageDecision::Pass)
    }
}
