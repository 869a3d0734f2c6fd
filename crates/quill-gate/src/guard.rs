use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::GuardError;
use crate::stage::{AccessRequest, Denial, GuardStage, StageDecision, StageResult};
use crate::stages::{LikePolicyStage, OwnershipStage, SignatureStage};

// ---------------------------------------------------------------------------
// GuardOutcome
// ---------------------------------------------------------------------------

/// Final verdict of the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    Denied(Denial),
}

/// The outcome of running a request through the full guard pipeline.
#[derive(Clone, Debug)]
pub struct GuardOutcome {
    pub decision: GuardDecision,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
    /// Total wall-clock time for the pipeline evaluation.
    pub elapsed: Duration,
}

impl GuardOutcome {
    pub fn is_allowed(&self) -> bool {
        self.decision == GuardDecision::Allowed
    }

    /// `Ok(())` when allowed, the denial otherwise.
    pub fn into_result(self) -> Result<(), Denial> {
        match self.decision {
            GuardDecision::Allowed => Ok(()),
            GuardDecision::Denied(denial) => Err(denial),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthorizationGuard
// ---------------------------------------------------------------------------

/// Configurable pipeline of stages that every request passes before any
/// state is touched.
pub struct AuthorizationGuard {
    stages: Vec<Box<dyn GuardStage>>,
}

impl AuthorizationGuard {
    /// Create a guard with an empty pipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Create a guard with the default pipeline:
    /// Signature -> Ownership -> LikePolicy
    pub fn with_default_stages() -> Self {
        let mut guard = Self::new();
        guard.add_stage(Box::new(SignatureStage));
        guard.add_stage(Box::new(OwnershipStage));
        guard.add_stage(Box::new(LikePolicyStage));
        guard
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn GuardStage>) {
        self.stages.push(stage);
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Evaluate a request through the full pipeline.
    ///
    /// The pipeline is **fail-fast**: the first stage that denies stops
    /// evaluation. If all stages pass the request is allowed.
    pub fn evaluate(&self, request: &AccessRequest) -> Result<GuardOutcome, GuardError> {
        let pipeline_start = Instant::now();
        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_start = Instant::now();
            let decision = stage.evaluate(request)?;
            let denial = match decision {
                StageDecision::Pass => None,
                StageDecision::Deny(denial) => Some(denial),
            };
            stage_results.push(StageResult {
                stage_name: stage.name().to_string(),
                passed: denial.is_none(),
                denial,
                elapsed: stage_start.elapsed(),
            });

            if let Some(denial) = denial {
                debug!(
                    action = %request.action,
                    signer = %request.signer,
                    stage = stage.name(),
                    %denial,
                    "request denied"
                );
                return Ok(GuardOutcome {
                    decision: GuardDecision::Denied(denial),
                    stage_results,
                    elapsed: pipeline_start.elapsed(),
                });
            }
        }

        Ok(GuardOutcome {
            decision: GuardDecision::Allowed,
            stage_results,
            elapsed: pipeline_start.elapsed(),
        })
    }
}

impl Default for AuthorizationGuard {
    fn default() -> Self {
        Self::with_default_stages()
    }
}
