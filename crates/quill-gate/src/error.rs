/// Errors that abort guard evaluation.
///
/// These signal a malformed evaluation rather than a denied request; denials
/// are reported through [`crate::Denial`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// A stage needs facts about the target note that the caller did not supply.
    #[error("stage '{stage}' requires target facts for {action}")]
    MissingTarget { stage: String, action: String },

    /// A stage returned an unexpected error.
    #[error("stage error in '{stage}': {message}")]
    StageError { stage: String, message: String },
}

impl GuardError {
    /// Create a stage error with a name and message.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageError {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
