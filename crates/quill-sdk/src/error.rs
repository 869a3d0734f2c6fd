use quill_crypto::DerivationError;
use quill_gate::Action;
use quill_program::ProgramError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("{action} rejected: {source}")]
    Rejected {
        action: Action,
        #[source]
        source: ProgramError,
    },

    #[error("program error: {0}")]
    Program(#[from] ProgramError),

    #[error("address derivation failed: {0}")]
    Derivation(#[from] DerivationError),
}

impl SdkError {
    pub(crate) fn rejected(action: Action, source: ProgramError) -> Self {
        Self::Rejected { action, source }
    }

    /// The program error behind this failure, if any.
    pub fn program_error(&self) -> Option<&ProgramError> {
        match self {
            Self::Rejected { source, .. } | Self::Program(source) => Some(source),
            Self::Derivation(_) => None,
        }
    }

    /// Stable code of the underlying program error.
    pub fn code(&self) -> Option<u32> {
        self.program_error().map(ProgramError::code)
    }

    /// Whether the request collided with an existing record.
    pub fn is_already_exists(&self) -> bool {
        matches!(self.program_error(), Some(ProgramError::AlreadyExists(_)))
    }

    /// A message fit to show an end user.
    ///
    /// Collisions are reported per action: a duplicate title, a repeated
    /// like and a repeated save each read differently.
    pub fn user_message(&self) -> String {
        let action = match self {
            Self::Rejected { action, .. } => Some(*action),
            _ => None,
        };
        let Some(err) = self.program_error() else {
            return "Title too long to derive a note address".into();
        };
        let msg = match (err, action) {
            (ProgramError::AlreadyExists(_), Some(Action::CreateNote)) => {
                "You already have a note with this title"
            }
            (ProgramError::AlreadyExists(_), Some(Action::ToggleLike)) => {
                "You have already liked this note"
            }
            (ProgramError::AlreadyExists(_), Some(Action::ToggleSave)) => {
                "You have already saved this note"
            }
            (ProgramError::AlreadyExists(_), _) => "That record already exists",
            (ProgramError::Unauthorized, _) => "You are not the owner of this note",
            (ProgramError::MissingSignature, _) => "The request must be signed",
            (ProgramError::InvalidSignature, _) => "The request signature is invalid",
            (ProgramError::SignerMismatch, _) => "Notes can only be created for your own identity",
            (ProgramError::AddressMismatch { .. }, _) => {
                "The request names an address that does not match its contents"
            }
            (ProgramError::AccountKindMismatch(_), _) => "That address does not hold a note",
            (ProgramError::AccountNotFound(_), _) => "Note not found",
            (ProgramError::AddressDerivation(_), _) => "Title too long to derive a note address",
            (ProgramError::CounterOverflow(_), _) => "This note can not take more likes",
            (ProgramError::PrivateBlogNotLikeable, _) => "Private notes can not be liked",
            (ProgramError::CannotLikeOwnBlog, _) => "You can not like your own note",
            (ProgramError::TitleTooLong, _) => "Note title must be 1 to 100 bytes long",
            (ProgramError::ContentEmpty, _) => "Note content can not be empty",
            (ProgramError::ContentTooLong, _) => {
                "Note content is too long (maximum 1000 bytes)"
            }
            (ProgramError::Storage(_), _)
            | (ProgramError::Serialization(_), _)
            | (ProgramError::Guard(_), _) => "Internal error, please try again",
        };
        msg.to_string()
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
