use quill_crypto::DerivationError;
use quill_gate::{Denial, GuardError};
use quill_store::StoreError;
use quill_types::Address;

/// Errors surfaced by the note program.
///
/// Every precondition failure aborts the whole transition before any state
/// is written. Each variant maps to a stable [`code`](Self::code) that
/// clients can match on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    // -- uniqueness --
    #[error("account already exists: {0}")]
    AlreadyExists(Address),

    // -- authorization --
    #[error("signer is not the note creator")]
    Unauthorized,

    #[error("request is not signed")]
    MissingSignature,

    #[error("address {provided} does not match derived address {expected}")]
    AddressMismatch { provided: Address, expected: Address },

    #[error("signature does not verify under the signer's key")]
    InvalidSignature,

    #[error("signer does not match the requesting authority")]
    SignerMismatch,

    // -- existence --
    #[error("account {0} holds a different record type")]
    AccountKindMismatch(Address),

    #[error("account not found: {0}")]
    AccountNotFound(Address),

    // -- internal --
    #[error("address derivation failed: {0}")]
    AddressDerivation(#[from] DerivationError),

    #[error("like counter overflow on note {0}")]
    CounterOverflow(Address),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("guard error: {0}")]
    Guard(#[from] GuardError),

    // -- policy and validation --
    #[error("Cannot like or unlike private blogs")]
    PrivateBlogNotLikeable,

    #[error("Cannot like your own blog")]
    CannotLikeOwnBlog,

    #[error("Title exceeds maximum allowed length (100 bytes)")]
    TitleTooLong,

    #[error("Content cannot be empty")]
    ContentEmpty,

    #[error("Content exceeds maximum allowed length (1000 bytes)")]
    ContentTooLong,
}

/// Coarse classification of program errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    Authorization,
    Policy,
    Existence,
    Uniqueness,
    Internal,
}

impl ProgramError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> u32 {
        match self {
            Self::AlreadyExists(_) => 0,
            Self::Unauthorized => 2001,
            Self::MissingSignature => 2002,
            Self::AddressMismatch { .. } => 2006,
            Self::InvalidSignature => 2010,
            Self::SignerMismatch => 2011,
            Self::AccountKindMismatch(_) => 3002,
            Self::AccountNotFound(_) => 3012,
            Self::AddressDerivation(_) => 4000,
            Self::CounterOverflow(_) => 4100,
            Self::Storage(_) => 4200,
            Self::Serialization(_) => 4201,
            Self::Guard(_) => 4300,
            Self::PrivateBlogNotLikeable => 6000,
            Self::CannotLikeOwnBlog => 6001,
            Self::TitleTooLong => 6002,
            Self::ContentEmpty => 6003,
            Self::ContentTooLong => 6004,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TitleTooLong | Self::ContentEmpty | Self::ContentTooLong => {
                ErrorCategory::Validation
            }
            Self::Unauthorized
            | Self::MissingSignature
            | Self::InvalidSignature
            | Self::SignerMismatch
            | Self::AddressMismatch { .. } => ErrorCategory::Authorization,
            Self::PrivateBlogNotLikeable | Self::CannotLikeOwnBlog => ErrorCategory::Policy,
            Self::AccountNotFound(_) | Self::AccountKindMismatch(_) => ErrorCategory::Existence,
            Self::AlreadyExists(_) => ErrorCategory::Uniqueness,
            Self::AddressDerivation(_)
            | Self::CounterOverflow(_)
            | Self::Storage(_)
            | Self::Serialization(_)
            | Self::Guard(_) => ErrorCategory::Internal,
        }
    }
}

impl From<StoreError> for ProgramError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(address) => Self::AlreadyExists(address),
            StoreError::NotFound(address) => Self::AccountNotFound(address),
            StoreError::KindMismatch { address, .. } => Self::AccountKindMismatch(address),
            StoreError::Serialization(msg) => Self::Serialization(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<Denial> for ProgramError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::MissingSignature => Self::MissingSignature,
            Denial::InvalidSignature => Self::InvalidSignature,
            Denial::SignerMismatch => Self::SignerMismatch,
            Denial::Unauthorized => Self::Unauthorized,
            Denial::PrivateNotLikeable => Self::PrivateBlogNotLikeable,
            Denial::SelfLike => Self::CannotLikeOwnBlog,
        }
    }
}

/// Result alias for program operations.
pub type ProgramResult<T> = Result<T, ProgramError>;
