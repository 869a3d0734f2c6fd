use quill_types::Address;

/// Errors from account store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An account already occupies the address.
    #[error("account already exists: {0}")]
    AlreadyExists(Address),

    /// No account exists at the address.
    #[error("account not found: {0}")]
    NotFound(Address),

    /// The leading type tag matches no known account kind.
    #[error("unknown account discriminator {0:02x?}")]
    UnknownDiscriminator([u8; 8]),

    /// An update tried to replace an account with one of another kind.
    #[error("account {address} is a {stored}, update carries a {requested}")]
    KindMismatch {
        address: Address,
        stored: crate::account::AccountKind,
        requested: crate::account::AccountKind,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from snapshot files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
