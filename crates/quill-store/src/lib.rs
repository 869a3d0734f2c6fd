//! Account storage for the Quill note registry.
//!
//! Every record lives in an account at a derived [`Address`]. The store
//! keeps each account as a kind tag, the identity that paid for it, and the
//! record bytes. It never interprets record contents.
//!
//! # Design Rules
//!
//! 1. An address holds at most one account. Creating over an occupied
//!    address fails: derivation collisions are the uniqueness check.
//! 2. A [`WriteBatch`] commits all-or-nothing. Every operation is checked
//!    before any is applied.
//! 3. Concurrent reads are always safe; commits are serialized.
//! 4. Closed accounts leave no trace; a later read returns `None`.
//!
//! [`Address`]: quill_types::Address

pub mod account;
pub mod batch;
pub mod error;
pub mod memory;
pub mod traits;

pub use account::{AccountKind, StoredAccount};
pub use batch::{BatchOp, WriteBatch};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryAccountStore;
pub use traits::AccountStore;
