//! Client SDK for the Quill note registry.
//!
//! [`NoteClient`] pairs a shared [`NoteProgram`] with one user's signing
//! key. It computes addresses locally, signs every request it submits and
//! offers the listing reads a front end needs.

pub mod client;
pub mod error;
pub mod listing;

pub use client::NoteClient;
pub use error::{SdkError, SdkResult};
pub use listing::{sort_notes, NoteSort};

// Re-export key types
pub use quill_crypto::SigningKey;
pub use quill_program::{LikeMark, Note, NoteProgram, Outcome, ProgramConfig, ProgramError, SaveMark};
pub use quill_types::{Address, Identity, UnixTimestamp};
