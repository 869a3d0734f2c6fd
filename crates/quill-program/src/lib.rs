//! Note registry state machine for Quill.
//!
//! This crate is the heart of Quill. It provides:
//! - The three record schemas ([`Note`], [`LikeMark`], [`SaveMark`])
//! - Signed requests carrying one [`Instruction`] each
//! - [`NoteProgram`], which validates, authorizes and commits the four
//!   state transitions (create, delete, like, save) atomically
//! - Notification events fanned out through an [`EventBus`]
//! - Program errors with stable machine-readable codes
//!
//! Uniqueness is never checked by lookup: every record lives at an address
//! derived from its identifying inputs, and creating over an occupied
//! address fails. That one rule makes notes unique per (creator, title) and
//! marks unique per (user, note).

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
mod handlers;
pub mod instruction;
pub mod program;
pub mod records;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, ProgramConfig};
pub use error::{ErrorCategory, ProgramError, ProgramResult};
pub use events::{
    EventBus, EventFilter, EventKind, EventStream, LikeAction, LikeEvent, NoteEvent, NoteLabel,
    ProgramEvent, SaveAction, SaveEvent,
};
pub use instruction::{Instruction, SignedRequest};
pub use program::{NoteProgram, Outcome};
pub use records::{LikeMark, Note, Record, SaveMark, MAX_CONTENT_LEN, MAX_TITLE_LEN};
