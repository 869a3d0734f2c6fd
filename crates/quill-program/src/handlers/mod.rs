//! State-transition handlers, one per instruction.
//!
//! Each handler checks its preconditions in a fixed order, then commits a
//! single write batch. Nothing is written before every check has passed.

pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod like;
pub(crate) mod save;

use quill_types::Address;

use crate::error::{ProgramError, ProgramResult};
use crate::events::ProgramEvent;
use crate::program::Outcome;

/// A committed transition and the event it announces.
pub(crate) struct Transition {
    pub(crate) outcome: Outcome,
    pub(crate) event: ProgramEvent,
}

fn committed(outcome: Outcome, event: impl Into<ProgramEvent>) -> Transition {
    Transition {
        outcome,
        event: event.into(),
    }
}

/// Fail unless the address a request named is the one derived for it.
fn expect_address(provided: &Address, expected: Address) -> ProgramResult<()> {
    if *provided != expected {
        return Err(ProgramError::AddressMismatch {
            provided: *provided,
            expected,
        });
    }
    Ok(())
}
