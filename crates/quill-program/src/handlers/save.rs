use quill_store::{AccountStore, WriteBatch};
use quill_types::Address;

use super::{committed, expect_address, Transition};
use crate::clock::Clock;
use crate::error::ProgramResult;
use crate::events::{SaveAction, SaveEvent};
use crate::instruction::SignedRequest;
use crate::program::{NoteProgram, Outcome};
use crate::records::{Record, SaveMark};

pub(crate) fn run<S: AccountStore, C: Clock>(
    program: &NoteProgram<S, C>,
    request: &SignedRequest,
    message: &[u8],
    note_address: &Address,
    save_address: &Address,
) -> ProgramResult<Transition> {
    let note = program.note(note_address)?;
    program.authorize(request, message, None, Some(note.target_facts()))?;

    let user = request.signer;
    let address = program.deriver.save_address(&user, note_address)?;
    expect_address(save_address, address)?;

    let mark = SaveMark {
        user,
        blog: *note_address,
        saved_at: program.now(),
        is_saved: true,
    };
    program
        .store
        .commit(WriteBatch::new().create(address, mark.to_account(user)?))?;

    let outcome = Outcome::Saved {
        note: *note_address,
        save: address,
        saved_at: mark.saved_at,
    };
    let event = SaveEvent {
        note_address: *note_address,
        user,
        action: SaveAction::Save,
    };
    Ok(committed(outcome, event))
}
