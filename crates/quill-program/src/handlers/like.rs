use quill_store::{AccountStore, WriteBatch};
use quill_types::Address;

use super::{committed, expect_address, Transition};
use crate::clock::Clock;
use crate::error::{ProgramError, ProgramResult};
use crate::events::{LikeAction, LikeEvent};
use crate::instruction::SignedRequest;
use crate::program::{NoteProgram, Outcome};
use crate::records::{LikeMark, Record};

pub(crate) fn run<S: AccountStore, C: Clock>(
    program: &NoteProgram<S, C>,
    request: &SignedRequest,
    message: &[u8],
    note_address: &Address,
    like_address: &Address,
) -> ProgramResult<Transition> {
    let mut note = program.note(note_address)?;
    program.authorize(request, message, None, Some(note.target_facts()))?;

    let user = request.signer;
    let address = program.deriver.like_address(&user, note_address)?;
    expect_address(like_address, address)?;

    note.like_count = note
        .like_count
        .checked_add(1)
        .ok_or(ProgramError::CounterOverflow(*note_address))?;
    let mark = LikeMark {
        user,
        blog: *note_address,
        is_liked: true,
    };

    // The mark goes first: an existing like fails the batch before the
    // counter is touched.
    let batch = WriteBatch::new()
        .create(address, mark.to_account(user)?)
        .update(*note_address, note.to_account(note.creator)?);
    program.store.commit(batch)?;

    let outcome = Outcome::Liked {
        note: *note_address,
        like: address,
        like_count: note.like_count,
    };
    let event = LikeEvent {
        note_address: *note_address,
        user,
        action: LikeAction::Like,
        like_count: note.like_count,
    };
    Ok(committed(outcome, event))
}
