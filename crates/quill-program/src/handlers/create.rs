use quill_store::{AccountStore, WriteBatch};
use quill_types::{Address, Identity};

use super::{committed, expect_address, Transition};
use crate::clock::Clock;
use crate::error::{ProgramError, ProgramResult};
use crate::events::{NoteEvent, NoteLabel};
use crate::instruction::SignedRequest;
use crate::program::{NoteProgram, Outcome};
use crate::records::{Note, Record, MAX_CONTENT_LEN, MAX_TITLE_LEN};

/// Fields of a `CreateNote` instruction.
pub(crate) struct NewNote<'a> {
    pub(crate) address: &'a Address,
    pub(crate) creator: &'a Identity,
    pub(crate) title: &'a str,
    pub(crate) content: &'a str,
    pub(crate) is_private: bool,
}

/// Length checks on title and content, in bytes.
///
/// A title must be 1 to `MAX_TITLE_LEN` bytes; both ends of that range
/// report `TitleTooLong`.
pub(crate) fn validate_note_input(title: &str, content: &str) -> ProgramResult<()> {
    if title.is_empty() || title.len() > MAX_TITLE_LEN {
        return Err(ProgramError::TitleTooLong);
    }
    if content.is_empty() {
        return Err(ProgramError::ContentEmpty);
    }
    if content.len() > MAX_CONTENT_LEN {
        return Err(ProgramError::ContentTooLong);
    }
    Ok(())
}

pub(crate) fn run<S: AccountStore, C: Clock>(
    program: &NoteProgram<S, C>,
    request: &SignedRequest,
    message: &[u8],
    new: NewNote<'_>,
) -> ProgramResult<Transition> {
    program.authorize(request, message, Some(*new.creator), None)?;
    validate_note_input(new.title, new.content)?;

    let address = program.deriver.note_address(new.creator, new.title)?;
    expect_address(new.address, address)?;

    let note = Note {
        title: new.title.to_owned(),
        is_private: new.is_private,
        creator: *new.creator,
        like_count: 0,
        created_at: program.now(),
        content: new.content.to_owned(),
    };
    let account = note.to_account(note.creator)?;
    program.store.commit(WriteBatch::new().create(address, account))?;

    let event = NoteEvent {
        label: NoteLabel::Create,
        note_address: address,
        creator: note.creator,
        is_private: note.is_private,
        title: note.title,
    };
    Ok(committed(Outcome::Created { note: address }, event))
}
