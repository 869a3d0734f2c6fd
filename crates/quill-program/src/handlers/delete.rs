use quill_store::{AccountStore, StoredAccount, WriteBatch};
use quill_types::Address;

use super::{committed, expect_address, Transition};
use crate::clock::Clock;
use crate::error::ProgramResult;
use crate::events::{NoteEvent, NoteLabel};
use crate::instruction::SignedRequest;
use crate::program::{NoteProgram, Outcome};

pub(crate) fn run<S: AccountStore, C: Clock>(
    program: &NoteProgram<S, C>,
    request: &SignedRequest,
    message: &[u8],
    address: &Address,
) -> ProgramResult<Transition> {
    let note = program.note(address)?;
    program.authorize(request, message, None, Some(note.target_facts()))?;
    expect_address(address, program.deriver.note_address(&note.creator, &note.title)?)?;

    // Marks pointing at this note are left in place.
    let closed = program.store.commit(WriteBatch::new().close(*address))?;
    let reclaimed_bytes = closed.iter().map(StoredAccount::size).sum();

    let outcome = Outcome::Deleted {
        note: *address,
        recipient: note.creator,
        reclaimed_bytes,
    };
    let event = NoteEvent {
        label: NoteLabel::Delete,
        note_address: *address,
        creator: note.creator,
        is_private: note.is_private,
        title: note.title,
    };
    Ok(committed(outcome, event))
}

#[cfg(test)]
mod tests {
    use crate::clock::FixedClock;
    use crate::config::ProgramConfig;
    use crate::error::ProgramError;
    use crate::instruction::{Instruction, SignedRequest};
    use crate::program::{NoteProgram, Outcome};
    use crate::records::{Note, Record};
    use quill_crypto::SigningKey;
    use quill_store::{AccountStore, InMemoryAccountStore};

    #[test]
    fn reclaims_exactly_the_note_account() {
        let p = NoteProgram::new(
            InMemoryAccountStore::new(),
            FixedClock::new(1),
            &ProgramConfig::default(),
        );
        let owner = SigningKey::generate();
        let note = p.deriver().note_address(&owner.identity(), "Bytes").unwrap();
        let create = Instruction::CreateNote {
            note,
            creator: owner.identity(),
            title: "Bytes".into(),
            content: "some content".into(),
            is_private: true,
        };
        p.process(&SignedRequest::sign(create, &owner).unwrap()).unwrap();
        let size = p.store().read(&note).unwrap().unwrap().size();

        let outcome = p
            .process(&SignedRequest::sign(Instruction::DeleteNote { note }, &owner).unwrap())
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Deleted {
                note,
                recipient: owner.identity(),
                reclaimed_bytes: size,
            }
        );
        assert_eq!(p.store().total_bytes().unwrap(), 0);
    }

    #[test]
    fn delete_requires_a_signature() {
        let p = NoteProgram::new(
            InMemoryAccountStore::new(),
            FixedClock::new(1),
            &ProgramConfig::default(),
        );
        let owner = SigningKey::generate();
        let note = p.deriver().note_address(&owner.identity(), "Keep").unwrap();
        let record = Note {
            title: "Keep".into(),
            is_private: false,
            creator: owner.identity(),
            like_count: 0,
            created_at: 1,
            content: "c".into(),
        };
        p.store()
            .commit(quill_store::WriteBatch::new().create(note, record.to_account(owner.identity()).unwrap()))
            .unwrap();

        let request = SignedRequest::unsigned(Instruction::DeleteNote { note }, owner.identity());
        assert_eq!(p.process(&request).unwrap_err(), ProgramError::MissingSignature);
        assert!(p.note(&note).is_ok());
    }
}
