use std::sync::Arc;

use quill_crypto::SigningKey;
use quill_gate::Action;
use quill_program::{
    Clock, Instruction, LikeMark, Note, NoteProgram, Outcome, ProgramError, SaveMark,
    SignedRequest, SystemClock, MAX_TITLE_LEN,
};
use quill_store::{AccountStore, InMemoryAccountStore};
use quill_types::{Address, Identity};
use tracing::debug;

use crate::error::{SdkError, SdkResult};
use crate::listing::{sort_notes, NoteSort};

/// One user's handle on a shared note program.
pub struct NoteClient<S: AccountStore = InMemoryAccountStore, C: Clock = SystemClock> {
    program: Arc<NoteProgram<S, C>>,
    key: SigningKey,
}

impl<S: AccountStore, C: Clock> NoteClient<S, C> {
    pub fn new(program: Arc<NoteProgram<S, C>>, key: SigningKey) -> Self {
        Self { program, key }
    }

    /// The identity every request from this client is signed by.
    pub fn identity(&self) -> Identity {
        self.key.identity()
    }

    pub fn program(&self) -> &Arc<NoteProgram<S, C>> {
        &self.program
    }

    // ---- Address helpers ----

    pub fn note_address(&self, creator: &Identity, title: &str) -> SdkResult<Address> {
        Ok(self.program.deriver().note_address(creator, title)?)
    }

    /// Address of this client's like mark on `note`.
    pub fn like_address(&self, note: &Address) -> SdkResult<Address> {
        Ok(self.program.deriver().like_address(&self.identity(), note)?)
    }

    /// Address of this client's save mark on `note`.
    pub fn save_address(&self, note: &Address) -> SdkResult<Address> {
        Ok(self.program.deriver().save_address(&self.identity(), note)?)
    }

    // ---- Mutations ----

    /// Publish a note. Title and content are trimmed first.
    pub fn create_note(&self, title: &str, content: &str, is_private: bool) -> SdkResult<Outcome> {
        let title = title.trim();
        // Titles past the cap may not derive an address at all.
        if title.len() > MAX_TITLE_LEN {
            return Err(SdkError::rejected(Action::CreateNote, ProgramError::TitleTooLong));
        }
        let creator = self.identity();
        let instruction = Instruction::CreateNote {
            note: self.note_address(&creator, title)?,
            creator,
            title: title.to_owned(),
            content: content.trim().to_owned(),
            is_private,
        };
        self.submit(instruction)
    }

    pub fn delete_note(&self, note: &Address) -> SdkResult<Outcome> {
        self.submit(Instruction::DeleteNote { note: *note })
    }

    pub fn like(&self, note: &Address) -> SdkResult<Outcome> {
        let like = self.like_address(note)?;
        self.submit(Instruction::ToggleLike { note: *note, like })
    }

    pub fn save(&self, note: &Address) -> SdkResult<Outcome> {
        let save = self.save_address(note)?;
        self.submit(Instruction::ToggleSave { note: *note, save })
    }

    fn submit(&self, instruction: Instruction) -> SdkResult<Outcome> {
        let action = instruction.action();
        let request = SignedRequest::sign(instruction, &self.key)?;
        debug!(%action, signer = %request.signer.short_id(), "submitting request");
        self.program
            .process(&request)
            .map_err(|e| SdkError::rejected(action, e))
    }

    // ---- Reads ----

    pub fn note(&self, address: &Address) -> SdkResult<Note> {
        Ok(self.program.note(address)?)
    }

    /// Look a note up by its creator and title. `None` if it does not exist.
    pub fn note_by_title(&self, creator: &Identity, title: &str) -> SdkResult<Option<(Address, Note)>> {
        let title = title.trim();
        if title.len() > MAX_TITLE_LEN {
            return Ok(None);
        }
        let address = self.note_address(creator, title)?;
        match self.program.note(&address) {
            Ok(note) => Ok(Some((address, note))),
            Err(ProgramError::AccountNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// This client's like mark on `note`, if it liked it.
    pub fn like_status(&self, note: &Address) -> SdkResult<Option<LikeMark>> {
        Ok(self.program.like_mark(&self.like_address(note)?)?)
    }

    /// This client's save mark on `note`, if it saved it.
    pub fn save_status(&self, note: &Address) -> SdkResult<Option<SaveMark>> {
        Ok(self.program.save_mark(&self.save_address(note)?)?)
    }

    /// Every note, private ones included.
    pub fn all_notes(&self, sort: NoteSort) -> SdkResult<Vec<(Address, Note)>> {
        let mut notes = self.program.notes()?;
        sort_notes(&mut notes, sort);
        Ok(notes)
    }

    /// The default listing: public notes plus this client's own private ones.
    pub fn public_notes(&self, sort: NoteSort) -> SdkResult<Vec<(Address, Note)>> {
        let me = self.identity();
        let mut notes: Vec<_> = self
            .program
            .notes()?
            .into_iter()
            .filter(|(_, note)| !note.is_private || note.creator == me)
            .collect();
        sort_notes(&mut notes, sort);
        Ok(notes)
    }

    /// Notes this client saved, most recently saved first. Saves of deleted
    /// notes are skipped.
    pub fn saved_notes(&self) -> SdkResult<Vec<(Address, Note, SaveMark)>> {
        let me = self.identity();
        let mut saved = Vec::new();
        for (_, mark) in self.program.save_marks()? {
            if mark.user != me {
                continue;
            }
            match self.program.note(&mark.blog) {
                Ok(note) => saved.push((mark.blog, note, mark)),
                Err(quill_program::ProgramError::AccountNotFound(_)) => {
                    debug!(note = %mark.blog.short_hex(), "skipping save of deleted note");
                }
                Err(e) => return Err(e.into()),
            }
        }
        saved.sort_by(|a, b| b.2.saved_at.cmp(&a.2.saved_at).then_with(|| a.0.cmp(&b.0)));
        Ok(saved)
    }
}

impl<S: AccountStore, C: Clock> Clone for NoteClient<S, C> {
    fn clone(&self) -> Self {
        Self {
            program: Arc::clone(&self.program),
            key: self.key.clone(),
        }
    }
}

impl<S: AccountStore, C: Clock> std::fmt::Debug for NoteClient<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteClient")
            .field("identity", &self.identity().short_id())
            .finish()
    }
}
