use std::sync::{Mutex, PoisonError};

use quill_crypto::AddressDeriver;
use quill_gate::{AccessRequest, AuthorizationGuard, TargetFacts};
use quill_store::{AccountStore, InMemoryAccountStore};
use quill_types::{Address, Identity, UnixTimestamp};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ProgramConfig;
use crate::error::{ProgramError, ProgramResult};
use crate::events::{EventBus, EventFilter, EventStream};
use crate::handlers::{self, Transition};
use crate::instruction::{Instruction, SignedRequest};
use crate::records::{LikeMark, Note, Record, SaveMark};

/// What a committed request did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Created {
        note: Address,
    },
    Deleted {
        note: Address,
        /// Identity the note's storage was reclaimed to.
        recipient: Identity,
        reclaimed_bytes: u64,
    },
    Liked {
        note: Address,
        like: Address,
        like_count: u64,
    },
    Saved {
        note: Address,
        save: Address,
        saved_at: UnixTimestamp,
    },
}

/// The note registry state machine.
///
/// `process` runs one [`SignedRequest`] to completion: validate, authorize,
/// re-derive addresses, then commit a single [`WriteBatch`]. A request
/// either commits fully or leaves the store untouched. Events are emitted
/// only after the commit returns.
///
/// [`WriteBatch`]: quill_store::WriteBatch
pub struct NoteProgram<S: AccountStore = InMemoryAccountStore, C: Clock = SystemClock> {
    pub(crate) store: S,
    pub(crate) deriver: AddressDeriver,
    pub(crate) guard: AuthorizationGuard,
    pub(crate) clock: C,
    events: EventBus,
    sequencer: Mutex<()>,
}

impl NoteProgram {
    /// A program over an empty in-memory store with default configuration.
    pub fn in_memory() -> Self {
        Self::new(InMemoryAccountStore::new(), SystemClock, &ProgramConfig::default())
    }
}

impl<S: AccountStore, C: Clock> NoteProgram<S, C> {
    pub fn new(store: S, clock: C, config: &ProgramConfig) -> Self {
        Self {
            store,
            deriver: AddressDeriver::for_namespace(&config.namespace),
            guard: AuthorizationGuard::with_default_stages(),
            clock,
            events: EventBus::new(config.event_channel_capacity, config.event_history),
            sequencer: Mutex::new(()),
        }
    }

    /// Execute one request.
    pub fn process(&self, request: &SignedRequest) -> ProgramResult<Outcome> {
        // Requests run one at a time so like_count read-modify-write can
        // not interleave. Uniqueness still comes from the store.
        let _turn = self.sequencer.lock().unwrap_or_else(PoisonError::into_inner);

        let action = request.instruction.action();
        let note = request.instruction.note();
        match self.execute(request) {
            Ok(Transition { outcome, event }) => {
                info!(
                    %action,
                    signer = %request.signer.short_id(),
                    note = %note.short_hex(),
                    "request committed"
                );
                self.events.emit(event);
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    %action,
                    signer = %request.signer.short_id(),
                    note = %note.short_hex(),
                    code = err.code(),
                    error = %err,
                    "request rejected"
                );
                Err(err)
            }
        }
    }

    fn execute(&self, request: &SignedRequest) -> ProgramResult<Transition> {
        let message = request.message()?;
        match &request.instruction {
            Instruction::CreateNote {
                note,
                creator,
                title,
                content,
                is_private,
            } => handlers::create::run(
                self,
                request,
                &message,
                handlers::create::NewNote {
                    address: note,
                    creator,
                    title,
                    content,
                    is_private: *is_private,
                },
            ),
            Instruction::DeleteNote { note } => handlers::delete::run(self, request, &message, note),
            Instruction::ToggleLike { note, like } => {
                handlers::like::run(self, request, &message, note, like)
            }
            Instruction::ToggleSave { note, save } => {
                handlers::save::run(self, request, &message, note, save)
            }
        }
    }

    /// Run the guard pipeline for `request`.
    pub(crate) fn authorize(
        &self,
        request: &SignedRequest,
        message: &[u8],
        claimed_authority: Option<Identity>,
        target: Option<TargetFacts>,
    ) -> ProgramResult<()> {
        let access = AccessRequest {
            action: request.instruction.action(),
            signer: request.signer,
            signature: request.signature,
            message: message.to_vec(),
            claimed_authority,
            target,
        };
        self.guard.evaluate(&access)?.into_result()?;
        Ok(())
    }

    // -- reads --

    /// The note at `address`.
    pub fn note(&self, address: &Address) -> ProgramResult<Note> {
        let account = self
            .store
            .read(address)?
            .ok_or(ProgramError::AccountNotFound(*address))?;
        Note::from_account(address, &account)
    }

    /// The like mark at `address`, if one was created.
    pub fn like_mark(&self, address: &Address) -> ProgramResult<Option<LikeMark>> {
        self.read_optional(address)
    }

    /// The save mark at `address`, if one was created.
    pub fn save_mark(&self, address: &Address) -> ProgramResult<Option<SaveMark>> {
        self.read_optional(address)
    }

    /// Every live note, sorted by address.
    pub fn notes(&self) -> ProgramResult<Vec<(Address, Note)>> {
        self.scan::<Note>()
    }

    /// Every save mark, sorted by address. Marks may point at deleted notes.
    pub fn save_marks(&self) -> ProgramResult<Vec<(Address, SaveMark)>> {
        self.scan::<SaveMark>()
    }

    /// Every like mark, sorted by address. Marks may point at deleted notes.
    pub fn like_marks(&self) -> ProgramResult<Vec<(Address, LikeMark)>> {
        self.scan::<LikeMark>()
    }

    fn read_optional<R: Record>(&self, address: &Address) -> ProgramResult<Option<R>> {
        self.store
            .read(address)?
            .map(|account| R::from_account(address, &account))
            .transpose()
    }

    fn scan<R: Record>(&self) -> ProgramResult<Vec<(Address, R)>> {
        self.store
            .scan(R::KIND)?
            .into_iter()
            .map(|(address, account)| Ok((address, R::from_account(&address, &account)?)))
            .collect()
    }

    // -- accessors --

    pub fn deriver(&self) -> &AddressDeriver {
        &self.deriver
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to events committed after this call.
    pub fn subscribe(&self, filter: EventFilter) -> EventStream {
        self.events.subscribe(filter)
    }

    pub(crate) fn now(&self) -> UnixTimestamp {
        self.clock.unix_timestamp()
    }
}

impl Default for NoteProgram {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<S: AccountStore, C: Clock> std::fmt::Debug for NoteProgram<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteProgram")
            .field("namespace", &self.deriver.program())
            .field("stages", &self.guard.stage_count())
            .field("events", &self.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::events::{EventKind, LikeAction, NoteLabel, ProgramEvent};
    use quill_crypto::SigningKey;
    use quill_store::AccountKind;

    const NOW: UnixTimestamp = 1_700_000_000;

    fn program() -> NoteProgram<InMemoryAccountStore, FixedClock> {
        NoteProgram::new(
            InMemoryAccountStore::new(),
            FixedClock::new(NOW),
            &ProgramConfig::default(),
        )
    }

    fn create(
        p: &NoteProgram<InMemoryAccountStore, FixedClock>,
        key: &SigningKey,
        title: &str,
        content: &str,
        is_private: bool,
    ) -> ProgramResult<Outcome> {
        let note = p.deriver().note_address(&key.identity(), title)?;
        let ix = Instruction::CreateNote {
            note,
            creator: key.identity(),
            title: title.into(),
            content: content.into(),
            is_private,
        };
        p.process(&SignedRequest::sign(ix, key)?)
    }

    fn like(
        p: &NoteProgram<InMemoryAccountStore, FixedClock>,
        key: &SigningKey,
        note: Address,
    ) -> ProgramResult<Outcome> {
        let like = p.deriver().like_address(&key.identity(), &note)?;
        p.process(&SignedRequest::sign(Instruction::ToggleLike { note, like }, key)?)
    }

    fn save(
        p: &NoteProgram<InMemoryAccountStore, FixedClock>,
        key: &SigningKey,
        note: Address,
    ) -> ProgramResult<Outcome> {
        let save = p.deriver().save_address(&key.identity(), &note)?;
        p.process(&SignedRequest::sign(Instruction::ToggleSave { note, save }, key)?)
    }

    fn delete(
        p: &NoteProgram<InMemoryAccountStore, FixedClock>,
        key: &SigningKey,
        note: Address,
    ) -> ProgramResult<Outcome> {
        p.process(&SignedRequest::sign(Instruction::DeleteNote { note }, key)?)
    }

    fn note_address(outcome: Outcome) -> Address {
        match outcome {
            Outcome::Created { note } => note,
            other => panic!("expected Created, got {other:?}"),
        }
    }

    #[test]
    fn public_note_lifecycle() {
        let p = program();
        let owner = SigningKey::generate();
        let reader = SigningKey::generate();

        let note = note_address(create(&p, &owner, "Public Blog", "Content", false).unwrap());
        let stored = p.note(&note).unwrap();
        assert_eq!(stored.title, "Public Blog");
        assert_eq!(stored.content, "Content");
        assert!(!stored.is_private);
        assert_eq!(stored.like_count, 0);
        assert_eq!(stored.creator, owner.identity());
        assert_eq!(stored.created_at, NOW);

        let liked = like(&p, &reader, note).unwrap();
        let like_address = p.deriver().like_address(&reader.identity(), &note).unwrap();
        assert_eq!(
            liked,
            Outcome::Liked {
                note,
                like: like_address,
                like_count: 1
            }
        );
        assert_eq!(p.note(&note).unwrap().like_count, 1);
        let mark = p.like_mark(&like_address).unwrap().unwrap();
        assert!(mark.is_liked);
        assert_eq!(mark.user, reader.identity());
        assert_eq!(mark.blog, note);

        let again = like(&p, &reader, note).unwrap_err();
        assert_eq!(again, ProgramError::AlreadyExists(like_address));
        assert_eq!(p.note(&note).unwrap().like_count, 1);

        let deleted = delete(&p, &owner, note).unwrap();
        assert!(matches!(
            deleted,
            Outcome::Deleted { recipient, reclaimed_bytes, .. }
                if recipient == owner.identity() && reclaimed_bytes > 0
        ));
        assert_eq!(p.note(&note), Err(ProgramError::AccountNotFound(note)));
        // The like mark survives as an orphan.
        assert!(p.like_mark(&like_address).unwrap().is_some());
    }

    #[test]
    fn duplicate_title_fails_and_keeps_first_note() {
        let p = program();
        let owner = SigningKey::generate();
        let note = note_address(create(&p, &owner, "Same", "first", false).unwrap());
        let before = p.note(&note).unwrap();

        p.clock.advance(60);
        let err = create(&p, &owner, "Same", "second", true).unwrap_err();
        assert_eq!(err, ProgramError::AlreadyExists(note));
        assert_eq!(p.note(&note).unwrap(), before);
    }

    #[test]
    fn same_title_by_different_creators_coexist() {
        let p = program();
        let a = note_address(create(&p, &SigningKey::generate(), "Hello", "a", false).unwrap());
        let b = note_address(create(&p, &SigningKey::generate(), "Hello", "b", false).unwrap());
        assert_ne!(a, b);
        assert_eq!(p.notes().unwrap().len(), 2);
    }

    #[test]
    fn delete_by_non_creator_is_unauthorized() {
        let p = program();
        let owner = SigningKey::generate();
        let note = note_address(create(&p, &owner, "Mine", "c", false).unwrap());
        let before = p.note(&note).unwrap();

        let err = delete(&p, &SigningKey::generate(), note).unwrap_err();
        assert_eq!(err, ProgramError::Unauthorized);
        assert_eq!(p.note(&note).unwrap(), before);
    }

    #[test]
    fn delete_twice_fails_with_not_found() {
        let p = program();
        let owner = SigningKey::generate();
        let note = note_address(create(&p, &owner, "Gone", "c", false).unwrap());
        delete(&p, &owner, note).unwrap();
        assert_eq!(
            delete(&p, &owner, note).unwrap_err(),
            ProgramError::AccountNotFound(note)
        );
    }

    #[test]
    fn private_note_can_not_be_liked_by_anyone() {
        let p = program();
        let owner = SigningKey::generate();
        let note = note_address(create(&p, &owner, "Secret", "c", true).unwrap());

        for key in [&owner, &SigningKey::generate()] {
            assert_eq!(
                like(&p, key, note).unwrap_err(),
                ProgramError::PrivateBlogNotLikeable
            );
        }
        assert_eq!(p.note(&note).unwrap().like_count, 0);
        assert!(p.like_marks().unwrap().is_empty());
    }

    #[test]
    fn creator_can_not_like_own_note() {
        let p = program();
        let owner = SigningKey::generate();
        let note = note_address(create(&p, &owner, "Mine", "c", false).unwrap());
        assert_eq!(like(&p, &owner, note).unwrap_err(), ProgramError::CannotLikeOwnBlog);
        assert_eq!(p.note(&note).unwrap().like_count, 0);
    }

    #[test]
    fn likes_from_distinct_users_accumulate() {
        let p = program();
        let owner = SigningKey::generate();
        let note = note_address(create(&p, &owner, "Popular", "c", false).unwrap());
        for _ in 0..3 {
            like(&p, &SigningKey::generate(), note).unwrap();
        }
        assert_eq!(p.note(&note).unwrap().like_count, 3);
        assert_eq!(p.like_marks().unwrap().len(), 3);
    }

    #[test]
    fn like_on_missing_note_fails() {
        let p = program();
        let ghost = Address::from_bytes([7; 32]);
        assert_eq!(
            like(&p, &SigningKey::generate(), ghost).unwrap_err(),
            ProgramError::AccountNotFound(ghost)
        );
    }

    #[test]
    fn save_is_create_once_and_ignores_privacy_and_ownership() {
        let p = program();
        let owner = SigningKey::generate();
        let note = note_address(create(&p, &owner, "Private", "c", true).unwrap());

        p.clock.set(NOW + 10);
        let saved = save(&p, &owner, note).unwrap();
        let save_address = p.deriver().save_address(&owner.identity(), &note).unwrap();
        assert_eq!(
            saved,
            Outcome::Saved {
                note,
                save: save_address,
                saved_at: NOW + 10
            }
        );
        let mark = p.save_mark(&save_address).unwrap().unwrap();
        assert!(mark.is_saved);
        assert_eq!(mark.saved_at, NOW + 10);

        assert_eq!(
            save(&p, &owner, note).unwrap_err(),
            ProgramError::AlreadyExists(save_address)
        );
        save(&p, &SigningKey::generate(), note).unwrap();
        assert_eq!(p.save_marks().unwrap().len(), 2);
    }

    #[test]
    fn forged_like_address_is_rejected() {
        let p = program();
        let owner = SigningKey::generate();
        let reader = SigningKey::generate();
        let note = note_address(create(&p, &owner, "T", "c", false).unwrap());

        let forged = Address::from_bytes([3; 32]);
        let request = SignedRequest::sign(Instruction::ToggleLike { note, like: forged }, &reader).unwrap();
        let err = p.process(&request).unwrap_err();
        assert!(matches!(err, ProgramError::AddressMismatch { provided, .. } if provided == forged));
        assert_eq!(p.note(&note).unwrap().like_count, 0);
    }

    #[test]
    fn unsigned_request_is_rejected() {
        let p = program();
        let owner = SigningKey::generate();
        let note = p.deriver().note_address(&owner.identity(), "T").unwrap();
        let ix = Instruction::CreateNote {
            note,
            creator: owner.identity(),
            title: "T".into(),
            content: "c".into(),
            is_private: false,
        };
        let err = p.process(&SignedRequest::unsigned(ix, owner.identity())).unwrap_err();
        assert_eq!(err, ProgramError::MissingSignature);
        assert!(p.notes().unwrap().is_empty());
    }

    #[test]
    fn creating_for_someone_else_is_a_signer_mismatch() {
        let p = program();
        let victim = SigningKey::generate();
        let attacker = SigningKey::generate();
        let note = p.deriver().note_address(&victim.identity(), "T").unwrap();
        let ix = Instruction::CreateNote {
            note,
            creator: victim.identity(),
            title: "T".into(),
            content: "c".into(),
            is_private: false,
        };
        let err = p.process(&SignedRequest::sign(ix, &attacker).unwrap()).unwrap_err();
        assert_eq!(err, ProgramError::SignerMismatch);
    }

    #[test]
    fn unsigned_delete_in_the_creators_name_is_rejected() {
        let p = program();
        let victim = SigningKey::generate();
        let note = note_address(create(&p, &victim, "T", "c", false).unwrap());

        let request = SignedRequest::unsigned(Instruction::DeleteNote { note }, victim.identity());
        assert_eq!(p.process(&request).unwrap_err(), ProgramError::MissingSignature);
        assert_eq!(p.note(&note).unwrap().creator, victim.identity());
    }

    #[test]
    fn namespace_scopes_addresses() {
        let a = program();
        let b = NoteProgram::new(
            InMemoryAccountStore::new(),
            FixedClock::new(NOW),
            &ProgramConfig {
                namespace: "elsewhere".into(),
                ..ProgramConfig::default()
            },
        );
        let id = Identity::from_bytes([1; 32]);
        assert_ne!(
            a.deriver().note_address(&id, "T").unwrap(),
            b.deriver().note_address(&id, "T").unwrap()
        );
    }

    #[test]
    fn reading_a_mark_as_a_note_is_a_kind_mismatch() {
        let p = program();
        let owner = SigningKey::generate();
        let note = note_address(create(&p, &owner, "T", "c", false).unwrap());
        save(&p, &owner, note).unwrap();
        let save_address = p.deriver().save_address(&owner.identity(), &note).unwrap();
        assert_eq!(
            p.note(&save_address),
            Err(ProgramError::AccountKindMismatch(save_address))
        );
        assert_eq!(p.store().scan(AccountKind::SaveMark).unwrap().len(), 1);
    }

    #[test]
    fn events_follow_commits_only() {
        let p = program();
        let owner = SigningKey::generate();
        let reader = SigningKey::generate();

        let note = note_address(create(&p, &owner, "Evented", "c", false).unwrap());
        like(&p, &reader, note).unwrap();
        like(&p, &reader, note).unwrap_err();
        delete(&p, &owner, note).unwrap();

        let kinds: Vec<EventKind> = p.events().history().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![EventKind::NoteCreated, EventKind::Liked, EventKind::NoteDeleted]
        );
        match &p.events().history()[1] {
            ProgramEvent::Like(e) => {
                assert_eq!(e.action, LikeAction::Like);
                assert_eq!(e.like_count, 1);
                assert_eq!(e.user, reader.identity());
            }
            other => panic!("unexpected event {other:?}"),
        }
        match &p.events().history()[2] {
            ProgramEvent::Note(e) => {
                assert_eq!(e.label, NoteLabel::Delete);
                assert_eq!(e.title, "Evented");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn subscribers_see_committed_events() {
        let p = program();
        let mut stream = p.subscribe(EventFilter::all());
        let owner = SigningKey::generate();
        let note = note_address(create(&p, &owner, "Live", "c", false).unwrap());

        let event = stream.recv().await.unwrap();
        assert_eq!(event.kind(), EventKind::NoteCreated);
        assert_eq!(event.note_address(), &note);
    }

    #[test]
    fn concurrent_likes_by_one_user_count_once() {
        use std::sync::Arc;

        let p = Arc::new(program());
        let owner = SigningKey::generate();
        let reader = Arc::new(SigningKey::generate());
        let note = note_address(create(&p, &owner, "Race", "c", false).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let p = Arc::clone(&p);
                let reader = Arc::clone(&reader);
                std::thread::spawn(move || like(&p, &reader, note).is_ok())
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(wins, 1);
        assert_eq!(p.note(&note).unwrap().like_count, 1);
    }
}
