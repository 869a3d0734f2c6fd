use quill_program::Note;
use quill_types::Address;

/// Ordering for note listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoteSort {
    /// Most recently created first.
    #[default]
    Newest,
    /// Highest like count first, newest breaking ties.
    MostLiked,
}

/// Sort a listing in place. Address breaks remaining ties so the order is
/// deterministic.
pub fn sort_notes(notes: &mut [(Address, Note)], sort: NoteSort) {
    match sort {
        NoteSort::Newest => notes.sort_by(|(a_addr, a), (b_addr, b)| {
            b.created_at.cmp(&a.created_at).then_with(|| a_addr.cmp(b_addr))
        }),
        NoteSort::MostLiked => notes.sort_by(|(a_addr, a), (b_addr, b)| {
            b.like_count
                .cmp(&a.like_count)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a_addr.cmp(b_addr))
        }),
    }
}
