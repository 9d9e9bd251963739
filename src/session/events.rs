use crate::game::Hint;

/// Notifications for the front end. The session never renders anything
/// itself; celebrations, banners and highlights hang off these.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Puzzle metadata is being fetched (mount or restart)
    Loading,
    PuzzleLoaded {
        name: String,
    },
    LoadFailed {
        message: String,
    },
    SessionStarted {
        puzzle_name: String,
        nickname: String,
        phrase_count: usize,
    },
    StartFailed {
        message: String,
    },
    /// The player must type a translation before the phrase counts
    TranslationRequested {
        phrase_index: usize,
        phrase: String,
    },
    /// A phrase was accepted; the front end celebrates
    PhraseFound {
        phrase_index: usize,
        phrase: String,
        found: usize,
        total: usize,
    },
    HintShown(Hint),
    HintCleared,
    PhraseListRevealed,
    Completed {
        phrases_found: usize,
        duration_seconds: u64,
    },
}
