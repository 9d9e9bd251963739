use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::Instant;

use super::grid::{Placement, PhraseLocator};
use super::hint::HintTracker;
use crate::models::{GameType, Grid, Phrase, TranslationSubmission};

/// Local play state of one session: what is on the board, what has been
/// found, how long it took
#[derive(Debug, Clone)]
pub struct GameState {
    pub grid: Grid,
    pub phrases: Vec<Phrase>,
    found: BTreeSet<usize>,
    submissions: Vec<TranslationSubmission>,
    pub hints: HintTracker,
    phrase_list_visible: bool,
    started_at: Instant,
    finished_at: Option<Instant>,
}

impl GameState {
    pub fn new(
        grid: Grid,
        phrases: Vec<Phrase>,
        hint_budget: u32,
        hint_reset_delay: Duration,
        phrase_list_visible: bool,
        now: Instant,
    ) -> Self {
        Self {
            grid,
            phrases,
            found: BTreeSet::new(),
            submissions: Vec::new(),
            hints: HintTracker::new(hint_budget, hint_reset_delay),
            phrase_list_visible,
            started_at: now,
            finished_at: None,
        }
    }

    /// Mark a phrase found. Returns false when it was already found or the
    /// index does not name a phrase.
    pub fn mark_found(&mut self, index: usize) -> bool {
        if index >= self.phrases.len() {
            return false;
        }
        self.found.insert(index)
    }

    pub fn is_found(&self, index: usize) -> bool {
        self.found.contains(&index)
    }

    pub fn found_count(&self) -> usize {
        self.found.len()
    }

    pub fn found_set(&self) -> &BTreeSet<usize> {
        &self.found
    }

    pub fn found_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.found.iter().copied()
    }

    pub fn is_complete(&self) -> bool {
        !self.phrases.is_empty() && self.found.len() == self.phrases.len()
    }

    pub fn record_submission(&mut self, submission: TranslationSubmission) {
        self.submissions.push(submission);
    }

    pub fn submissions(&self) -> &[TranslationSubmission] {
        &self.submissions
    }

    pub fn has_submission_for(&self, phrase: &str) -> bool {
        self.submissions.iter().any(|s| s.phrase == phrase)
    }

    pub fn phrase_list_visible(&self) -> bool {
        self.phrase_list_visible
    }

    /// Show the phrase list. Returns true if it was hidden before.
    pub fn reveal_phrase_list(&mut self) -> bool {
        !std::mem::replace(&mut self.phrase_list_visible, true)
    }

    /// Stop the clock. Later calls keep the first stop time.
    pub fn finish(&mut self, now: Instant) {
        self.finished_at.get_or_insert(now);
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.finished_at
            .unwrap_or(now)
            .saturating_duration_since(self.started_at)
    }

    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        self.elapsed(now).as_secs()
    }

    /// Unfound phrases that can actually be pointed at on the grid
    pub fn hint_candidates(&self, game_type: GameType) -> Vec<(usize, Placement)> {
        self.phrases
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.is_found(*index))
            .filter_map(|(index, phrase)| {
                PhraseLocator::locate(&self.grid, &phrase.phrase, game_type)
                    .map(|placement| (index, placement))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(now: Instant) -> GameState {
        GameState::new(
            vec!["CATX".chars().collect(), "DOGX".chars().collect()],
            vec![
                Phrase::new("cat", None),
                Phrase::new("dog", None),
                Phrase::new("owl", None),
            ],
            3,
            Duration::from_secs(3),
            false,
            now,
        )
    }

    #[test]
    fn test_mark_found_is_idempotent_and_bounded() {
        let mut game = state(Instant::now());

        assert!(game.mark_found(0));
        assert!(!game.mark_found(0));
        assert!(!game.mark_found(7));
        assert_eq!(game.found_count(), 1);
        assert!(!game.is_complete());

        game.mark_found(1);
        game.mark_found(2);
        assert!(game.is_complete());
        assert!(game.found_count() <= game.phrases.len());
    }

    #[test]
    fn test_timer_freezes_on_finish() {
        let start = Instant::now();
        let mut game = state(start);

        assert_eq!(game.elapsed_secs(start + Duration::from_secs(5)), 5);
        game.finish(start + Duration::from_secs(7));
        game.finish(start + Duration::from_secs(9));
        assert_eq!(game.elapsed_secs(start + Duration::from_secs(60)), 7);
    }

    #[test]
    fn test_reveal_phrase_list_reports_change_once() {
        let mut game = state(Instant::now());
        assert!(!game.phrase_list_visible());
        assert!(game.reveal_phrase_list());
        assert!(!game.reveal_phrase_list());
        assert!(game.phrase_list_visible());
    }

    #[test]
    fn test_hint_candidates_skip_found_and_missing_phrases() {
        let mut game = state(Instant::now());
        game.mark_found(0);

        let candidates = game.hint_candidates(GameType::WordSearch);
        let indices: Vec<usize> = candidates.iter().map(|(i, _)| *i).collect();
        // "owl" is not on the grid
        assert_eq!(indices, vec![1]);
    }
}
