use rand::seq::IndexedRandom;
use std::time::Duration;
use tokio::time::Instant;

use super::grid::Placement;
use crate::models::Position;

/// Progressive reveal stage of the active hint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HintLevel {
    /// No hint showing
    #[default]
    Idle,
    /// First letter highlighted
    Start,
    /// First two letters pulsate, giving away the direction
    Direction,
    /// Every letter of the phrase highlighted
    Reveal,
}

impl HintLevel {
    /// Level reached by one more hint request, None once fully revealed
    pub fn next(self) -> Option<HintLevel> {
        match self {
            HintLevel::Idle => Some(HintLevel::Start),
            HintLevel::Start => Some(HintLevel::Direction),
            HintLevel::Direction => Some(HintLevel::Reveal),
            HintLevel::Reveal => None,
        }
    }

    fn highlighted(self, placement: &Placement) -> Vec<Position> {
        let shown = match self {
            HintLevel::Idle => 0,
            HintLevel::Start => 1,
            HintLevel::Direction => 2,
            HintLevel::Reveal => placement.cells.len(),
        };
        placement.cells.iter().take(shown).copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HintError {
    #[error("hints are turned off for this puzzle")]
    Disabled,
    #[error("no hints left")]
    Exhausted,
    #[error("there is no phrase left to hint")]
    NothingToHint,
    #[error("the hinted phrase is already fully revealed")]
    RevealInProgress,
}

/// What the player should currently see highlighted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub phrase_index: usize,
    pub level: HintLevel,
    pub cells: Vec<Position>,
}

/// Hint budget and reveal progression for one session
#[derive(Debug, Clone)]
pub struct HintTracker {
    level: HintLevel,
    remaining: u32,
    budget: u32,
    target: Option<(usize, Placement)>,
    revealed_at: Option<Instant>,
    reset_delay: Duration,
}

impl HintTracker {
    pub fn new(budget: u32, reset_delay: Duration) -> Self {
        Self {
            level: HintLevel::Idle,
            remaining: budget,
            budget,
            target: None,
            revealed_at: None,
            reset_delay,
        }
    }

    pub fn level(&self) -> HintLevel {
        self.level
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Advance the reveal by one level, spending one hint.
    ///
    /// `candidates` are the unfound phrases that could be located on the
    /// grid; one is picked at random when a new hint cycle begins.
    pub fn advance(
        &mut self,
        candidates: &[(usize, Placement)],
        now: Instant,
    ) -> Result<Hint, HintError> {
        self.refresh(now);

        let next = self.level.next().ok_or(HintError::RevealInProgress)?;
        if self.remaining == 0 {
            return Err(HintError::Exhausted);
        }

        if self.level == HintLevel::Idle {
            let chosen = candidates
                .choose(&mut rand::rng())
                .cloned()
                .ok_or(HintError::NothingToHint)?;
            self.target = Some(chosen);
        }

        self.level = next;
        self.remaining -= 1;
        if next == HintLevel::Reveal {
            self.revealed_at = Some(now);
        }

        tracing::debug!(
            "Hint advanced to {:?}, {} of {} left",
            self.level,
            self.remaining,
            self.budget
        );

        self.current().ok_or(HintError::NothingToHint)
    }

    /// Drop back to Idle once a full reveal has been shown long enough.
    /// Returns true when a reset happened.
    pub fn refresh(&mut self, now: Instant) -> bool {
        match self.revealed_at {
            Some(at) if now.duration_since(at) >= self.reset_delay => {
                self.clear();
                true
            }
            _ => false,
        }
    }

    /// Remove any active highlight. The budget is untouched.
    pub fn clear(&mut self) {
        self.level = HintLevel::Idle;
        self.target = None;
        self.revealed_at = None;
    }

    pub fn current(&self) -> Option<Hint> {
        let (phrase_index, placement) = self.target.as_ref()?;
        Some(Hint {
            phrase_index: *phrase_index,
            level: self.level,
            cells: self.level.highlighted(placement),
        })
    }
}
