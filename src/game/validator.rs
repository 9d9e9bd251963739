use crate::models::{Direction, GameType, Grid, Phrase, Position};
use std::collections::{BTreeSet, HashSet};

use super::grid::{cell_at, normalize_for_grid, PhraseLocator};

pub struct SelectionValidator {
    game_type: GameType,
}

impl SelectionValidator {
    pub fn new(game_type: GameType) -> Self {
        Self { game_type }
    }

    /// Validate that positions form a straight, unbroken line on the grid
    pub fn is_valid_path(&self, grid: &Grid, positions: &[Position]) -> bool {
        if positions.is_empty() {
            return false;
        }

        // Check that all positions are within bounds
        if !positions.iter().all(|pos| cell_at(grid, *pos).is_some()) {
            return false;
        }

        // Check that no position is used twice
        let unique_positions: HashSet<_> = positions.iter().collect();
        if unique_positions.len() != positions.len() {
            return false;
        }

        if positions.len() == 1 {
            return true;
        }

        let Some(direction) = Self::step_direction(&positions[0], &positions[1]) else {
            return false;
        };
        if !self.allows(direction) {
            return false;
        }

        positions
            .windows(2)
            .all(|w| Self::step_direction(&w[0], &w[1]) == Some(direction))
    }

    /// Direction of a single-cell step, None if the cells are not neighbours
    fn step_direction(from: &Position, to: &Position) -> Option<Direction> {
        let dr = to.row as isize - from.row as isize;
        let dc = to.col as isize - from.col as isize;
        Direction::from_delta(dr, dc)
    }

    fn allows(&self, direction: Direction) -> bool {
        let directions = PhraseLocator::directions(self.game_type);
        match self.game_type {
            // A word-search selection may be dragged from either end
            GameType::WordSearch => directions.contains(&direction),
            GameType::Crossword => {
                directions.contains(&direction) || directions.contains(&direction.reversed())
            }
        }
    }

    /// Extract word from grid positions
    pub fn extract_word(&self, grid: &Grid, positions: &[Position]) -> String {
        positions
            .iter()
            .filter_map(|pos| cell_at(grid, *pos))
            .collect()
    }

    /// Index of the phrase spelled by the selection.
    ///
    /// Word-search selections may read backwards. Crossword entries only read
    /// across or down, so a selection dragged the other way is flipped first.
    /// Unfound phrases win over found ones, then forward readings over
    /// backward ones.
    pub fn match_phrase(
        &self,
        grid: &Grid,
        positions: &[Position],
        phrases: &[Phrase],
        found: &BTreeSet<usize>,
    ) -> Option<usize> {
        if !self.is_valid_path(grid, positions) {
            return None;
        }

        let mut ordered = positions.to_vec();
        if self.game_type == GameType::Crossword && self.is_backward_drag(positions) {
            ordered.reverse();
        }

        let word = normalize_for_grid(&self.extract_word(grid, &ordered));
        let reversed: String = word.chars().rev().collect();
        let reads_backward = self.game_type == GameType::WordSearch;

        phrases
            .iter()
            .enumerate()
            .filter_map(|(index, p)| {
                let target = normalize_for_grid(&p.phrase);
                if target.is_empty() {
                    None
                } else if target == word {
                    Some((found.contains(&index), false, index))
                } else if reads_backward && target == reversed {
                    Some((found.contains(&index), true, index))
                } else {
                    None
                }
            })
            .min()
            .map(|(_, _, index)| index)
    }

    /// True when the selection runs against the crossword reading directions
    fn is_backward_drag(&self, positions: &[Position]) -> bool {
        match positions {
            [first, second, ..] => Self::step_direction(first, second)
                .is_some_and(|d| !PhraseLocator::directions(self.game_type).contains(&d)),
            _ => false,
        }
    }

    /// Index of the phrase the player typed, ignoring case and spacing.
    /// An unfound phrase wins when several normalise the same way.
    pub fn match_text(
        &self,
        text: &str,
        phrases: &[Phrase],
        found: &BTreeSet<usize>,
    ) -> Option<usize> {
        let typed = normalize_for_grid(text);
        if typed.is_empty() {
            return None;
        }
        phrases
            .iter()
            .enumerate()
            .filter(|(_, p)| normalize_for_grid(&p.phrase) == typed)
            .map(|(index, _)| index)
            .min_by_key(|index| (found.contains(index), *index))
    }
}
