use crate::models::{Direction, GameType, Grid, Position};

/// Where a phrase sits on the grid, first letter first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub cells: Vec<Position>,
}

/// Strip a phrase down to the letters that appear in grid cells.
/// Spaces, hyphens and apostrophes are not placed on the grid.
pub fn normalize_for_grid(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '\'' | '’'))
        .flat_map(char::to_uppercase)
        .collect()
}

pub struct PhraseLocator;

impl PhraseLocator {
    /// Directions a phrase may run in for the given game type
    pub fn directions(game_type: GameType) -> &'static [Direction] {
        match game_type {
            GameType::WordSearch => &Direction::ALL,
            GameType::Crossword => &Direction::CROSSWORD,
        }
    }

    /// Find the first placement of `phrase` on the grid, scanning row by row
    pub fn locate(grid: &Grid, phrase: &str, game_type: GameType) -> Option<Placement> {
        let letters: Vec<char> = normalize_for_grid(phrase).chars().collect();
        if letters.is_empty() {
            return None;
        }

        for (row, cells) in grid.iter().enumerate() {
            for col in 0..cells.len() {
                let start = Position { row, col };
                for &direction in Self::directions(game_type) {
                    if let Some(cells) = Self::match_from(grid, start, direction, &letters) {
                        return Some(Placement { cells });
                    }
                }
            }
        }

        None
    }

    fn match_from(
        grid: &Grid,
        start: Position,
        direction: Direction,
        letters: &[char],
    ) -> Option<Vec<Position>> {
        let mut cells = Vec::with_capacity(letters.len());
        let mut pos = start;

        for (i, expected) in letters.iter().enumerate() {
            if i > 0 {
                pos = pos.step(direction)?;
            }
            let actual = cell_at(grid, pos)?;
            if !actual.to_uppercase().eq(expected.to_uppercase()) {
                return None;
            }
            cells.push(pos);
        }

        Some(cells)
    }
}

/// Letter at `pos`, or None when out of bounds (rows may be ragged)
pub fn cell_at(grid: &Grid, pos: Position) -> Option<char> {
    grid.get(pos.row).and_then(|row| row.get(pos.col)).copied()
}
