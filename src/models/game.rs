use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step one cell in `direction`, or None when that leaves the grid on
    /// the low side (the high side is checked against the grid by callers)
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (dr, dc) = direction.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(Position { row, col })
    }
}

/// One of the eight straight reading directions on a grid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Right,
    Left,
    Down,
    Up,
    DownRight,
    DownLeft,
    UpRight,
    UpLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Right,
        Direction::Down,
        Direction::DownRight,
        Direction::UpRight,
        Direction::Left,
        Direction::Up,
        Direction::UpLeft,
        Direction::DownLeft,
    ];

    /// Crossword entries only run across or down
    pub const CROSSWORD: [Direction; 2] = [Direction::Right, Direction::Down];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Right => (0, 1),
            Direction::Left => (0, -1),
            Direction::Down => (1, 0),
            Direction::Up => (-1, 0),
            Direction::DownRight => (1, 1),
            Direction::DownLeft => (1, -1),
            Direction::UpRight => (-1, 1),
            Direction::UpLeft => (-1, -1),
        }
    }

    pub fn from_delta(dr: isize, dc: isize) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.delta() == (dr, dc))
    }

    pub fn reversed(self) -> Direction {
        let (dr, dc) = self.delta();
        // every negated delta is itself a direction
        Direction::from_delta(-dr, -dc).unwrap_or(self)
    }
}

/// Letter matrix as delivered by the session start endpoint
pub type Grid = Vec<Vec<char>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Phrase {
    pub phrase: String,
    #[serde(default)]
    pub translation: Option<String>,
}

impl Phrase {
    pub fn new(phrase: impl Into<String>, translation: Option<&str>) -> Self {
        Self {
            phrase: phrase.into(),
            translation: translation.map(str::to_string),
        }
    }
}

/// A translation typed by the player before a phrase was accepted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslationSubmission {
    pub phrase: String,
    pub submitted: String,
    pub correct: String,
    pub is_correct: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_stays_on_non_negative_cells() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.step(Direction::Up), None);
        assert_eq!(origin.step(Direction::Left), None);
        assert_eq!(origin.step(Direction::DownRight), Some(Position::new(1, 1)));
    }

    #[test]
    fn test_reversed_direction() {
        for direction in Direction::ALL {
            assert_eq!(direction.reversed().reversed(), direction);
            assert_ne!(direction.reversed(), direction);
        }
        assert_eq!(Direction::UpRight.reversed(), Direction::DownLeft);
    }

    #[test]
    fn test_phrase_translation_is_optional_on_the_wire() {
        let phrase: Phrase = serde_json::from_str(r#"{"phrase":"dog"}"#).unwrap();
        assert_eq!(phrase, Phrase::new("dog", None));
    }
}
