use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    #[default]
    #[serde(alias = "word_search", alias = "wordsearch")]
    WordSearch,
    Crossword,
}

/// Who may open a hotlinked puzzle set
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    #[default]
    Public,
    Registered,
}

fn default_grid_size() -> usize {
    10
}

fn enabled() -> bool {
    true
}

/// Per-puzzle gameplay switches chosen by the puzzle author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PuzzleConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    #[serde(default = "enabled")]
    pub show_hints: bool,
    #[serde(default = "enabled")]
    pub show_timer: bool,
    #[serde(default)]
    pub show_translations: bool,
    #[serde(default)]
    pub require_translation_input: bool,
    #[serde(default)]
    pub hide_phrase_list: bool,
    #[serde(default)]
    pub access_type: AccessType,
    #[serde(default)]
    pub game_type: GameType,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            show_hints: true,
            show_timer: true,
            show_translations: false,
            require_translation_input: false,
            hide_phrase_list: false,
            access_type: AccessType::default(),
            game_type: GameType::default(),
        }
    }
}

/// Puzzle metadata resolved from a hotlink token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PuzzleSet {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: PuzzleConfig,
}
