// Game engine modules

pub mod grid;
pub mod hint;
pub mod state;
pub mod translation;
pub mod validator;

pub use grid::{Placement, PhraseLocator};
pub use hint::{Hint, HintError, HintLevel, HintTracker};
pub use state::GameState;
pub use validator::SelectionValidator;
