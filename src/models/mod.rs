pub mod game;
pub mod puzzle;
pub mod session;
pub mod user;

pub use game::{Direction, Grid, Phrase, Position, TranslationSubmission};
pub use puzzle::{AccessType, GameType, PuzzleConfig, PuzzleSet};
pub use session::{CompleteSessionRequest, Session, StartSessionRequest, StartSessionResponse};
pub use user::Profile;
