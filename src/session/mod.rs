// Puzzle session workflow: hotlink lookup, start, play, completion report

pub mod events;
pub mod machine;

pub use events::SessionEvent;
pub use machine::{ActiveSession, LoadError, LoadFailure, Phase, PuzzleSession, Resolution, SessionError};
