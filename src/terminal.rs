//! Line-based front end for a puzzle session.
//!
//! Cells are addressed 1-based as `row,col`; the session works 0-based.

use anyhow::Result;
use std::collections::HashSet;
use std::fmt::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;

use crate::game::{HintLevel, PhraseLocator};
use crate::models::Position;
use crate::session::{
    ActiveSession, Phase, PuzzleSession, Resolution, SessionError, SessionEvent,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Hint,
    Restart,
    Quit,
    Cancel,
    Select(Vec<Position>),
    Guess(String),
    Empty,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let (head, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        match head.to_lowercase().as_str() {
            "hint" | "h" if rest.is_empty() => Command::Hint,
            "restart" if rest.is_empty() => Command::Restart,
            "quit" | "exit" | "q" if rest.is_empty() => Command::Quit,
            "cancel" if rest.is_empty() => Command::Cancel,
            "sel" | "select" => match parse_cells(rest) {
                Some(cells) => Command::Select(cells),
                None => Command::Invalid(format!(
                    "could not read \"{}\"; use: sel 1,1 1,2 1,3",
                    rest.trim()
                )),
            },
            _ => Command::Guess(line.to_string()),
        }
    }
}

fn parse_cell(cell: &str) -> Option<Position> {
    let (row, col) = cell.split_once(',')?;
    let row: usize = row.trim().parse().ok()?;
    let col: usize = col.trim().parse().ok()?;
    Some(Position::new(row.checked_sub(1)?, col.checked_sub(1)?))
}

fn parse_cells(text: &str) -> Option<Vec<Position>> {
    let cells: Option<Vec<_>> = text.split_whitespace().map(parse_cell).collect();
    cells.filter(|c| !c.is_empty())
}

fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Board, phrase list, hint and timer of a running session
pub fn render(active: &ActiveSession, elapsed_secs: u64) -> String {
    let game = &active.game;
    let config = &active.session.config;
    let mut out = String::new();

    let mut found_cells = HashSet::new();
    for index in game.found_indices() {
        if let Some(placement) = PhraseLocator::locate(
            &game.grid,
            &game.phrases[index].phrase,
            config.game_type,
        ) {
            found_cells.extend(placement.cells);
        }
    }
    let hint = active.current_hint();
    let hinted: HashSet<Position> = hint
        .as_ref()
        .map(|h| h.cells.iter().copied().collect())
        .unwrap_or_default();

    let _ = writeln!(out, "== {} ==", active.session.puzzle_name);
    let width = game.grid.first().map(Vec::len).unwrap_or(0);
    out.push_str("    ");
    for col in 1..=width {
        let _ = write!(out, "{:>3}", col);
    }
    out.push('\n');
    for (r, row) in game.grid.iter().enumerate() {
        let _ = write!(out, "{:>3} ", r + 1);
        for (c, letter) in row.iter().enumerate() {
            let pos = Position::new(r, c);
            // Found letters in lowercase, hinted ones in brackets
            let _ = if hinted.contains(&pos) {
                write!(out, "[{}]", letter)
            } else if found_cells.contains(&pos) {
                write!(out, " {} ", letter.to_lowercase())
            } else {
                write!(out, " {} ", letter)
            };
        }
        out.push('\n');
    }

    if game.phrase_list_visible() {
        out.push_str("\nPhrases:\n");
        for (index, phrase) in game.phrases.iter().enumerate() {
            let mark = if game.is_found(index) { "x" } else { " " };
            let _ = write!(out, "  [{}] {}", mark, phrase.phrase);
            if config.show_translations && game.is_found(index) {
                if let Some(translation) = &phrase.translation {
                    let _ = write!(out, " ({})", translation);
                }
            }
            out.push('\n');
        }
    }

    let _ = write!(
        out,
        "\nFound {}/{}",
        game.found_count(),
        game.phrases.len()
    );
    if config.show_timer {
        let _ = write!(out, "  Time {}", format_duration(elapsed_secs));
    }
    if config.show_hints {
        let _ = write!(
            out,
            "  Hints {}/{}",
            game.hints.remaining(),
            game.hints.budget()
        );
    }
    out.push('\n');

    if let Some(hint) = hint {
        let label = match hint.level {
            HintLevel::Start => "first letter",
            HintLevel::Direction => "direction",
            HintLevel::Reveal => "whole phrase",
            HintLevel::Idle => "",
        };
        let _ = writeln!(out, "Hint: {} shown in [brackets]", label);
    }

    if let Some((_, phrase)) = active.pending_translation() {
        let _ = writeln!(
            out,
            "Translate \"{}\" to count it, or type cancel",
            phrase.phrase
        );
    }

    out
}

/// Human-readable line for a session event
pub fn describe(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Loading => Some("Loading puzzle...".to_string()),
        SessionEvent::PuzzleLoaded { name } => Some(format!("Puzzle \"{}\" is ready.", name)),
        SessionEvent::LoadFailed { message } => Some(message.clone()),
        SessionEvent::SessionStarted {
            nickname,
            phrase_count,
            ..
        } => Some(format!(
            "Good luck, {}! Find {} phrases.",
            nickname, phrase_count
        )),
        SessionEvent::StartFailed { message } => Some(message.clone()),
        SessionEvent::TranslationRequested { phrase, .. } => {
            Some(format!("You found \"{}\". What does it mean?", phrase))
        }
        SessionEvent::PhraseFound {
            phrase,
            found,
            total,
            ..
        } => Some(format!("*** {} *** ({}/{})", phrase.to_uppercase(), found, total)),
        SessionEvent::PhraseListRevealed => Some("All phrases revealed.".to_string()),
        SessionEvent::Completed {
            phrases_found,
            duration_seconds,
        } => Some(format!(
            "Puzzle complete! {} phrases in {}.",
            phrases_found,
            format_duration(*duration_seconds)
        )),
        SessionEvent::HintShown(_) | SessionEvent::HintCleared => None,
    }
}

pub struct Terminal {
    session: PuzzleSession,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    nickname: Option<String>,
    profile_checked: bool,
    input: Lines<BufReader<Stdin>>,
}

impl Terminal {
    pub fn new(
        session: PuzzleSession,
        events: mpsc::UnboundedReceiver<SessionEvent>,
        nickname: Option<String>,
    ) -> Self {
        Self {
            session,
            events,
            nickname,
            profile_checked: false,
            input: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    fn flush_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if let Some(line) = describe(&event) {
                println!("{}", line);
            }
        }
    }

    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        println!("{}", label);
        Ok(self.input.next_line().await?)
    }

    /// Drive the session until the player quits or stdin closes.
    /// Returns the session so the caller can wait for the report.
    pub async fn run(mut self) -> Result<PuzzleSession> {
        self.session.mount().await;
        self.flush_events();

        loop {
            let keep_going = match self.session.phase() {
                Phase::Loading => {
                    self.session.mount().await;
                    true
                }
                Phase::Error(_) => self.on_error().await?,
                Phase::AwaitingStart { .. } => self.on_awaiting_start().await?,
                Phase::Playing(_) => self.on_playing().await?,
                Phase::Completed(_) => self.on_completed().await?,
            };
            self.flush_events();
            if !keep_going {
                break;
            }
        }

        Ok(self.session)
    }

    async fn on_error(&mut self) -> Result<bool> {
        let Some(line) = self.prompt("Type restart to try again, or quit.").await? else {
            return Ok(false);
        };
        match Command::parse(&line) {
            Command::Restart => {
                self.session.restart().await;
                Ok(true)
            }
            Command::Quit => Ok(false),
            _ => Ok(true),
        }
    }

    async fn on_awaiting_start(&mut self) -> Result<bool> {
        if let Phase::AwaitingStart { puzzle, .. } = self.session.phase() {
            if let Some(description) = &puzzle.description {
                println!("{}", description);
            }
        }

        // A logged-in player starts straight away under their profile name
        if self.nickname.is_none() && !self.profile_checked {
            self.profile_checked = true;
            match self.session.start(None).await {
                Ok(()) => {
                    self.nickname = self.session.active().map(|a| a.session.nickname.clone());
                    return Ok(true);
                }
                Err(e @ SessionError::WrongPhase { .. }) => {
                    println!("{}", e);
                    return Ok(true);
                }
                Err(_) => {}
            }
            self.flush_events();
        }

        let label = match &self.nickname {
            Some(name) => format!("Nickname [{}]:", name),
            None => "Nickname:".to_string(),
        };
        let Some(line) = self.prompt(&label).await? else {
            return Ok(false);
        };
        if Command::parse(&line) == Command::Quit {
            return Ok(false);
        }

        let typed = Some(line.trim()).filter(|n| !n.is_empty());
        let nickname = typed.map(str::to_string).or_else(|| self.nickname.clone());
        match self
            .session
            .start_as(nickname.as_deref().unwrap_or_default())
            .await
        {
            Ok(()) => self.nickname = nickname,
            Err(e @ SessionError::WrongPhase { .. }) => println!("{}", e),
            // Other start failures are announced as events
            Err(_) => {}
        }
        Ok(true)
    }

    async fn on_playing(&mut self) -> Result<bool> {
        let elapsed = self.session.tick().unwrap_or(0);
        self.flush_events();
        if let Some(active) = self.session.active() {
            print!("\n{}", render(active, elapsed));
        }

        let pending = self
            .session
            .active()
            .and_then(|a| a.pending_translation())
            .is_some();
        let label = if pending {
            "Translation:"
        } else {
            "Type a phrase, sel r,c r,c ..., hint, restart or quit:"
        };
        let Some(line) = self.prompt(label).await? else {
            return Ok(false);
        };

        let outcome = match Command::parse(&line) {
            Command::Quit => return Ok(false),
            Command::Restart => {
                self.session.restart().await;
                return Ok(true);
            }
            Command::Empty => return Ok(true),
            Command::Invalid(message) => {
                println!("{}", message);
                return Ok(true);
            }
            Command::Cancel if pending => self.session.cancel_translation().map(|_| None),
            Command::Guess(text) if pending => self
                .session
                .submit_translation(&text)
                .map(|submission| {
                    Some(if submission.is_correct {
                        "Correct!".to_string()
                    } else if submission.correct.is_empty() {
                        "Noted.".to_string()
                    } else {
                        format!("Not quite: \"{}\".", submission.correct)
                    })
                }),
            Command::Hint => self.session.request_hint().map(|_| None),
            Command::Select(cells) => self.session.resolve_selection(&cells).map(resolution_note),
            Command::Guess(text) => self.session.resolve_text(&text).map(resolution_note),
            Command::Cancel => Err(SessionError::NoPendingTranslation),
        };

        match outcome {
            Ok(Some(note)) => println!("{}", note),
            Ok(None) => {}
            Err(e) => println!("{}", e),
        }
        Ok(true)
    }

    async fn on_completed(&mut self) -> Result<bool> {
        if let Some(active) = self.session.active() {
            let elapsed = active.game.elapsed_secs(tokio::time::Instant::now());
            print!("\n{}", render(active, elapsed));
        }
        let Some(line) = self.prompt("Type restart to play again, or quit.").await? else {
            return Ok(false);
        };
        match Command::parse(&line) {
            Command::Restart => {
                self.session.restart().await;
                Ok(true)
            }
            Command::Quit => Ok(false),
            _ => Ok(true),
        }
    }
}

fn resolution_note(resolution: Resolution) -> Option<String> {
    match resolution {
        Resolution::Accepted { .. } | Resolution::TranslationRequired { .. } => None,
        Resolution::AlreadyFound => Some("Already found.".to_string()),
        Resolution::NoMatch => Some("Not in this puzzle.".to_string()),
    }
}
