use chrono::Utc;
use std::sync::Arc;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::Instant,
};

use super::SessionEvent;
use crate::{
    api::{ApiError, PuzzleApi, PuzzleErrorCode},
    auth,
    config::SessionConfig,
    game::{translation, GameState, Hint, HintError, HintLevel, SelectionValidator},
    models::{
        CompleteSessionRequest, Phrase, Position, PuzzleSet, Session, StartSessionRequest,
        TranslationSubmission,
    },
    storage::{SessionStorage, SESSION_NICKNAME_KEY, SESSION_PUZZLE_KEY, SESSION_TOKEN_KEY},
};

/// Longest nickname the start form accepts
pub const MAX_NICKNAME_LEN: usize = 50;

const LOAD_TIMEOUT_MESSAGE: &str =
    "Loading the puzzle is taking too long. Please try again later.";
const LOAD_NETWORK_MESSAGE: &str =
    "We could not load this puzzle. Please check your connection and try again.";
const START_FAILED_MESSAGE: &str = "We could not start the puzzle. Please try again.";

/// Why a puzzle could not be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// The backend refused the token; terminal for this token
    Unavailable(PuzzleErrorCode),
    /// The lookup did not finish within the load timeout
    Timeout,
    /// Transport or server failure; a restart may help
    Network,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub reason: LoadFailure,
    pub message: String,
}

impl LoadError {
    fn unavailable(code: PuzzleErrorCode) -> Self {
        Self {
            message: code.user_message().to_string(),
            reason: LoadFailure::Unavailable(code),
        }
    }
}

/// A started play-through and its local game state
#[derive(Debug)]
pub struct ActiveSession {
    pub session: Session,
    pub puzzle: PuzzleSet,
    pub game: GameState,
    pending_translation: Option<usize>,
}

impl ActiveSession {
    /// Phrase waiting for a translation before it counts as found
    pub fn pending_translation(&self) -> Option<(usize, &Phrase)> {
        let index = self.pending_translation?;
        self.game.phrases.get(index).map(|p| (index, p))
    }

    pub fn current_hint(&self) -> Option<Hint> {
        self.game.hints.current()
    }
}

#[derive(Debug)]
pub enum Phase {
    Loading,
    Error(LoadError),
    AwaitingStart {
        puzzle: PuzzleSet,
        /// Message from the last failed start attempt
        error: Option<String>,
    },
    Playing(Box<ActiveSession>),
    Completed(Box<ActiveSession>),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Error(_) => "showing an error",
            Phase::AwaitingStart { .. } => "waiting to start",
            Phase::Playing(_) => "playing",
            Phase::Completed(_) => "completed",
        }
    }
}

/// Outcome of locating a phrase on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Accepted { phrase_index: usize, completed: bool },
    AlreadyFound,
    TranslationRequired { phrase_index: usize },
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {action} while {phase}")]
    WrongPhase {
        action: &'static str,
        phase: &'static str,
    },
    #[error("please enter a nickname")]
    NicknameRequired,
    #[error("nickname must be at most {0} characters")]
    NicknameTooLong(usize),
    #[error("{0}")]
    StartFailed(String),
    #[error("finish the translation for \"{0}\" first")]
    TranslationPending(String),
    #[error("no translation is pending")]
    NoPendingTranslation,
    #[error("please type a translation")]
    EmptyTranslation,
    #[error(transparent)]
    Hint(#[from] HintError),
}

fn wrong_phase(action: &'static str, phase: &Phase) -> SessionError {
    SessionError::WrongPhase {
        action,
        phase: phase.name(),
    }
}

/// State machine behind the hotlinked puzzle page:
/// `Loading -> {Error | AwaitingStart} -> Playing -> Completed`
pub struct PuzzleSession {
    api: Arc<dyn PuzzleApi>,
    storage: Arc<dyn SessionStorage>,
    config: SessionConfig,
    access_token: String,
    phase: Phase,
    events: mpsc::UnboundedSender<SessionEvent>,
    report_task: Option<JoinHandle<()>>,
}

impl PuzzleSession {
    pub fn new(
        api: Arc<dyn PuzzleApi>,
        storage: Arc<dyn SessionStorage>,
        config: SessionConfig,
        access_token: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let session = Self {
            api,
            storage,
            config,
            access_token: access_token.into(),
            phase: Phase::Loading,
            events,
            report_task: None,
        };
        (session, rx)
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The running or finished play-through, if any
    pub fn active(&self) -> Option<&ActiveSession> {
        match &self.phase {
            Phase::Playing(active) | Phase::Completed(active) => Some(active),
            _ => None,
        }
    }

    fn emit(events: &mpsc::UnboundedSender<SessionEvent>, event: SessionEvent) {
        // The front end may have gone away; the session keeps working
        let _ = events.send(event);
    }

    /// Enter the page: forget any previous session, then look the puzzle up
    pub async fn mount(&mut self) -> &Phase {
        self.storage.clear_session();
        // An in-flight completion report keeps running on its own
        self.report_task = None;
        self.phase = Phase::Loading;
        Self::emit(&self.events, SessionEvent::Loading);

        self.phase = self.load().await;
        match &self.phase {
            Phase::AwaitingStart { puzzle, .. } => {
                tracing::info!("Loaded puzzle set \"{}\"", puzzle.name);
                Self::emit(
                    &self.events,
                    SessionEvent::PuzzleLoaded {
                        name: puzzle.name.clone(),
                    },
                );
            }
            Phase::Error(error) => {
                tracing::warn!("Puzzle unavailable: {:?}", error.reason);
                Self::emit(
                    &self.events,
                    SessionEvent::LoadFailed {
                        message: error.message.clone(),
                    },
                );
            }
            _ => {}
        }

        &self.phase
    }

    /// Throw the current play-through away and load the puzzle again
    pub async fn restart(&mut self) -> &Phase {
        tracing::info!("Restarting puzzle session");
        self.mount().await
    }

    async fn load(&self) -> Phase {
        let token = self.access_token.trim();
        if token.is_empty() {
            return Phase::Error(LoadError::unavailable(PuzzleErrorCode::NotFound));
        }

        let lookup = self.api.puzzle_set_by_token(token);
        match tokio::time::timeout(self.config.load_timeout, lookup).await {
            Ok(Ok(puzzle)) => Phase::AwaitingStart {
                puzzle,
                error: None,
            },
            Ok(Err(ApiError::Puzzle(code))) => Phase::Error(LoadError::unavailable(code)),
            Ok(Err(e)) => {
                tracing::error!("Failed to load puzzle set: {}", e);
                Phase::Error(LoadError {
                    reason: LoadFailure::Network,
                    message: LOAD_NETWORK_MESSAGE.to_string(),
                })
            }
            Err(_) => {
                tracing::error!(
                    "Puzzle lookup did not finish within {:?}",
                    self.config.load_timeout
                );
                Phase::Error(LoadError {
                    reason: LoadFailure::Timeout,
                    message: LOAD_TIMEOUT_MESSAGE.to_string(),
                })
            }
        }
    }

    /// Nickname of the logged-in player, if a usable auth token is stored.
    /// Any failure falls back to anonymous entry.
    pub async fn prefill_nickname(&self) -> Option<String> {
        let token = auth::usable_token(self.storage.as_ref(), Utc::now())?;
        match self.api.profile(&token).await {
            Ok(profile) => Some(profile.display_name().to_string()),
            Err(e) => {
                tracing::debug!("Profile lookup failed, asking for a nickname: {}", e);
                None
            }
        }
    }

    fn fail_start(&mut self, error: SessionError) -> Result<(), SessionError> {
        if let Phase::AwaitingStart { error: slot, .. } = &mut self.phase {
            *slot = Some(error.to_string());
        }
        Self::emit(
            &self.events,
            SessionEvent::StartFailed {
                message: error.to_string(),
            },
        );
        Err(error)
    }

    /// Start a play-through. Without a nickname, the profile of a logged-in
    /// player is used.
    pub async fn start(&mut self, nickname: Option<&str>) -> Result<(), SessionError> {
        if !matches!(self.phase, Phase::AwaitingStart { .. }) {
            return Err(wrong_phase("start a session", &self.phase));
        }

        let nickname = match nickname.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => self.prefill_nickname().await.unwrap_or_default(),
        };
        self.start_as(&nickname).await
    }

    /// Start a play-through under exactly this nickname, without asking the
    /// profile endpoint
    pub async fn start_as(&mut self, nickname: &str) -> Result<(), SessionError> {
        let puzzle = match &self.phase {
            Phase::AwaitingStart { puzzle, .. } => puzzle.clone(),
            other => return Err(wrong_phase("start a session", other)),
        };

        let nickname = nickname.trim().to_string();
        if nickname.is_empty() {
            return self.fail_start(SessionError::NicknameRequired);
        }
        if nickname.chars().count() > MAX_NICKNAME_LEN {
            return self.fail_start(SessionError::NicknameTooLong(MAX_NICKNAME_LEN));
        }

        let bearer = auth::usable_token(self.storage.as_ref(), Utc::now());
        let request = StartSessionRequest {
            token: self.access_token.trim().to_string(),
            nickname: nickname.clone(),
        };

        let response = match self.api.start_session(&request, bearer.as_deref()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to start puzzle session: {}", e);
                let message = e
                    .puzzle_code()
                    .map(|code| code.user_message())
                    .unwrap_or(START_FAILED_MESSAGE);
                return self.fail_start(SessionError::StartFailed(message.to_string()));
            }
        };

        if response.phrases.is_empty() {
            tracing::error!("Session start returned a puzzle without phrases");
            return self.fail_start(SessionError::StartFailed(START_FAILED_MESSAGE.to_string()));
        }

        let config = response.config.unwrap_or_else(|| puzzle.config.clone());
        let session = Session {
            session_token: response.session_token,
            puzzle_name: response.puzzle_name.unwrap_or_else(|| puzzle.name.clone()),
            nickname,
            started_at: Utc::now(),
            config,
        };

        self.storage.set(SESSION_TOKEN_KEY, &session.session_token);
        self.storage.set(SESSION_NICKNAME_KEY, &session.nickname);
        self.storage.set(SESSION_PUZZLE_KEY, self.access_token.trim());

        let game = GameState::new(
            response.grid,
            response.phrases,
            self.config.hint_budget,
            self.config.hint_reset_delay,
            !session.config.hide_phrase_list,
            Instant::now(),
        );

        tracing::info!(
            "Session started for \"{}\" as {} at {} ({} phrases)",
            session.puzzle_name,
            session.nickname,
            session.started_at,
            game.phrases.len()
        );
        Self::emit(
            &self.events,
            SessionEvent::SessionStarted {
                puzzle_name: session.puzzle_name.clone(),
                nickname: session.nickname.clone(),
                phrase_count: game.phrases.len(),
            },
        );

        self.phase = Phase::Playing(Box::new(ActiveSession {
            session,
            puzzle,
            game,
            pending_translation: None,
        }));
        Ok(())
    }

    /// The player located phrase `index` on the board
    pub fn resolve_phrase(&mut self, index: usize) -> Result<Resolution, SessionError> {
        let active = match &mut self.phase {
            Phase::Playing(active) => active,
            // Everything is found already
            Phase::Completed(_) => return Ok(Resolution::AlreadyFound),
            other => return Err(wrong_phase("resolve a phrase", other)),
        };

        let Some(phrase) = active.game.phrases.get(index) else {
            return Ok(Resolution::NoMatch);
        };

        if let Some(pending) = active.pending_translation {
            if pending == index {
                return Ok(Resolution::TranslationRequired {
                    phrase_index: index,
                });
            }
            let pending_phrase = active.game.phrases[pending].phrase.clone();
            return Err(SessionError::TranslationPending(pending_phrase));
        }

        if active.game.is_found(index) {
            return Ok(Resolution::AlreadyFound);
        }

        if active.session.config.require_translation_input {
            let phrase = phrase.phrase.clone();
            active.pending_translation = Some(index);
            Self::emit(
                &self.events,
                SessionEvent::TranslationRequested {
                    phrase_index: index,
                    phrase,
                },
            );
            return Ok(Resolution::TranslationRequired {
                phrase_index: index,
            });
        }

        Ok(self.accept(index))
    }

    /// The player dragged across a line of cells
    pub fn resolve_selection(&mut self, positions: &[Position]) -> Result<Resolution, SessionError> {
        let matched = match &self.phase {
            Phase::Playing(active) | Phase::Completed(active) => {
                SelectionValidator::new(active.session.config.game_type).match_phrase(
                    &active.game.grid,
                    positions,
                    &active.game.phrases,
                    active.game.found_set(),
                )
            }
            other => return Err(wrong_phase("select cells", other)),
        };

        match matched {
            Some(index) => self.resolve_phrase(index),
            None => Ok(Resolution::NoMatch),
        }
    }

    /// The player typed a phrase they spotted
    pub fn resolve_text(&mut self, text: &str) -> Result<Resolution, SessionError> {
        let matched = match &self.phase {
            Phase::Playing(active) | Phase::Completed(active) => {
                SelectionValidator::new(active.session.config.game_type)
                    .match_text(text, &active.game.phrases, active.game.found_set())
            }
            other => return Err(wrong_phase("guess a phrase", other)),
        };

        match matched {
            Some(index) => self.resolve_phrase(index),
            None => Ok(Resolution::NoMatch),
        }
    }

    /// Record the translation for the pending phrase, then accept it
    pub fn submit_translation(&mut self, text: &str) -> Result<TranslationSubmission, SessionError> {
        let active = match &mut self.phase {
            Phase::Playing(active) => active,
            other => return Err(wrong_phase("submit a translation", other)),
        };

        let index = active
            .pending_translation
            .ok_or(SessionError::NoPendingTranslation)?;
        if text.trim().is_empty() {
            return Err(SessionError::EmptyTranslation);
        }

        let submission = translation::grade(&active.game.phrases[index], text);
        tracing::debug!(
            "Translation for \"{}\" submitted (correct: {})",
            submission.phrase,
            submission.is_correct
        );
        active.game.record_submission(submission.clone());
        active.pending_translation = None;

        self.accept(index);
        Ok(submission)
    }

    /// Close the translation prompt without accepting the phrase
    pub fn cancel_translation(&mut self) -> Result<(), SessionError> {
        match &mut self.phase {
            Phase::Playing(active) => {
                active
                    .pending_translation
                    .take()
                    .ok_or(SessionError::NoPendingTranslation)?;
                Ok(())
            }
            other => Err(wrong_phase("cancel a translation", other)),
        }
    }

    fn accept(&mut self, index: usize) -> Resolution {
        let now = Instant::now();
        let Phase::Playing(active) = &mut self.phase else {
            return Resolution::AlreadyFound;
        };

        if !active.game.mark_found(index) {
            return Resolution::AlreadyFound;
        }

        if active.game.hints.level() != HintLevel::Idle {
            active.game.hints.clear();
            Self::emit(&self.events, SessionEvent::HintCleared);
        }

        Self::emit(
            &self.events,
            SessionEvent::PhraseFound {
                phrase_index: index,
                phrase: active.game.phrases[index].phrase.clone(),
                found: active.game.found_count(),
                total: active.game.phrases.len(),
            },
        );

        let completed = active.game.is_complete();
        if completed {
            active.game.finish(now);
            if active.game.reveal_phrase_list() {
                Self::emit(&self.events, SessionEvent::PhraseListRevealed);
            }
            self.complete(now);
        }

        Resolution::Accepted {
            phrase_index: index,
            completed,
        }
    }

    /// Move to Completed and report in the background, exactly once
    fn complete(&mut self, now: Instant) {
        let active = match std::mem::replace(&mut self.phase, Phase::Loading) {
            Phase::Playing(active) => active,
            other => {
                self.phase = other;
                return;
            }
        };

        let request = CompleteSessionRequest {
            session_token: active.session.session_token.clone(),
            phrases_found: active.game.found_count(),
            duration_seconds: active.game.elapsed_secs(now),
            translation_submissions: active
                .session
                .config
                .require_translation_input
                .then(|| active.game.submissions().to_vec()),
        };

        tracing::info!(
            "Puzzle completed: {} phrases in {}s",
            request.phrases_found,
            request.duration_seconds
        );
        Self::emit(
            &self.events,
            SessionEvent::Completed {
                phrases_found: request.phrases_found,
                duration_seconds: request.duration_seconds,
            },
        );
        self.phase = Phase::Completed(active);

        let api = Arc::clone(&self.api);
        self.report_task = Some(tokio::spawn(async move {
            match api.complete_session(&request).await {
                Ok(()) => tracing::info!("Completion reported"),
                // The player already sees the finished board
                Err(e) => tracing::warn!("Failed to report puzzle completion: {}", e),
            }
        }));
    }

    /// Advance the progressive hint by one level
    pub fn request_hint(&mut self) -> Result<Hint, SessionError> {
        let now = Instant::now();
        let active = match &mut self.phase {
            Phase::Playing(active) => active,
            other => return Err(wrong_phase("request a hint", other)),
        };

        if !active.session.config.show_hints {
            return Err(HintError::Disabled.into());
        }

        if active.game.hints.refresh(now) {
            Self::emit(&self.events, SessionEvent::HintCleared);
        }

        let candidates = active.game.hint_candidates(active.session.config.game_type);
        let hint = active.game.hints.advance(&candidates, now)?;
        Self::emit(&self.events, SessionEvent::HintShown(hint.clone()));
        Ok(hint)
    }

    /// Periodic clock tick from the front end. Applies the hint auto-reset
    /// and returns the elapsed seconds of the current play-through.
    pub fn tick(&mut self) -> Option<u64> {
        let now = Instant::now();
        match &mut self.phase {
            Phase::Playing(active) => {
                if active.game.hints.refresh(now) {
                    Self::emit(&self.events, SessionEvent::HintCleared);
                }
                Some(active.game.elapsed_secs(now))
            }
            Phase::Completed(active) => Some(active.game.elapsed_secs(now)),
            _ => None,
        }
    }

    /// Wait for the background completion report, if one was sent
    pub async fn wait_for_report(&mut self) {
        if let Some(task) = self.report_task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Completion report task failed: {}", e);
            }
        }
    }
}
