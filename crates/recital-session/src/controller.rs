//! Interactive session controller.
//!
//! Owns the sentence list, the cursor and the collaborators, and drives the
//! [`StateMachine`] one blocking step at a time: render, read a key, act on
//! it. Faults raised by a step are reported and leave the decision to the
//! operator; nothing is retried automatically.

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use recital_core::error::{RecitalError, Result, SynthesisError};
use recital_core::traits::{AudioPlayer, CredentialProvider, KeyReader, SynthesisClient};
use recital_core::types::Credentials;

use crate::audio::AudioStore;
use crate::command::Command;
use crate::console::Console;
use crate::position::PositionStore;
use crate::reconcile::reconcile;
use crate::source::SentenceSource;
use crate::state::{SessionState, StateMachine};

/// File-backed stores the session reads and writes.
#[derive(Debug, Clone)]
pub struct SessionStores {
    pub source: SentenceSource,
    pub positions: PositionStore,
    pub audio: AudioStore,
}

/// External capabilities the session drives but does not implement.
pub struct Collaborators {
    pub keys: Box<dyn KeyReader>,
    pub synthesizer: Box<dyn SynthesisClient>,
    pub credentials: Box<dyn CredentialProvider>,
    pub player: Box<dyn AudioPlayer>,
}

/// Mutable session data passed through every step.
#[derive(Debug, Default)]
pub struct SessionContext {
    pub sentences: Vec<String>,
    /// Index of the displayed sentence. Dormant at 0 while `sentences` is empty.
    pub cursor: usize,
    /// Set after the first playback failure so later ones are not shown again.
    pub player_error_reported: bool,
    pub credentials: Option<Credentials>,
    /// Messages shown under the next rendered screen.
    pub notices: Vec<String>,
}

/// Result of [`SessionController::prepare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupSummary {
    /// Position read from the settings document.
    pub persisted: usize,
    /// Position after reconciling against the loaded text.
    pub cursor: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The operator quit; the position was saved.
    Quit,
    /// Ctrl+C, a signal or end of input; the position was not saved.
    Interrupted,
}

pub struct SessionController<W: Write> {
    stores: SessionStores,
    collaborators: Collaborators,
    console: Console<W>,
    context: SessionContext,
    machine: StateMachine,
    interrupted: Arc<AtomicBool>,
    fault: Option<String>,
    exit_reason: ExitReason,
}

impl<W: Write> SessionController<W> {
    pub fn new(stores: SessionStores, collaborators: Collaborators, console: Console<W>) -> Self {
        Self {
            stores,
            collaborators,
            console,
            context: SessionContext::default(),
            machine: StateMachine::new(SessionState::EmptyCollection),
            interrupted: Arc::new(AtomicBool::new(false)),
            fault: None,
            exit_reason: ExitReason::Interrupted,
        }
    }

    /// Share an interrupt flag that signal handlers set.
    ///
    /// The flag is checked between steps and right after a synthesis call
    /// returns. It never cancels a call that is already running.
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    /// Startup: load the persisted position, obtain credentials, load the
    /// text and reconcile the position against it.
    ///
    /// Credential and input failures are fatal here and returned as is.
    pub fn prepare(&mut self) -> Result<StartupSummary> {
        let persisted = self.stores.positions.load()?;
        let credentials = self.collaborators.credentials.obtain()?;
        let sentences = self.stores.source.load()?;

        let total = sentences.len();
        let cursor = reconcile(persisted, persisted.saturating_add(1), total);
        if cursor != persisted {
            info!(persisted, cursor, total, "Persisted position out of range, adjusting");
            self.stores.positions.save(cursor)?;
        }

        self.resume(sentences, cursor, Some(credentials));
        Ok(StartupSummary {
            persisted,
            cursor,
            total,
        })
    }

    /// Install a sentence list and cursor directly, skipping file loads.
    pub fn resume(&mut self, sentences: Vec<String>, cursor: usize, credentials: Option<Credentials>) {
        let cursor = reconcile(cursor, cursor.saturating_add(1), sentences.len());
        let initial = if sentences.is_empty() {
            SessionState::EmptyCollection
        } else {
            SessionState::Displaying
        };
        self.context = SessionContext {
            sentences,
            cursor,
            player_error_reported: false,
            credentials,
            notices: Vec::new(),
        };
        self.machine = StateMachine::new(initial);
        self.fault = None;
    }

    /// Run the interactive loop until the session exits.
    ///
    /// Returns an error only when a fault occurs while a previous fault is
    /// being reported.
    pub fn run(&mut self) -> Result<ExitReason> {
        loop {
            let state = self.machine.current();
            if !state.is_terminal() && self.interrupted.load(Ordering::SeqCst) {
                info!(state = %state, "Interrupt received");
                self.exit_interrupted()?;
                continue;
            }

            let step = match state {
                SessionState::Displaying => self.display(),
                SessionState::AwaitingKey => self.await_key(),
                SessionState::Recording => self.record(),
                SessionState::Reloading => self.reload(),
                SessionState::EmptyCollection => self.empty_collection(),
                SessionState::ErrorRecovery => self.recover(),
                SessionState::Exiting => {
                    info!(reason = ?self.exit_reason, cursor = self.context.cursor, "Session ended");
                    return Ok(self.exit_reason);
                }
            };

            if let Err(e) = step {
                if state == SessionState::ErrorRecovery {
                    error!(error = %e, "Fault while reporting a fault, giving up");
                    return Err(e);
                }
                error!(state = %state, error = %e, "Unhandled fault in session loop");
                self.fault = Some(e.to_string());
                self.machine.force(SessionState::ErrorRecovery);
            }
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn state(&self) -> SessionState {
        self.machine.current()
    }

    pub fn console(&self) -> &Console<W> {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console<W> {
        &mut self.console
    }

    pub fn stores(&self) -> &SessionStores {
        &self.stores
    }

    // -------------------------------------------------------------------------
    // Steps
    // -------------------------------------------------------------------------

    fn display(&mut self) -> Result<()> {
        if self.context.sentences.is_empty() {
            return self.machine.transition(SessionState::EmptyCollection);
        }

        let index = self.context.cursor;
        let sentence = self.context.sentences.get(index).ok_or_else(|| {
            RecitalError::Session(format!(
                "cursor {} outside {} sentences",
                index,
                self.context.sentences.len()
            ))
        })?;
        // Checked on every render; a recording may have happened since.
        let recorded = self.stores.audio.exists(index);
        let notices = std::mem::take(&mut self.context.notices);
        self.console.show_sentence(sentence, recorded, &notices)?;
        self.machine.transition(SessionState::AwaitingKey)
    }

    fn await_key(&mut self) -> Result<()> {
        let key = self.collaborators.keys.read_key()?;
        let command = Command::from_key(key);
        debug!(?key, ?command, cursor = self.context.cursor, "Key read");

        match command {
            Command::Next => {
                if self.context.cursor + 1 < self.context.sentences.len() {
                    self.context.cursor += 1;
                    self.save_position()?;
                }
                self.machine.transition(SessionState::Displaying)
            }
            Command::Prev => {
                if self.context.cursor > 0 {
                    self.context.cursor -= 1;
                }
                self.machine.transition(SessionState::Displaying)
            }
            Command::Record => self.machine.transition(SessionState::Recording),
            Command::Reload => self.machine.transition(SessionState::Reloading),
            Command::Quit => self.exit_quit(),
            Command::Interrupt => self.exit_interrupted(),
            Command::Ignored => Ok(()),
        }
    }

    fn record(&mut self) -> Result<()> {
        self.record_current();
        self.machine.transition(SessionState::Displaying)
    }

    /// Synthesize, save and play the current sentence. Every failure here is
    /// turned into a notice; the session always returns to the sentence.
    fn record_current(&mut self) {
        let index = self.context.cursor;
        let Some(text) = self.context.sentences.get(index).cloned() else {
            return;
        };
        let Some(credentials) = self.ensure_credentials() else {
            return;
        };

        info!(sentence = index + 1, "Synthesizing");
        let result = self.collaborators.synthesizer.synthesize(&text, &credentials);
        if self.interrupted.load(Ordering::SeqCst) {
            debug!("Interrupted during synthesis, discarding result");
            return;
        }

        match result {
            Ok(audio) => {
                let path = match self.stores.audio.write(index, &audio) {
                    Ok(path) => path,
                    Err(e) => {
                        warn!(sentence = index + 1, error = %e, "Failed to save audio");
                        self.notice(format!(
                            "Failed to save audio for sentence {}: {}",
                            index + 1,
                            e
                        ));
                        return;
                    }
                };
                self.play(&path);
            }
            Err(SynthesisError::Unauthorized) => {
                warn!(sentence = index + 1, "Synthesis rejected as unauthorized");
                self.notice("Authentication failed (HTTP 401). Refreshing token...");
                self.context.credentials = None;
                match self.collaborators.credentials.obtain() {
                    Ok(fresh) => {
                        info!("Credentials refreshed");
                        self.context.credentials = Some(fresh);
                        self.notice("Token refreshed. Try recording again.");
                    }
                    Err(e) => {
                        warn!(error = %e, "Credential refresh failed");
                        self.notice(format!("Failed to refresh token: {}", e));
                    }
                }
            }
            Err(SynthesisError::PermissionDenied) => {
                warn!(sentence = index + 1, "Synthesis rejected with permission denied");
                self.notice(
                    "Permission denied (HTTP 403). Check that the Text-to-Speech API is \
                     enabled and the account has the required role.",
                );
            }
            Err(e) => {
                warn!(sentence = index + 1, error = %e, "Synthesis failed");
                self.notice(format!("Failed to synthesize sentence {}: {}", index + 1, e));
            }
        }
    }

    /// Current credentials, obtaining them once if none are held.
    fn ensure_credentials(&mut self) -> Option<Credentials> {
        if let Some(credentials) = &self.context.credentials {
            return Some(credentials.clone());
        }
        match self.collaborators.credentials.obtain() {
            Ok(credentials) => {
                self.context.credentials = Some(credentials.clone());
                Some(credentials)
            }
            Err(e) => {
                warn!(error = %e, "No credentials available for synthesis");
                self.notice(format!("Could not obtain credentials: {}", e));
                None
            }
        }
    }

    fn play(&mut self, path: &Path) {
        match self.collaborators.player.play(path) {
            Ok(()) => debug!(path = %path.display(), "Playback finished"),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Playback failed");
                if !self.context.player_error_reported {
                    self.context.player_error_reported = true;
                    self.notice(format!("Playback error: {}", e));
                }
            }
        }
    }

    fn reload(&mut self) -> Result<()> {
        self.context.player_error_reported = false;
        let old_cursor = self.context.cursor;
        let old_count = self.context.sentences.len();

        match self.stores.source.load() {
            Ok(sentences) => {
                let cursor = reconcile(old_cursor, old_count, sentences.len());
                info!(old_count, new_count = sentences.len(), cursor, "Text reloaded");
                self.context.sentences = sentences;
                self.context.cursor = cursor;
                let summary = format!("Sentence {} / {}", cursor + 1, self.context.sentences.len());
                self.notice(summary);
                self.machine.transition(SessionState::Displaying)
            }
            Err(e) => {
                warn!(error = %e, "Reload produced no sentences");
                self.context.sentences.clear();
                self.context.cursor = 0;
                self.notice(format!("Reload failed: {}", e));
                self.machine.transition(SessionState::EmptyCollection)
            }
        }
    }

    fn empty_collection(&mut self) -> Result<()> {
        let notices = std::mem::take(&mut self.context.notices);
        self.console.show_empty(self.stores.source.path(), &notices)?;

        match Command::from_key(self.collaborators.keys.read_key()?) {
            Command::Reload => self.machine.transition(SessionState::Reloading),
            Command::Quit => self.exit_quit(),
            Command::Interrupt => self.exit_interrupted(),
            _ => Ok(()),
        }
    }

    fn recover(&mut self) -> Result<()> {
        let message = self
            .fault
            .take()
            .unwrap_or_else(|| "unknown error".to_string());
        self.console.show_fault(&message)?;

        match Command::from_key(self.collaborators.keys.read_key()?) {
            Command::Interrupt => self.exit_interrupted(),
            Command::Quit => {
                if let Err(e) = self.save_position() {
                    error!(error = %e, "Failed to save position while quitting");
                }
                self.exit_reason = ExitReason::Quit;
                self.machine.transition(SessionState::Exiting)
            }
            _ => {
                let next = if self.context.sentences.is_empty() {
                    SessionState::EmptyCollection
                } else {
                    SessionState::Displaying
                };
                self.machine.transition(next)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn exit_quit(&mut self) -> Result<()> {
        self.save_position()?;
        self.exit_reason = ExitReason::Quit;
        self.machine.transition(SessionState::Exiting)
    }

    fn exit_interrupted(&mut self) -> Result<()> {
        info!(cursor = self.context.cursor, "Exiting without saving position");
        self.exit_reason = ExitReason::Interrupted;
        self.machine.transition(SessionState::Exiting)
    }

    fn save_position(&self) -> Result<()> {
        self.stores.positions.save(self.context.cursor)
    }

    fn notice(&mut self, message: impl Into<String>) {
        self.context.notices.push(message.into());
    }
}

// =============================================================================
// Tests
// =============================================================================
