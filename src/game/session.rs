//! Game Session
//!
//! The single guessing game shared by every request: a secret number and
//! an attempt counter. One instance lives for the whole process.
//!
//! ## Round Rules
//!
//! Each valid guess consumes one attempt and is classified in this order:
//!
//! 1. `guess == secret` → [`GuessOutcome::Correct`], new round
//! 2. attempts used up → [`GuessOutcome::GameOver`], new round
//! 3. `guess < secret` → [`GuessOutcome::Low`]
//! 4. otherwise → [`GuessOutcome::High`]
//!
//! A correct guess on the last attempt is a win, not a game over.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::game::secret::SecretSource;
use crate::{MAX_ATTEMPTS, SECRET_MAX, SECRET_MIN};

/// Classification of a valid guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessOutcome {
    /// Guess is below the secret.
    #[serde(rename = "low")]
    Low,
    /// Guess is above the secret.
    #[serde(rename = "high")]
    High,
    /// Guess matched; the round is over.
    #[serde(rename = "correct")]
    Correct,
    /// Attempts exhausted; the round is over.
    #[serde(rename = "GAME OVER")]
    GameOver,
}

impl GuessOutcome {
    /// Whether this outcome ends the round.
    pub fn ends_round(self) -> bool {
        matches!(self, GuessOutcome::Correct | GuessOutcome::GameOver)
    }
}

impl fmt::Display for GuessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GuessOutcome::Low => "low",
            GuessOutcome::High => "high",
            GuessOutcome::Correct => "correct",
            GuessOutcome::GameOver => "GAME OVER",
        };
        f.write_str(s)
    }
}

/// Result of a valid guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessResult {
    /// How the guess compared.
    pub outcome: GuessOutcome,
    /// Attempts left in the current round (0 when the round ended).
    pub attempts_remaining: u32,
    /// The secret, only when the round ended.
    pub revealed_secret: Option<u32>,
}

/// Guess rejected before touching any state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuessError {
    /// Guess outside `[SECRET_MIN, SECRET_MAX]`.
    #[error("Guess must be between 1 and 100.")]
    OutOfRange {
        /// The rejected value.
        guess: i64,
    },
}

/// Secret plus attempt counter.
pub struct GameSession {
    secret: u32,
    attempts: u32,
    source: Box<dyn SecretSource>,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secret deliberately omitted from logs.
        f.debug_struct("GameSession")
            .field("attempts", &self.attempts)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Start a session, drawing the first secret from `source`.
    pub fn new(mut source: Box<dyn SecretSource>) -> Self {
        let secret = source.draw_secret();
        Self {
            secret,
            attempts: 0,
            source,
        }
    }

    /// Submit a guess.
    ///
    /// Out-of-range guesses fail with [`GuessError::OutOfRange`] and leave
    /// the session untouched.
    pub fn submit_guess(&mut self, guess: i64) -> Result<GuessResult, GuessError> {
        if guess < SECRET_MIN as i64 || guess > SECRET_MAX as i64 {
            return Err(GuessError::OutOfRange { guess });
        }
        let guess = guess as u32;

        self.attempts += 1;

        let outcome = if guess == self.secret {
            GuessOutcome::Correct
        } else if self.attempts >= MAX_ATTEMPTS {
            GuessOutcome::GameOver
        } else if guess < self.secret {
            GuessOutcome::Low
        } else {
            GuessOutcome::High
        };

        if outcome.ends_round() {
            let revealed = self.secret;
            self.new_round();
            return Ok(GuessResult {
                outcome,
                attempts_remaining: 0,
                revealed_secret: Some(revealed),
            });
        }

        Ok(GuessResult {
            outcome,
            attempts_remaining: MAX_ATTEMPTS - self.attempts,
            revealed_secret: None,
        })
    }

    /// Start a new round unconditionally. Returns the new secret.
    ///
    /// The return value is diagnostic; the restart endpoint leaks it for
    /// compatibility with existing clients.
    pub fn restart(&mut self) -> u32 {
        self.new_round();
        self.secret
    }

    /// Attempts used in the current round.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Attempts left in the current round.
    pub fn attempts_remaining(&self) -> u32 {
        MAX_ATTEMPTS - self.attempts
    }

    /// Current secret. Diagnostic only.
    pub fn secret(&self) -> u32 {
        self.secret
    }

    fn new_round(&mut self) {
        self.attempts = 0;
        self.secret = self.source.draw_secret();
    }
}

/// Shared, mutex-guarded handle to the process-wide [`GameSession`].
///
/// Every operation holds the lock for its whole read-modify-write, so
/// concurrent guesses are applied one after another.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<GameSession>>,
}

impl SharedSession {
    /// Wrap a session for sharing across request handlers.
    pub fn new(session: GameSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// See [`GameSession::submit_guess`].
    pub async fn submit_guess(&self, guess: i64) -> Result<GuessResult, GuessError> {
        self.inner.lock().await.submit_guess(guess)
    }

    /// See [`GameSession::restart`].
    pub async fn restart(&self) -> u32 {
        self.inner.lock().await.restart()
    }

    /// Attempts used in the current round.
    pub async fn attempts(&self) -> u32 {
        self.inner.lock().await.attempts()
    }

    /// Current secret. Diagnostic only.
    pub async fn secret(&self) -> u32 {
        self.inner.lock().await.secret()
    }
}

// =============================================================================
// TESTS
// =============================================================================
