//! Game Logic Module
//!
//! The guessing game itself. No I/O happens here.
//!
//! ## Module Structure
//!
//! - `secret`: Pluggable uniform source of secret numbers
//! - `session`: Secret + attempt counter, guess classification, shared handle

pub mod secret;
pub mod session;

// Re-export key types
pub use secret::{RandomSecrets, SecretSource};
pub use session::{GameSession, GuessError, GuessOutcome, GuessResult, SharedSession};
