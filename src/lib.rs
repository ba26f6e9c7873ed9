//! # Number Guess Server
//!
//! A single-player number-guessing game served over a small JSON API,
//! plus the ambient particle animation used as the page background.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    NUMBER GUESS SERVER                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  game/            - Game rules (no I/O)                      │
//! │  ├── secret.rs    - Pluggable uniform secret source          │
//! │  └── session.rs   - Secret, attempts, guess classification   │
//! │                                                              │
//! │  network/         - HTTP transport                           │
//! │  ├── framing.rs   - HTTP/1.1 request/response framing        │
//! │  ├── protocol.rs  - JSON message types                       │
//! │  └── server.rs    - Accept loop, routing, static files       │
//! │                                                              │
//! │  ambient/         - Background particle animation            │
//! │  ├── particle.rs  - Particle update rule, toroidal wrap      │
//! │  ├── palette.rs   - Themes and colors                        │
//! │  ├── canvas.rs    - Drawing surface                          │
//! │  ├── field.rs     - Pool, resize/scroll/theme reactions      │
//! │  └── frame_loop.rs- Timer-driven update/draw task            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Shared Session
//!
//! There is exactly one game for the whole process, not one per player.
//! Handlers reach it through [`SharedSession`], which serializes every
//! guess and restart behind a single lock.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ambient;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use game::secret::{RandomSecrets, SecretSource};
pub use game::session::{GameSession, GuessError, GuessOutcome, GuessResult, SharedSession};
pub use network::server::{GameServer, ServerConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Smallest possible secret (and guess).
pub const SECRET_MIN: u32 = 1;

/// Largest possible secret (and guess).
pub const SECRET_MAX: u32 = 100;

/// Guesses allowed per round.
pub const MAX_ATTEMPTS: u32 = 5;
