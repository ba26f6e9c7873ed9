//! Network Layer
//!
//! HTTP transport for the guessing game.
//! All game rules live in `game/`; this layer only parses, routes and serializes.

pub mod framing;
pub mod protocol;
pub mod server;

pub use framing::HttpError;
pub use protocol::{GuessRequest, GuessResponse, ProtocolError, RestartResponse};
pub use server::{ConfigError, GameServer, ServerConfig, ServerError};
