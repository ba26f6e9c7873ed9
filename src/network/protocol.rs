//! Protocol Messages
//!
//! JSON wire format for the two API endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::game::session::{GuessOutcome, GuessResult};

/// Message returned by the restart endpoint.
pub const RESTART_MESSAGE: &str = "Game restarted!";

/// Request body could not be turned into a guess.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Body is JSON but not an object.
    #[error("request body must be a JSON object")]
    NotAnObject,

    /// Body is `null`, or has no `guess` property, or it is null. Reported
    /// like an out-of-range guess.
    #[error("Guess must be between 1 and 100.")]
    MissingGuess,

    /// `guess` is present but not an integer.
    #[error("guess must be an integer")]
    NotAnInteger,
}

// =============================================================================
// CLIENT -> SERVER
// =============================================================================

/// Body of `POST /api/guess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuessRequest {
    /// The guessed number. Range is checked by the session, not here.
    pub guess: i64,
}

impl GuessRequest {
    /// Parse a request body.
    ///
    /// Lenient the way browser clients expect: the property name is matched
    /// case-insensitively and integers sent as JSON strings (`"42"`) are
    /// accepted.
    pub fn from_json(body: &[u8]) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_slice(body)?;
        if value.is_null() {
            return Err(ProtocolError::MissingGuess);
        }
        let object = value.as_object().ok_or(ProtocolError::NotAnObject)?;

        let raw = object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("guess"))
            .map(|(_, v)| v);

        let guess = match raw {
            None | Some(Value::Null) => return Err(ProtocolError::MissingGuess),
            Some(Value::Number(n)) => n.as_i64().ok_or(ProtocolError::NotAnInteger)?,
            Some(Value::String(s)) => s.parse::<i64>().map_err(|_| ProtocolError::NotAnInteger)?,
            Some(_) => return Err(ProtocolError::NotAnInteger),
        };

        Ok(Self { guess })
    }
}

// =============================================================================
// SERVER -> CLIENT
// =============================================================================

/// Body of a successful `POST /api/guess`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResponse {
    /// `"low"`, `"high"`, `"correct"` or `"GAME OVER"`.
    pub result: GuessOutcome,
    /// Attempts left in the round.
    pub attempts_left: u32,
    /// The secret when the round ended, `null` otherwise.
    pub correct_number: Option<u32>,
}

impl From<GuessResult> for GuessResponse {
    fn from(r: GuessResult) -> Self {
        Self {
            result: r.outcome,
            attempts_left: r.attempts_remaining,
            correct_number: r.revealed_secret,
        }
    }
}

/// Body of `POST /api/restart`.
///
/// Carries the new secret in plain text. Existing clients ignore it, but it
/// is kept for wire compatibility. Known weakness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestartResponse {
    /// Always [`RESTART_MESSAGE`].
    pub message: String,
    /// The freshly drawn secret.
    pub secret_number: u32,
}

impl RestartResponse {
    /// Response for a restart that drew `secret`.
    pub fn new(secret: u32) -> Self {
        Self {
            message: RESTART_MESSAGE.to_string(),
            secret_number: secret,
        }
    }
}

/// Serialize a response body.
pub fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_integer_guess() {
        let req = GuessRequest::from_json(br#"{"guess": 42}"#).unwrap();
        assert_eq!(req.guess, 42);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let req = GuessRequest::from_json(br#"{"Guess": 7}"#).unwrap();
        assert_eq!(req.guess, 7);
    }

    #[test]
    fn test_parse_numeric_string() {
        // What the bundled front end sends straight from the input field
        let req = GuessRequest::from_json(br#"{"guess": "55"}"#).unwrap();
        assert_eq!(req.guess, 55);
    }

    #[test]
    fn test_out_of_range_values_still_parse() {
        assert_eq!(GuessRequest::from_json(br#"{"guess": 0}"#).unwrap().guess, 0);
        assert_eq!(GuessRequest::from_json(br#"{"guess": 101}"#).unwrap().guess, 101);
        assert_eq!(GuessRequest::from_json(br#"{"guess": -3}"#).unwrap().guess, -3);
    }

    #[test]
    fn test_rejects_bad_bodies() {
        assert!(matches!(
            GuessRequest::from_json(b""),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            GuessRequest::from_json(b"{guess: 4"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            GuessRequest::from_json(b"[42]"),
            Err(ProtocolError::NotAnObject)
        ));
        assert!(matches!(
            GuessRequest::from_json(b"null"),
            Err(ProtocolError::MissingGuess)
        ));
        assert!(matches!(
            GuessRequest::from_json(b"{}"),
            Err(ProtocolError::MissingGuess)
        ));
        assert!(matches!(
            GuessRequest::from_json(br#"{"guess": null}"#),
            Err(ProtocolError::MissingGuess)
        ));
        assert!(matches!(
            GuessRequest::from_json(br#"{"guess": 4.5}"#),
            Err(ProtocolError::NotAnInteger)
        ));
        assert!(matches!(
            GuessRequest::from_json(br#"{"guess": "abc"}"#),
            Err(ProtocolError::NotAnInteger)
        ));
        assert!(matches!(
            GuessRequest::from_json(br#"{"guess": true}"#),
            Err(ProtocolError::NotAnInteger)
        ));
    }

    #[test]
    fn test_guess_response_shape() {
        let body = to_json(&GuessResponse {
            result: GuessOutcome::Low,
            attempts_left: 4,
            correct_number: None,
        })
        .unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value,
            json!({ "result": "low", "attemptsLeft": 4, "correctNumber": null })
        );
    }

    #[test]
    fn test_guess_response_from_result() {
        let resp = GuessResponse::from(GuessResult {
            outcome: GuessOutcome::GameOver,
            attempts_remaining: 0,
            revealed_secret: Some(50),
        });
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            json!({ "result": "GAME OVER", "attemptsLeft": 0, "correctNumber": 50 })
        );
    }

    #[test]
    fn test_restart_response_shape() {
        let value = serde_json::to_value(RestartResponse::new(17)).unwrap();
        assert_eq!(
            value,
            json!({ "message": "Game restarted!", "secretNumber": 17 })
        );
    }
}
