//! Error types for the notebook runtime.

use std::time::Duration;

use nlm_protocol::{DecodeError, SchemaError};
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by sessions, calls, streams and pollers.
#[derive(Debug, Error)]
pub enum Error {
	/// Network failure, timeout or connection reset.
	#[error("Transport error: {0}")]
	Transport(String),

	/// Credentials are missing, expired or rejected.
	#[error("Authentication failed: {0}")]
	Auth(String),

	/// The response did not have the expected shape.
	#[error("Protocol error: {0}")]
	Protocol(String),

	/// The service asked us to slow down.
	#[error("Rate limited: {0}")]
	RateLimit(String),

	/// A polled task did not reach a terminal state in time.
	#[error("Task still running after {:.1}s ({attempts} checks)", elapsed.as_secs_f64())]
	PollTimeout { elapsed: Duration, attempts: u32 },

	/// Caller-side validation failed before any request was made.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	pub fn is_auth(&self) -> bool {
		matches!(self, Error::Auth(_))
	}

	pub fn is_rate_limited(&self) -> bool {
		matches!(self, Error::RateLimit(_))
	}

	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::PollTimeout { .. })
	}

	/// Whether repeating the same operation later may succeed without any
	/// change on the caller's side.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Error::Transport(_) | Error::PollTimeout { .. })
	}
}

impl From<DecodeError> for Error {
	fn from(err: DecodeError) -> Self {
		Error::Protocol(err.to_string())
	}
}

impl From<SchemaError> for Error {
	fn from(err: SchemaError) -> Self {
		Error::InvalidArgument(err.to_string())
	}
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			Error::Transport(format!("request timed out: {err}"))
		} else {
			Error::Transport(err.to_string())
		}
	}
}
