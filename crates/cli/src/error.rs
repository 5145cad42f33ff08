use std::path::PathBuf;

use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	/// Caller input rejected before anything was sent.
	#[error("{0}")]
	Input(String),

	#[error("invalid config file {path}: {message}")]
	Config { path: PathBuf, message: String },

	#[error(transparent)]
	Notebook(#[from] nlm::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl CliError {
	/// Converts this error to a [`CommandError`] for structured output.
	pub fn to_command_error(&self) -> CommandError {
		let (code, details) = match self {
			CliError::Input(_) => (ErrorCode::InvalidInput, None),
			CliError::Config { path, .. } => (ErrorCode::InvalidInput, Some(serde_json::json!({ "path": path }))),
			CliError::Notebook(err) => classify(err),
			CliError::Io(_) => (ErrorCode::IoError, None),
			CliError::Anyhow(err) if err.downcast_ref::<std::io::Error>().is_some() => (ErrorCode::IoError, None),
			CliError::Json(_) | CliError::Anyhow(_) => (ErrorCode::InternalError, None),
		};

		CommandError {
			code,
			message: self.to_string(),
			details,
		}
	}
}

fn classify(err: &nlm::Error) -> (ErrorCode, Option<serde_json::Value>) {
	match err {
		nlm::Error::Auth(_) => (ErrorCode::AuthError, None),
		nlm::Error::RateLimit(_) => (ErrorCode::RateLimited, None),
		nlm::Error::Protocol(_) => (ErrorCode::ProtocolError, None),
		nlm::Error::Transport(_) => (ErrorCode::TransportError, None),
		nlm::Error::PollTimeout { elapsed, attempts } => (
			ErrorCode::PollTimeout,
			Some(serde_json::json!({ "elapsed_secs": elapsed.as_secs_f64(), "attempts": attempts })),
		),
		nlm::Error::InvalidArgument(_) => (ErrorCode::InvalidInput, None),
		nlm::Error::Io(_) => (ErrorCode::IoError, None),
		nlm::Error::Json(_) => (ErrorCode::InternalError, None),
	}
}
