//! Decode errors for the batchexecute wire format.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Failure to interpret a response body.
///
/// Every variant means the remote protocol no longer looks the way this crate
/// expects. Callers surface these as protocol errors and never retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
	/// Response did not start with the `)]}'` anti-forgery prefix.
	#[error("response is missing the anti-forgery prefix")]
	MissingPrefix,

	/// A frame header was not a decimal byte count.
	#[error("invalid frame header at byte {offset}: {header:?}")]
	InvalidHeader { offset: usize, header: String },

	/// A frame header declared more UTF-16 code units than the body contains.
	#[error("frame at byte {offset} declares {declared} code units but only {available} remain")]
	Truncated {
		offset: usize,
		declared: usize,
		available: usize,
	},

	/// A frame payload was not valid JSON.
	#[error("frame at byte {offset} is not valid JSON: {message}")]
	InvalidJson { offset: usize, message: String },

	/// A frame parsed but was not a JSON array.
	#[error("frame at byte {offset} is not a JSON array")]
	NotAnArray { offset: usize },

	/// A frame payload was not UTF-8.
	#[error("frame at byte {offset} is not valid UTF-8")]
	InvalidUtf8 { offset: usize },
}

/// A parameter value the service would reject, caught before any request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
	/// A named option was not one of the accepted spellings.
	#[error("invalid {field} '{value}', expected one of: {expected}")]
	UnknownOption {
		field: &'static str,
		value: String,
		expected: String,
	},

	/// A free-text field exceeded its character limit.
	#[error("{field} exceeds {max} characters (got {actual})")]
	TooLong {
		field: &'static str,
		max: usize,
		actual: usize,
	},

	/// A required field was empty.
	#[error("{0} must not be empty")]
	Empty(&'static str),

	/// The combination of options is not supported by the service.
	#[error("{0}")]
	Unsupported(String),
}
