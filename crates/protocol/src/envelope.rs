//! Locating an RPC's result inside decoded response entries.
//!
//! A decoded batched response is a flat list of entries. The one carrying the
//! result of a call looks like:
//!
//! ```text
//! ["wrb.fr", "wXbhsf", "<payload json>", null, null, null, "generic"]
//! ```
//!
//! When the call failed remotely the payload is `null` and a status array
//! such as `[16]` sits at index 5. Codes follow gRPC numbering.

use serde_json::Value;

const RESULT_TAG: &str = "wrb.fr";
const ERROR_TAG: &str = "er";

/// gRPC `PERMISSION_DENIED`.
pub const STATUS_PERMISSION_DENIED: i64 = 7;
/// gRPC `RESOURCE_EXHAUSTED`.
pub const STATUS_RESOURCE_EXHAUSTED: i64 = 8;
/// gRPC `UNAUTHENTICATED`.
pub const STATUS_UNAUTHENTICATED: i64 = 16;

/// Outcome of looking up one RPC id in a response.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
	/// The call returned a payload (parsed JSON, or the raw string when the
	/// payload is not JSON).
	Payload(Value),
	/// The call failed with a status code.
	Status(i64),
	/// An `er` entry was present; the raw entry is kept for diagnostics.
	ServerError(Value),
	/// No entry mentions the RPC id.
	Missing,
}

/// Classification of a remote status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
	Unauthenticated,
	RateLimited,
	Other,
}

impl StatusClass {
	pub fn of(code: i64) -> Self {
		match code {
			STATUS_UNAUTHENTICATED | STATUS_PERMISSION_DENIED => Self::Unauthenticated,
			STATUS_RESOURCE_EXHAUSTED => Self::RateLimited,
			_ => Self::Other,
		}
	}
}

/// Finds the outcome for `rpc_id` among decoded entries.
///
/// Entries may be nested one level deeper than expected when a frame wraps
/// its entries in an extra array; both layouts are searched.
pub fn find_rpc_result(entries: &[Value], rpc_id: &str) -> RpcOutcome {
	let mut server_error = None;

	for entry in flatten(entries) {
		let Some(items) = entry.as_array() else { continue };
		match items.first().and_then(Value::as_str) {
			Some(RESULT_TAG) if items.get(1).and_then(Value::as_str) == Some(rpc_id) => {
				return result_outcome(items);
			}
			Some(ERROR_TAG) => {
				server_error.get_or_insert_with(|| entry.clone());
			}
			_ => {}
		}
	}

	server_error.map_or(RpcOutcome::Missing, RpcOutcome::ServerError)
}

/// Returns the payloads of every `wrb.fr` entry in a frame, regardless of id.
///
/// The streaming query endpoint tags its entries with a null id.
pub fn result_payloads(frame: &Value) -> Vec<RpcOutcome> {
	let entries = match frame.as_array() {
		Some(entries) => entries.as_slice(),
		None => return Vec::new(),
	};
	flatten(entries)
		.filter_map(|entry| {
			let items = entry.as_array()?;
			(items.first().and_then(Value::as_str) == Some(RESULT_TAG)).then(|| result_outcome(items))
		})
		.collect()
}

fn flatten(entries: &[Value]) -> impl Iterator<Item = &Value> {
	entries.iter().flat_map(|entry| {
		let nested = entry
			.as_array()
			.filter(|items| items.first().is_some_and(Value::is_array))
			.map(|items| items.iter().collect::<Vec<_>>());
		nested.unwrap_or_else(|| vec![entry])
	})
}

fn result_outcome(items: &[Value]) -> RpcOutcome {
	match items.get(2) {
		Some(Value::String(raw)) => {
			RpcOutcome::Payload(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone())))
		}
		Some(Value::Null) | None => match status_code(items) {
			Some(code) => RpcOutcome::Status(code),
			None => RpcOutcome::Payload(Value::Null),
		},
		Some(other) => RpcOutcome::Payload(other.clone()),
	}
}

fn status_code(items: &[Value]) -> Option<i64> {
	items.get(5)?.as_array()?.first()?.as_i64()
}
