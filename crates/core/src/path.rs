//! Positional lookups into decoded payloads.
//!
//! Service responses are untyped nested arrays whose layout shifts between
//! releases, so every read is optional and a wrong type reads as absent.

use serde_json::Value;

use crate::{Error, Result};

pub(crate) trait Walk {
	/// Value at a path of array indices.
	fn at(&self, path: &[usize]) -> Option<&Value>;

	fn str_at(&self, path: &[usize]) -> Option<&str> {
		self.at(path).and_then(Value::as_str)
	}

	fn i64_at(&self, path: &[usize]) -> Option<i64> {
		self.at(path).and_then(Value::as_i64)
	}

	fn list_at(&self, path: &[usize]) -> Option<&[Value]> {
		self.at(path).and_then(Value::as_array).map(Vec::as_slice)
	}
}

impl Walk for Value {
	fn at(&self, path: &[usize]) -> Option<&Value> {
		path.iter().try_fold(self, |value, &index| value.as_array()?.get(index))
	}
}

impl Walk for [Value] {
	fn at(&self, path: &[usize]) -> Option<&Value> {
		let (first, rest) = path.split_first()?;
		self.get(*first)?.at(rest)
	}
}

/// Unwraps one level of nesting when the first element is itself a list of
/// lists, as some listings arrive wrapped in an extra array.
pub(crate) fn unwrap_nested(items: &[Value]) -> &[Value] {
	match items.first().and_then(Value::as_array) {
		Some(inner) if inner.first().is_some_and(Value::is_array) => inner,
		_ => items,
	}
}

/// Error for a payload that lacks a field the operation needs.
pub(crate) fn shape_error(operation: &str, what: &str) -> Error {
	Error::Protocol(format!("{operation}: unexpected response shape, missing {what}"))
}

pub(crate) fn require<T>(value: Option<T>, operation: &str, what: &str) -> Result<T> {
	value.ok_or_else(|| shape_error(operation, what))
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn walks_nested_indices() {
		let value = json!([["a", [1, 2, ["deep"]]]]);
		assert_eq!(value.str_at(&[0, 0]), Some("a"));
		assert_eq!(value.i64_at(&[0, 1, 1]), Some(2));
		assert_eq!(value.str_at(&[0, 1, 2, 0]), Some("deep"));
		assert_eq!(value.at(&[]), Some(&value));
	}

	#[test]
	fn wrong_type_or_index_is_absent() {
		let value = json!([["a"], null]);
		assert_eq!(value.at(&[5]), None);
		assert_eq!(value.at(&[1, 0]), None);
		assert_eq!(value.i64_at(&[0, 0]), None);
		assert_eq!(value.str_at(&[0, 0, 0]), None);
	}

	#[test]
	fn slices_walk_like_values() {
		let items = vec![json!(["x", [7]])];
		assert_eq!(items.as_slice().i64_at(&[0, 1, 0]), Some(7));
		assert_eq!(items.as_slice().at(&[]), None);
	}

	#[test]
	fn unwraps_only_lists_of_lists() {
		let wrapped = vec![json!([["a"], ["b"]])];
		assert_eq!(unwrap_nested(&wrapped).len(), 2);

		let flat = vec![json!(["id", "title"]), json!(["id2", "title2"])];
		assert_eq!(unwrap_nested(&flat).len(), 2);
		assert_eq!(unwrap_nested(&flat)[0], json!(["id", "title"]));
	}
}
