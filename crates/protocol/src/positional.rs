//! Fixed-arity positional parameter arrays.
//!
//! The service's parameters are untyped, position-significant arrays where
//! unused positions must still be sent as `null`. [`Positional`] carries the
//! arity in its type so a schema can never silently gain or lose a slot, and
//! [`Slot::Absent`] marks positions that are intentionally empty.

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;

/// One position in a parameter array.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot {
	/// Intentionally empty position, encoded as `null`.
	#[default]
	Absent,
	Value(Value),
}

impl Slot {
	pub fn into_value(self) -> Value {
		match self {
			Slot::Absent => Value::Null,
			Slot::Value(v) => v,
		}
	}
}

/// Wraps any JSON-convertible value as a present slot.
pub fn slot(value: impl Into<Value>) -> Slot {
	Slot::Value(value.into())
}

/// A parameter array with exactly `N` positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Positional<const N: usize>(pub [Slot; N]);

impl<const N: usize> Positional<N> {
	/// Array of `N` absent slots.
	pub fn empty() -> Self {
		Self(std::array::from_fn(|_| Slot::Absent))
	}

	/// Sets the slot at `index`; panics on out-of-range indices, which are
	/// schema bugs rather than runtime conditions.
	pub fn with(mut self, index: usize, value: impl Into<Value>) -> Self {
		self.0[index] = slot(value);
		self
	}

	pub fn into_value(self) -> Value {
		Value::Array(self.0.into_iter().map(Slot::into_value).collect())
	}
}

impl<const N: usize> From<Positional<N>> for Value {
	fn from(p: Positional<N>) -> Self {
		p.into_value()
	}
}

impl<const N: usize> Serialize for Positional<N> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut seq = serializer.serialize_seq(Some(N))?;
		for slot in &self.0 {
			match slot {
				Slot::Absent => seq.serialize_element(&Value::Null)?,
				Slot::Value(v) => seq.serialize_element(v)?,
			}
		}
		seq.end()
	}
}
