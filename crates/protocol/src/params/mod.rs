//! Typed parameter schemas, one per RPC.
//!
//! Each schema implements [`RpcRequest`](crate::rpc::RpcRequest) and builds
//! its wire array through [`Positional`](crate::positional::Positional), so
//! the arity of every array is fixed by its type.

use serde_json::{Value, json};

use crate::positional::Positional;

pub mod chat;
pub mod notebook;
pub mod query;
pub mod research;
pub mod source;
pub mod studio;

/// Declares a closed set of options that travel as integer codes and are
/// spelled as snake_case names by callers.
macro_rules! coded_enum {
	(
		$(#[$meta:meta])*
		$vis:vis enum $name:ident ($field:literal) {
			$(
				$(#[$vmeta:meta])*
				$variant:ident = $code:literal => $label:literal
			),+ $(,)?
		}
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
		$vis enum $name {
			$( $(#[$vmeta])* $variant ),+
		}

		impl $name {
			pub const ALL: &'static [Self] = &[$(Self::$variant),+];

			pub const fn code(self) -> i64 {
				match self {
					$(Self::$variant => $code),+
				}
			}

			pub const fn name(self) -> &'static str {
				match self {
					$(Self::$variant => $label),+
				}
			}

			pub fn from_code(code: i64) -> Option<Self> {
				Self::ALL.iter().copied().find(|v| v.code() == code)
			}
		}

		impl ::std::str::FromStr for $name {
			type Err = $crate::error::SchemaError;

			fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
				let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
				Self::ALL.iter().copied().find(|v| v.name() == wanted).ok_or_else(|| {
					$crate::error::SchemaError::UnknownOption {
						field: $field,
						value: s.to_string(),
						expected: Self::ALL.iter().map(|v| v.name()).collect::<Vec<_>>().join(", "),
					}
				})
			}
		}

		impl ::std::fmt::Display for $name {
			fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
				f.write_str(self.name())
			}
		}

		impl ::serde::Serialize for $name {
			fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
				serializer.serialize_str(self.name())
			}
		}
	};
}

pub(crate) use coded_enum;

/// Project marker that accompanies most notebook-level calls.
pub(crate) fn project_marker() -> Value {
	json!([2])
}

/// Client settings block `[1, null x9, [1]]` sent on create and add calls.
pub(crate) fn client_settings() -> Value {
	Positional::<11>::empty().with(0, 1).with(10, json!([1])).into_value()
}

/// Source ids as `[[[id]], ...]`.
pub(crate) fn nested_ids(ids: &[String]) -> Value {
	Value::Array(ids.iter().map(|id| json!([[id]])).collect())
}

/// Source ids as `[[id], ...]`.
pub(crate) fn simple_ids(ids: &[String]) -> Value {
	Value::Array(ids.iter().map(|id| json!([id])).collect())
}
