//! Parameters of the streaming question endpoint.

use serde_json::{Value, json};

use crate::positional::{Positional, Slot, slot};

/// `[[[[sid]]]..., question, null, [2, null, [1]], conversation_id]`
///
/// Sent unbatched as `f.req=[null, params_json]`.
#[derive(Debug, Clone)]
pub struct StreamQuery<'a> {
	pub source_ids: &'a [String],
	pub question: &'a str,
	pub conversation_id: &'a str,
}

impl StreamQuery<'_> {
	pub fn params(&self) -> Value {
		let sources: Vec<Value> = self.source_ids.iter().map(|id| json!([[[id]]])).collect();
		Positional([
			slot(sources),
			slot(self.question),
			Slot::Absent,
			slot(json!([2, null, [1]])),
			slot(self.conversation_id),
		])
		.into_value()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn query_shape() {
		let ids = vec!["s1".to_string(), "s2".to_string()];
		let params = StreamQuery {
			source_ids: &ids,
			question: "why?",
			conversation_id: "c-1",
		}
		.params();
		assert_eq!(
			params,
			json!([[[[["s1"]]], [[["s2"]]]], "why?", null, [2, null, [1]], "c-1"])
		);
	}

	#[test]
	fn no_sources_is_empty_list() {
		let params = StreamQuery {
			source_ids: &[],
			question: "q",
			conversation_id: "c",
		}
		.params();
		assert_eq!(params[0], json!([]));
	}
}
