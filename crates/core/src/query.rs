//! Questions answered from a notebook's sources.

use nlm_runtime::{QueryAnswer, QueryRequest, QueryStream};
use tracing::debug;

use crate::client::NotebookClient;
use crate::Result;

/// A question and the context it is asked in.
#[derive(Debug, Clone, Default)]
pub struct Question {
	pub notebook_id: String,
	pub text: String,
	/// Sources to consult; `None` uses every source in the notebook.
	pub source_ids: Option<Vec<String>>,
	/// Continues an earlier conversation.
	pub conversation_id: Option<String>,
}

impl Question {
	pub fn new(notebook_id: impl Into<String>, text: impl Into<String>) -> Self {
		Self {
			notebook_id: notebook_id.into(),
			text: text.into(),
			..Self::default()
		}
	}
}

impl NotebookClient {
	/// Streams the answer to a question as it is generated.
	pub async fn query(&self, question: Question) -> Result<QueryStream> {
		let source_ids = match question.source_ids {
			Some(ids) => ids,
			None => self.source_ids(&question.notebook_id).await?,
		};
		debug!(target = "nlm", notebook = %question.notebook_id, sources = source_ids.len(), "asking question");
		self.stream()
			.query(QueryRequest {
				source_ids,
				question: question.text,
				conversation_id: question.conversation_id,
			})
			.await
	}

	/// Asks a question and waits for the complete answer.
	pub async fn ask(&self, question: Question) -> Result<QueryAnswer> {
		QueryAnswer::collect(self.query(question).await?).await
	}
}
