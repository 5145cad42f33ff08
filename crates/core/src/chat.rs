//! Chat configuration.

use nlm_protocol::params::chat::{ChatGoal, ConfigureChat, ResponseLength};

use crate::client::NotebookClient;
use crate::path::Walk;
use crate::types::ChatSettings;
use crate::Result;

impl NotebookClient {
	/// Sets a notebook's chat goal and answer length.
	pub async fn configure_chat(
		&self,
		notebook_id: &str,
		goal: &ChatGoal,
		length: ResponseLength,
	) -> Result<ChatSettings> {
		let result = self
			.rpc()
			.execute(&ConfigureChat {
				notebook_id,
				goal,
				length,
			})
			.await?;
		Ok(ChatSettings {
			notebook_id: notebook_id.to_string(),
			goal: goal.name().to_string(),
			custom_prompt: goal.custom_prompt().map(str::to_string),
			response_length: length.name().to_string(),
			raw_settings: result.at(&[7]).filter(|v| !v.is_null()).cloned(),
		})
	}
}
