use nlm::ChatGoal;
use serde_json::Value;

use super::{CommandContext, to_data};
use crate::cli::ChatAction;
use crate::error::Result;

pub async fn run(action: ChatAction, ctx: &CommandContext) -> Result<Value> {
	match action {
		ChatAction::Configure {
			notebook_id,
			goal,
			prompt,
			length,
		} => {
			// Validated before connecting so bad input never needs credentials.
			let goal = ChatGoal::parse(&goal, prompt.as_deref()).map_err(nlm::Error::from)?;
			let client = ctx.client()?;
			to_data(&client.configure_chat(&notebook_id, &goal, length).await?)
		}
	}
}
