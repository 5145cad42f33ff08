use futures_util::StreamExt;
use nlm::{QueryAnswer, Question};
use serde_json::{Value, json};

use super::{CommandContext, to_data};
use crate::cli::QueryArgs;
use crate::error::Result;
use crate::output::print_event;

pub async fn run(args: QueryArgs, ctx: &CommandContext) -> Result<Value> {
	let client = ctx.client()?;
	let question = Question {
		notebook_id: args.notebook_id,
		text: args.question,
		source_ids: (!args.source_ids.is_empty()).then_some(args.source_ids),
		conversation_id: args.conversation,
	};

	let mut stream = client.query(question).await?;
	if !args.stream {
		return to_data(&QueryAnswer::collect(stream).await?);
	}

	let conversation_id = stream.conversation_id().to_string();
	let mut events = 0usize;
	while let Some(event) = stream.next().await {
		print_event(&event?, ctx.format);
		events += 1;
	}
	Ok(json!({ "conversation_id": conversation_id, "events": events }))
}
