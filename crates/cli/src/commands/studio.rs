use nlm::{NotebookClient, StudioCommon, StudioOptions};
use serde_json::{Value, json};

use super::{CommandContext, require_confirm, to_data};
use crate::cli::{StudioAction, StudioTarget};
use crate::error::{CliError, Result};

pub async fn run(action: StudioAction, ctx: &CommandContext) -> Result<Value> {
	let client = ctx.client()?;
	match action {
		StudioAction::Audio { target, format, length } => {
			create(&client, target, StudioOptions::Audio { format, length }).await
		}
		StudioAction::Video { target, format, style } => {
			create(&client, target, StudioOptions::Video { format, style }).await
		}
		StudioAction::Status { notebook_id } => to_data(&client.studio_status(&notebook_id).await?),
		StudioAction::Wait {
			notebook_id,
			artifact_id,
			poll,
		} => {
			let options = ctx.config.poll_options(&poll);
			match client.wait_for_studio(&notebook_id, &artifact_id, options).await? {
				Some(artifact) => to_data(&artifact),
				None => Err(CliError::Input(format!(
					"artifact {artifact_id} does not exist in notebook {notebook_id}"
				))),
			}
		}
		StudioAction::Delete { artifact_id, confirm } => {
			require_confirm(confirm, &format!("artifact {artifact_id}"))?;
			client.delete_studio(&artifact_id).await?;
			Ok(json!({ "artifact_id": artifact_id, "deleted": true }))
		}
	}
}

async fn create(client: &NotebookClient, target: StudioTarget, options: StudioOptions) -> Result<Value> {
	let source_ids = if target.source_ids.is_empty() {
		client.source_ids(&target.notebook_id).await?
	} else {
		target.source_ids
	};
	if source_ids.is_empty() {
		return Err(CliError::Input(format!(
			"notebook {} has no sources to build an overview from",
			target.notebook_id
		)));
	}
	let language = target
		.language
		.unwrap_or_else(|| client.session().config().language.clone());

	let created = client
		.create_studio(
			StudioCommon {
				notebook_id: &target.notebook_id,
				source_ids: &source_ids,
				language: &language,
				focus_prompt: &target.focus,
			},
			options,
		)
		.await?;
	to_data(&created)
}
