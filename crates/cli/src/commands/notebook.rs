use serde_json::{Value, json};

use super::{CommandContext, require_confirm, to_data};
use crate::cli::NotebookAction;
use crate::error::Result;

pub async fn run(action: NotebookAction, ctx: &CommandContext) -> Result<Value> {
	let client = ctx.client()?;
	match action {
		NotebookAction::List => to_data(&client.list_notebooks().await?),
		NotebookAction::Get { notebook_id } => to_data(&client.get_notebook(&notebook_id).await?),
		NotebookAction::Create { title } => to_data(&client.create_notebook(&title).await?),
		NotebookAction::Rename { notebook_id, title } => {
			client.rename_notebook(&notebook_id, &title).await?;
			Ok(json!({ "notebook_id": notebook_id, "title": title }))
		}
		NotebookAction::Delete { notebook_id, confirm } => {
			require_confirm(confirm, &format!("notebook {notebook_id}"))?;
			client.delete_notebook(&notebook_id).await?;
			Ok(json!({ "notebook_id": notebook_id, "deleted": true }))
		}
	}
}
