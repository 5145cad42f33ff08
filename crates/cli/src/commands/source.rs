use nlm::SourceInput;
use serde_json::{Value, json};

use super::{CommandContext, to_data};
use crate::cli::{AddSourceArgs, SourceAction};
use crate::error::{CliError, Result};

const DEFAULT_TEXT_TITLE: &str = "Pasted Text";
const DEFAULT_DRIVE_TITLE: &str = "Drive Document";

pub async fn run(action: SourceAction, ctx: &CommandContext) -> Result<Value> {
	let client = ctx.client()?;
	match action {
		SourceAction::Add(args) => {
			let input = source_input(&args)?;
			to_data(&client.add_source(&args.notebook_id, input).await?)
		}
		SourceAction::Freshness { source_id } => {
			let fresh = client.check_freshness(&source_id).await?;
			Ok(json!({ "source_id": source_id, "fresh": fresh }))
		}
		SourceAction::Sync { source_id } => to_data(&client.sync_drive_source(&source_id).await?),
	}
}

fn source_input(args: &AddSourceArgs) -> Result<SourceInput<'_>> {
	let title = args.title.as_deref();
	if let Some(url) = args.url.as_deref() {
		return Ok(SourceInput::Url(url));
	}
	if let Some(content) = args.text.as_deref() {
		return Ok(SourceInput::Text {
			title: title.unwrap_or(DEFAULT_TEXT_TITLE),
			content,
		});
	}
	if let Some(document_id) = args.drive.as_deref() {
		return Ok(SourceInput::Drive {
			document_id,
			mime_type: args.mime_type.as_str(),
			title: title.unwrap_or(DEFAULT_DRIVE_TITLE),
		});
	}
	Err(CliError::Input("one of --url, --text or --drive is required".into()))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn args() -> AddSourceArgs {
		AddSourceArgs {
			notebook_id: "nb".into(),
			url: None,
			text: None,
			drive: None,
			title: None,
			mime_type: nlm::mime::GOOGLE_DOC.into(),
		}
	}

	#[test]
	fn text_source_gets_a_default_title() {
		let args = AddSourceArgs {
			text: Some("notes".into()),
			..args()
		};
		assert_eq!(
			source_input(&args).unwrap(),
			SourceInput::Text {
				title: DEFAULT_TEXT_TITLE,
				content: "notes"
			}
		);
	}

	#[test]
	fn drive_source_keeps_mime_type() {
		let args = AddSourceArgs {
			drive: Some("doc-1".into()),
			title: Some("Plan".into()),
			mime_type: nlm::mime::PDF.into(),
			..args()
		};
		assert_eq!(
			source_input(&args).unwrap(),
			SourceInput::Drive {
				document_id: "doc-1",
				mime_type: nlm::mime::PDF,
				title: "Plan"
			}
		);
	}

	#[test]
	fn no_content_is_rejected() {
		assert!(matches!(source_input(&args()), Err(CliError::Input(_))));
	}
}
