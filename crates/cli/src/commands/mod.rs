//! Command dispatch.
//!
//! Each command module turns its arguments into one client call and returns
//! the JSON data for the result envelope; printing happens here.

mod auth;
mod chat;
mod notebook;
mod query;
mod research;
mod source;
mod studio;

use nlm::{Credentials, NotebookClient, SessionStore};
use serde::Serialize;

use crate::cli::{
	AuthAction, ChatAction, Cli, Commands, NotebookAction, ResearchAction, SourceAction, StudioAction,
};
use crate::config::CliConfig;
use crate::error::Result;
use crate::output::{OutputFormat, ResultBuilder, print_result};

/// Settings every command runs with.
pub struct CommandContext {
	pub config: CliConfig,
	pub format: OutputFormat,
}

impl CommandContext {
	/// Client with credentials from the environment or the credential file.
	pub fn client(&self) -> Result<NotebookClient> {
		let store = SessionStore::at_default_location()?;
		Ok(NotebookClient::connect(
			self.config.client_config()?,
			Credentials::from_env_or(store),
		)?)
	}

	/// Client bound to the credential file only, for commands that manage it.
	pub fn stored_client(&self) -> Result<(NotebookClient, SessionStore)> {
		let store = SessionStore::at_default_location()?;
		let client = NotebookClient::connect(self.config.client_config()?, Credentials::Store(store.clone()))?;
		Ok((client, store))
	}
}

/// Dotted name reported in the result envelope.
pub fn command_name(command: &Commands) -> &'static str {
	match command {
		Commands::Auth { action } => match action {
			AuthAction::Save { .. } => "auth.save",
			AuthAction::Status => "auth.status",
			AuthAction::Refresh => "auth.refresh",
		},
		Commands::Notebook { action } => match action {
			NotebookAction::List => "notebook.list",
			NotebookAction::Get { .. } => "notebook.get",
			NotebookAction::Create { .. } => "notebook.create",
			NotebookAction::Rename { .. } => "notebook.rename",
			NotebookAction::Delete { .. } => "notebook.delete",
		},
		Commands::Source { action } => match action {
			SourceAction::Add(_) => "source.add",
			SourceAction::Freshness { .. } => "source.freshness",
			SourceAction::Sync { .. } => "source.sync",
		},
		Commands::Chat {
			action: ChatAction::Configure { .. },
		} => "chat.configure",
		Commands::Query(_) => "query",
		Commands::Research { action } => match action {
			ResearchAction::Start { .. } => "research.start",
			ResearchAction::Status { .. } => "research.status",
			ResearchAction::Wait { .. } => "research.wait",
			ResearchAction::Import { .. } => "research.import",
		},
		Commands::Studio { action } => match action {
			StudioAction::Audio { .. } => "studio.audio",
			StudioAction::Video { .. } => "studio.video",
			StudioAction::Status { .. } => "studio.status",
			StudioAction::Wait { .. } => "studio.wait",
			StudioAction::Delete { .. } => "studio.delete",
		},
	}
}

pub async fn dispatch(cli: Cli) -> Result<()> {
	let start = std::time::Instant::now();
	let name = command_name(&cli.command);
	let ctx = CommandContext {
		config: CliConfig::load(cli.config.as_deref())?,
		format: cli.format,
	};

	let data = match cli.command {
		Commands::Auth { action } => auth::run(action, &ctx).await?,
		Commands::Notebook { action } => notebook::run(action, &ctx).await?,
		Commands::Source { action } => source::run(action, &ctx).await?,
		Commands::Chat { action } => chat::run(action, &ctx).await?,
		Commands::Query(args) => query::run(args, &ctx).await?,
		Commands::Research { action } => research::run(action, &ctx).await?,
		Commands::Studio { action } => studio::run(action, &ctx).await?,
	};

	let result = ResultBuilder::new(name).started_at(start).data(data).build();
	print_result(&result, ctx.format);
	Ok(())
}

/// Serializes command data for the envelope.
pub(crate) fn to_data<T: Serialize>(value: &T) -> Result<serde_json::Value> {
	Ok(serde_json::to_value(value)?)
}

/// Rejects irreversible commands without `--confirm`.
pub(crate) fn require_confirm(confirm: bool, what: &str) -> Result<()> {
	if confirm {
		Ok(())
	} else {
		Err(crate::error::CliError::Input(format!(
			"deleting {what} is irreversible; pass --confirm to proceed"
		)))
	}
}
