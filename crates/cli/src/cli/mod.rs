#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Args, Parser, Subcommand};
use nlm::{AudioFormat, AudioLength, ResearchMode, ResearchSource, ResponseLength, VideoFormat, VideoStyle};

use crate::output::OutputFormat;

/// Command-line client for NotebookLM.
#[derive(Parser, Debug)]
#[command(name = "nlm")]
#[command(about = "NotebookLM client - notebooks, sources, research and overviews from the terminal")]
#[command(version)]
#[command(styles = help_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: json (default), ndjson, or text
	#[arg(short = 'f', long, global = true, value_enum, default_value = "json")]
	pub format: OutputFormat,

	/// Configuration file (default: $XDG_CONFIG_HOME/nlm/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Manage stored credentials.
	Auth {
		#[command(subcommand)]
		action: AuthAction,
	},
	/// List, inspect and edit notebooks.
	#[command(alias = "nb")]
	Notebook {
		#[command(subcommand)]
		action: NotebookAction,
	},
	/// Add and synchronise notebook sources.
	Source {
		#[command(subcommand)]
		action: SourceAction,
	},
	/// Configure how a notebook's chat answers.
	Chat {
		#[command(subcommand)]
		action: ChatAction,
	},
	/// Ask a question about a notebook's sources.
	Query(QueryArgs),
	/// Discover new sources on the web or in Drive.
	Research {
		#[command(subcommand)]
		action: ResearchAction,
	},
	/// Generate audio and video overviews.
	Studio {
		#[command(subcommand)]
		action: StudioAction,
	},
}

#[derive(Subcommand, Debug, Clone)]
pub enum AuthAction {
	/// Store cookies copied from a signed-in browser.
	Save {
		/// Raw `Cookie` header; read from stdin when omitted.
		#[arg(long, value_name = "HEADER")]
		cookies: Option<String>,
	},
	/// Show where credentials come from and whether they are complete.
	Status,
	/// Fetch fresh tokens for the stored cookies.
	Refresh,
}

#[derive(Subcommand, Debug, Clone)]
pub enum NotebookAction {
	List,
	Get {
		#[arg(value_name = "NOTEBOOK")]
		notebook_id: String,
	},
	Create {
		#[arg(value_name = "TITLE", default_value = "")]
		title: String,
	},
	Rename {
		#[arg(value_name = "NOTEBOOK")]
		notebook_id: String,
		#[arg(value_name = "TITLE")]
		title: String,
	},
	/// Delete a notebook. Irreversible.
	Delete {
		#[arg(value_name = "NOTEBOOK")]
		notebook_id: String,
		/// Required acknowledgement that the notebook is gone for good.
		#[arg(long)]
		confirm: bool,
	},
}

#[derive(Subcommand, Debug, Clone)]
pub enum SourceAction {
	/// Add a web page, pasted text or Drive document.
	Add(AddSourceArgs),
	/// Check whether a Drive source matches its document.
	Freshness {
		#[arg(value_name = "SOURCE")]
		source_id: String,
	},
	/// Pull the latest content of a Drive source.
	Sync {
		#[arg(value_name = "SOURCE")]
		source_id: String,
	},
}

#[derive(Args, Debug, Clone)]
#[command(group(clap::ArgGroup::new("content").required(true).args(["url", "text", "drive"])))]
pub struct AddSourceArgs {
	#[arg(value_name = "NOTEBOOK")]
	pub notebook_id: String,

	/// Web page or YouTube URL.
	#[arg(long)]
	pub url: Option<String>,

	/// Pasted text content.
	#[arg(long)]
	pub text: Option<String>,

	/// Drive document id.
	#[arg(long, value_name = "DOCUMENT_ID")]
	pub drive: Option<String>,

	/// Title for text and Drive sources.
	#[arg(long)]
	pub title: Option<String>,

	/// MIME type of the Drive document.
	#[arg(long, default_value = nlm::mime::GOOGLE_DOC)]
	pub mime_type: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ChatAction {
	Configure {
		#[arg(value_name = "NOTEBOOK")]
		notebook_id: String,
		/// default, learning_guide or custom
		#[arg(long, default_value = "default")]
		goal: String,
		/// Instructions for the custom goal.
		#[arg(long)]
		prompt: Option<String>,
		/// default, longer or shorter
		#[arg(long, default_value = "default")]
		length: ResponseLength,
	},
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
	#[arg(value_name = "NOTEBOOK")]
	pub notebook_id: String,

	#[arg(value_name = "QUESTION")]
	pub question: String,

	/// Restrict the answer to these sources (repeatable).
	#[arg(long = "source", value_name = "SOURCE")]
	pub source_ids: Vec<String>,

	/// Continue an earlier conversation.
	#[arg(long, value_name = "ID")]
	pub conversation: Option<String>,

	/// Print events as they arrive instead of the final answer.
	#[arg(long)]
	pub stream: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PollArgs {
	/// Seconds between checks.
	#[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
	pub interval: Option<u64>,

	/// Give up after this many seconds.
	#[arg(long, value_name = "SECONDS")]
	pub max_wait: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ResearchAction {
	Start {
		#[arg(value_name = "NOTEBOOK")]
		notebook_id: String,
		#[arg(value_name = "QUERY")]
		query: String,
		/// web or drive
		#[arg(long, default_value = "web")]
		source: ResearchSource,
		/// fast or deep (web only)
		#[arg(long, default_value = "fast")]
		mode: ResearchMode,
	},
	Status {
		#[arg(value_name = "NOTEBOOK")]
		notebook_id: String,
	},
	/// Poll until the research task finishes.
	Wait {
		#[arg(value_name = "NOTEBOOK")]
		notebook_id: String,
		#[command(flatten)]
		poll: PollArgs,
	},
	/// Add discovered sources to the notebook.
	Import {
		#[arg(value_name = "NOTEBOOK")]
		notebook_id: String,
		#[arg(value_name = "TASK")]
		task_id: String,
		/// Indices of the sources to import (repeatable); all when omitted.
		#[arg(long = "index", value_name = "N")]
		indices: Vec<usize>,
	},
}

#[derive(Args, Debug, Clone)]
pub struct StudioTarget {
	#[arg(value_name = "NOTEBOOK")]
	pub notebook_id: String,

	/// Sources to cover (repeatable); all when omitted.
	#[arg(long = "source", value_name = "SOURCE")]
	pub source_ids: Vec<String>,

	/// Language code; defaults to the configured language.
	#[arg(long)]
	pub language: Option<String>,

	/// What the overview should focus on.
	#[arg(long, default_value = "")]
	pub focus: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum StudioAction {
	/// Generate an audio overview.
	Audio {
		#[command(flatten)]
		target: StudioTarget,
		/// deep_dive, brief, critique or debate
		#[arg(long, default_value = "deep_dive")]
		format: AudioFormat,
		/// short, default or long
		#[arg(long, default_value = "default")]
		length: AudioLength,
	},
	/// Generate a video overview.
	Video {
		#[command(flatten)]
		target: StudioTarget,
		/// explainer or brief
		#[arg(long, default_value = "explainer")]
		format: VideoFormat,
		#[arg(long, default_value = "auto_select")]
		style: VideoStyle,
	},
	/// List a notebook's artifacts.
	Status {
		#[arg(value_name = "NOTEBOOK")]
		notebook_id: String,
	},
	/// Poll until an artifact is ready.
	Wait {
		#[arg(value_name = "NOTEBOOK")]
		notebook_id: String,
		#[arg(value_name = "ARTIFACT")]
		artifact_id: String,
		#[command(flatten)]
		poll: PollArgs,
	},
	/// Delete an artifact. Irreversible.
	Delete {
		#[arg(value_name = "ARTIFACT")]
		artifact_id: String,
		#[arg(long)]
		confirm: bool,
	},
}

/// Help colours in cargo's palette.
fn help_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
		.valid(AnsiColor::Cyan.on_default())
}
