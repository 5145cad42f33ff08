//! Shaped results of notebook operations.

use nlm_protocol::params::research::{ResearchMode, ResearchSource, ResultType};
use nlm_protocol::params::studio::{StudioKind, STATUS_COMPLETED, STATUS_IN_PROGRESS};
use serde::Serialize;
use serde_json::Value;

const NOTEBOOK_URL_BASE: &str = "https://notebooklm.google.com/notebook/";

/// Web address of a notebook.
pub fn notebook_url(notebook_id: &str) -> String {
	format!("{NOTEBOOK_URL_BASE}{notebook_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
	Owned,
	SharedWithMe,
}

/// Id and title of a source inside a notebook listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRef {
	pub id: String,
	pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notebook {
	pub id: String,
	pub title: String,
	pub emoji: Option<String>,
	pub sources: Vec<SourceRef>,
	pub ownership: Ownership,
	/// Owned notebook shared with other people.
	pub is_shared: bool,
	pub url: String,
}

impl Notebook {
	pub fn source_count(&self) -> usize {
		self.sources.len()
	}
}

/// How a source's content got into the notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
	GoogleDocs,
	GoogleSlidesSheets,
	PastedText,
	Other,
}

impl SourceKind {
	pub fn from_code(code: Option<i64>) -> Self {
		match code {
			Some(1) => Self::GoogleDocs,
			Some(2) => Self::GoogleSlidesSheets,
			Some(4) => Self::PastedText,
			_ => Self::Other,
		}
	}

	/// Kinds that live in Drive and can be re-synced.
	pub fn is_drive_backed(self) -> bool {
		matches!(self, Self::GoogleDocs | Self::GoogleSlidesSheets)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceInfo {
	pub id: String,
	pub title: String,
	pub kind: SourceKind,
	/// Raw type code, kept for kinds not modelled above.
	pub type_code: Option<i64>,
	pub drive_document_id: Option<String>,
	pub can_sync: bool,
}

/// A notebook with its sources, plus the raw payload for fields not shaped
/// here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotebookDetails {
	pub id: String,
	pub title: Option<String>,
	pub sources: Vec<SourceInfo>,
	pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatSettings {
	pub notebook_id: String,
	pub goal: String,
	pub custom_prompt: Option<String>,
	pub response_length: String,
	/// Settings as echoed back by the service.
	pub raw_settings: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncedSource {
	pub id: String,
	pub title: String,
	/// Unix seconds of the sync, when reported.
	pub synced_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchTask {
	pub task_id: String,
	pub report_id: Option<String>,
	pub notebook_id: String,
	pub query: String,
	pub source: ResearchSource,
	pub mode: ResearchMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchState {
	InProgress,
	Completed,
	/// The notebook has no research task.
	NoResearch,
}

/// A source found by research, in the order the service ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredSource {
	pub index: usize,
	pub url: String,
	pub title: String,
	pub description: String,
	pub result_type: i64,
	pub result_type_name: &'static str,
}

impl DiscoveredSource {
	pub fn result_type_name(code: i64) -> &'static str {
		ResultType::from_code(code).map_or("unknown", ResultType::name)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchStatus {
	pub state: ResearchState,
	pub task_id: Option<String>,
	pub query: String,
	pub source: ResearchSource,
	pub mode: ResearchMode,
	pub sources: Vec<DiscoveredSource>,
	pub summary: String,
}

impl ResearchStatus {
	pub fn no_research() -> Self {
		Self {
			state: ResearchState::NoResearch,
			task_id: None,
			query: String::new(),
			source: ResearchSource::Web,
			mode: ResearchMode::Fast,
			sources: Vec::new(),
			summary: String::new(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudioState {
	InProgress,
	Completed,
	Unknown,
}

impl StudioState {
	pub fn from_code(code: Option<i64>) -> Self {
		match code {
			Some(STATUS_IN_PROGRESS) => Self::InProgress,
			Some(STATUS_COMPLETED) => Self::Completed,
			_ => Self::Unknown,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudioArtifact {
	pub artifact_id: String,
	pub title: String,
	/// `None` for artifact types this client does not create.
	pub kind: Option<StudioKind>,
	pub state: StudioState,
	pub status_code: Option<i64>,
	pub audio_url: Option<String>,
	pub video_url: Option<String>,
	pub duration_seconds: Option<f64>,
}
