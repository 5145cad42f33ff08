//! Research discovery: start, poll and import.

use serde_json::{Value, json};

use super::coded_enum;
use super::source::{Origin, drive_entry, mime, source_entry};
use crate::error::SchemaError;
use crate::positional::{Positional, Slot, slot};
use crate::rpc::{RpcId, RpcRequest};

/// Status code of a research task that is still searching.
pub const STATUS_IN_PROGRESS: i64 = 1;
/// Status code of a research task whose results are ready.
pub const STATUS_COMPLETED: i64 = 2;

coded_enum! {
	/// Where research looks for sources.
	pub enum ResearchSource("source") {
		#[default]
		Web = 1 => "web",
		Drive = 2 => "drive",
	}
}

coded_enum! {
	/// Research depth. Deep research is web-only.
	pub enum ResearchMode("mode") {
		#[default]
		Fast = 1 => "fast",
		Deep = 5 => "deep",
	}
}

coded_enum! {
	/// Kind of a discovered source.
	pub enum ResultType("result type") {
		#[default]
		Web = 1 => "web",
		GoogleDoc = 2 => "google_doc",
		GoogleSlides = 3 => "google_slides",
		DeepReport = 5 => "deep_report",
		GoogleSheets = 8 => "google_sheets",
	}
}

impl ResultType {
	/// Drive MIME type used when importing a result of this kind.
	pub fn drive_mime(self) -> &'static str {
		match self {
			Self::GoogleSlides => mime::GOOGLE_SLIDES,
			Self::GoogleSheets => mime::GOOGLE_SHEETS,
			_ => mime::GOOGLE_DOC,
		}
	}
}

/// Start a research task.
///
/// Fast: `[[query, source], null, 1, id]`.
/// Deep: `[null, [1], [query, source], 5, id]`.
#[derive(Debug, Clone)]
pub struct StartResearch<'a> {
	notebook_id: &'a str,
	query: &'a str,
	source: ResearchSource,
	mode: ResearchMode,
}

impl<'a> StartResearch<'a> {
	pub fn new(
		notebook_id: &'a str,
		query: &'a str,
		source: ResearchSource,
		mode: ResearchMode,
	) -> Result<Self, SchemaError> {
		if query.trim().is_empty() {
			return Err(SchemaError::Empty("research query"));
		}
		if mode == ResearchMode::Deep && source == ResearchSource::Drive {
			return Err(SchemaError::Unsupported(
				"deep research only supports web sources; use fast mode for drive".to_string(),
			));
		}
		Ok(Self {
			notebook_id,
			query,
			source,
			mode,
		})
	}

	pub fn source(&self) -> ResearchSource {
		self.source
	}

	pub fn mode(&self) -> ResearchMode {
		self.mode
	}
}

impl RpcRequest for StartResearch<'_> {
	fn rpc_id(&self) -> RpcId {
		match self.mode {
			ResearchMode::Fast => RpcId::StartFastResearch,
			ResearchMode::Deep => RpcId::StartDeepResearch,
		}
	}

	fn notebook_scope(&self) -> Option<&str> {
		Some(self.notebook_id)
	}

	fn params(&self) -> Value {
		let query = json!([self.query, self.source.code()]);
		match self.mode {
			ResearchMode::Fast => Positional([
				slot(query),
				Slot::Absent,
				slot(ResearchMode::Fast.code()),
				slot(self.notebook_id),
			])
			.into_value(),
			ResearchMode::Deep => Positional([
				Slot::Absent,
				slot(json!([1])),
				slot(query),
				slot(ResearchMode::Deep.code()),
				slot(self.notebook_id),
			])
			.into_value(),
		}
	}
}

/// `[null, null, id]`
#[derive(Debug, Clone)]
pub struct PollResearch<'a> {
	pub notebook_id: &'a str,
}

impl RpcRequest for PollResearch<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::PollResearch
	}

	fn notebook_scope(&self) -> Option<&str> {
		Some(self.notebook_id)
	}

	fn params(&self) -> Value {
		Positional([Slot::Absent, Slot::Absent, slot(self.notebook_id)]).into_value()
	}
}

/// A discovered source selected for import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSource<'a> {
	pub url: &'a str,
	pub title: &'a str,
	/// Raw result type code as reported by the poll.
	pub result_type: i64,
}

impl ImportSource<'_> {
	fn entry(&self) -> Positional<11> {
		let web = || source_entry(2, json!([self.url, self.title]), Origin::Research);
		if self.result_type == ResultType::Web.code() {
			return web();
		}
		match drive_document_id(self.url) {
			Some(document_id) => {
				let mime = ResultType::from_code(self.result_type).unwrap_or(ResultType::GoogleDoc).drive_mime();
				drive_entry(document_id, mime, self.title, Origin::Research)
			}
			None => web(),
		}
	}
}

/// Document id from a Drive link of the form `...open?id=<doc>&...`.
pub fn drive_document_id(url: &str) -> Option<&str> {
	let (_, rest) = url.rsplit_once("id=")?;
	rest.split('&').next().filter(|id| !id.is_empty())
}

/// `[null, [1], task_id, id, [entries...]]`
#[derive(Debug, Clone)]
pub struct ImportResearch<'a> {
	pub notebook_id: &'a str,
	pub task_id: &'a str,
	pub sources: &'a [ImportSource<'a>],
}

impl RpcRequest for ImportResearch<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::ImportResearch
	}

	fn notebook_scope(&self) -> Option<&str> {
		Some(self.notebook_id)
	}

	fn params(&self) -> Value {
		let entries: Vec<Value> = self.sources.iter().map(|s| s.entry().into_value()).collect();
		Positional([
			Slot::Absent,
			slot(json!([1])),
			slot(self.task_id),
			slot(self.notebook_id),
			slot(entries),
		])
		.into_value()
	}
}
