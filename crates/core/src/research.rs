//! Research discovery.
//!
//! Research runs server-side: [`NotebookClient::start_research`] returns as
//! soon as the task exists, [`NotebookClient::research_status`] reads the
//! current state and [`NotebookClient::wait_for_research`] polls until it is
//! done. Discovered sources are only added to the notebook by
//! [`NotebookClient::import_research`].

use futures_util::Stream;
use nlm_protocol::params::research::{
	ImportResearch, ImportSource, PollResearch, ResearchMode, ResearchSource, STATUS_COMPLETED, StartResearch,
};
use nlm_runtime::{Phase, PollOptions, Snapshot, StatusMap, poll, wait_for_terminal};
use serde_json::Value;
use tracing::info;

use crate::client::NotebookClient;
use crate::notebooks::source_id;
use crate::path::{Walk, require, unwrap_nested};
use crate::types::{DiscoveredSource, ResearchState, ResearchStatus, ResearchTask, SourceRef};
use crate::Result;

/// Poller mapping for research tasks; a vanished task counts as failed.
pub fn research_phases() -> StatusMap<ResearchStatus> {
	StatusMap::new(|status: &ResearchStatus| match status.state {
		ResearchState::InProgress => Phase::InProgress,
		ResearchState::Completed => Phase::Completed,
		ResearchState::NoResearch => Phase::Failed,
	})
}

impl NotebookClient {
	/// Starts a research task. Deep research is web-only.
	pub async fn start_research(
		&self,
		notebook_id: &str,
		query: &str,
		source: ResearchSource,
		mode: ResearchMode,
	) -> Result<ResearchTask> {
		let request = StartResearch::new(notebook_id, query, source, mode)?;
		let result = self.rpc().execute(&request).await?;
		let task_id = require(result.str_at(&[0]), "start_research", "task id")?;
		info!(target = "nlm", notebook = notebook_id, task = task_id, %mode, %source, "research started");
		Ok(ResearchTask {
			task_id: task_id.to_string(),
			report_id: result.str_at(&[1]).map(str::to_string),
			notebook_id: notebook_id.to_string(),
			query: query.to_string(),
			source,
			mode,
		})
	}

	/// State of the notebook's most recent research task.
	pub async fn research_status(&self, notebook_id: &str) -> Result<ResearchStatus> {
		let result = self.rpc().execute(&PollResearch { notebook_id }).await?;
		Ok(parse_research(&result))
	}

	/// Stream of research snapshots, one per check.
	pub fn poll_research<'a>(
		&'a self,
		notebook_id: &'a str,
		options: PollOptions,
	) -> impl Stream<Item = Result<Snapshot<ResearchStatus>>> + 'a {
		poll(move || self.research_status(notebook_id), research_phases(), options)
	}

	/// Polls until research completes, fails or `options.max_wait` passes.
	pub async fn wait_for_research(&self, notebook_id: &str, options: PollOptions) -> Result<ResearchStatus> {
		let last = wait_for_terminal(self.poll_research(notebook_id, options)).await?;
		Ok(last.status)
	}

	/// Adds discovered sources to the notebook.
	pub async fn import_research(
		&self,
		notebook_id: &str,
		task_id: &str,
		sources: &[DiscoveredSource],
	) -> Result<Vec<SourceRef>> {
		let selected: Vec<ImportSource<'_>> = sources
			.iter()
			.map(|s| ImportSource {
				url: &s.url,
				title: &s.title,
				result_type: s.result_type,
			})
			.collect();
		let result = self
			.rpc()
			.execute(&ImportResearch {
				notebook_id,
				task_id,
				sources: &selected,
			})
			.await?;
		let imported = parse_imported(&result);
		info!(target = "nlm", notebook = notebook_id, task = task_id, count = imported.len(), "imported research sources");
		Ok(imported)
	}
}

/// `[[[task_id, info, ...], [ts], ...]]` where
/// `info = [notebook_id, [query, source], mode, [[sources], summary], status]`.
///
/// The first task is the most recent one.
fn parse_research(result: &Value) -> ResearchStatus {
	let Some(items) = result.as_array() else {
		return ResearchStatus::no_research();
	};
	unwrap_nested(items)
		.iter()
		.find_map(parse_task)
		.unwrap_or_else(ResearchStatus::no_research)
}

fn parse_task(task: &Value) -> Option<ResearchStatus> {
	let task_id = task.str_at(&[0])?;
	let info = task.at(&[1]).filter(|info| info.is_array())?;

	let state = match info.i64_at(&[4]) {
		Some(STATUS_COMPLETED) => ResearchState::Completed,
		_ => ResearchState::InProgress,
	};
	let source = match info.i64_at(&[1, 1]) {
		Some(code) if code == ResearchSource::Drive.code() => ResearchSource::Drive,
		_ => ResearchSource::Web,
	};
	let mode = match info.i64_at(&[2]) {
		Some(code) if code == ResearchMode::Deep.code() => ResearchMode::Deep,
		_ => ResearchMode::Fast,
	};
	let sources = info
		.list_at(&[3, 0])
		.unwrap_or_default()
		.iter()
		.enumerate()
		.filter_map(|(index, src)| parse_discovered(index, src))
		.collect();

	Some(ResearchStatus {
		state,
		task_id: Some(task_id.to_string()),
		query: info.str_at(&[1, 0]).unwrap_or_default().to_string(),
		source,
		mode,
		sources,
		summary: info.str_at(&[3, 1]).unwrap_or_default().to_string(),
	})
}

/// `[url, title, description, result_type]`
fn parse_discovered(index: usize, src: &Value) -> Option<DiscoveredSource> {
	if src.list_at(&[]).is_none_or(|fields| fields.len() < 3) {
		return None;
	}
	let text = |i: usize| src.str_at(&[i]).unwrap_or_default().to_string();
	let result_type = src.i64_at(&[3]).unwrap_or(1);
	Some(DiscoveredSource {
		index,
		url: text(0),
		title: text(1),
		description: text(2),
		result_type,
		result_type_name: DiscoveredSource::result_type_name(result_type),
	})
}

/// `[[[id], title], ...]`, possibly wrapped once more.
fn parse_imported(result: &Value) -> Vec<SourceRef> {
	let Some(items) = result.as_array() else {
		return Vec::new();
	};
	unwrap_nested(items)
		.iter()
		.filter(|entry| entry.at(&[0]).is_some_and(Value::is_array))
		.filter_map(|entry| {
			Some(SourceRef {
				id: source_id(entry)?,
				title: entry.str_at(&[1]).unwrap_or("Untitled").to_string(),
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn poll_payload(status: i64) -> Value {
		json!([[
			[
				"task-1",
				[
					"nb-1",
					["rust async", 1],
					1,
					[
						[
							["https://tokio.rs", "Tokio", "Runtime docs"],
							["https://docs.google.com/document/d/x?id=doc-1", "Notes", "Team notes", 2],
							["short"]
						],
						"Two sources found"
					],
					status
				],
				[1735689600]
			],
			[1735689600, 0]
		]])
	}

	#[test]
	fn completed_task_with_sources() {
		let status = parse_research(&poll_payload(2));
		assert_eq!(status.state, ResearchState::Completed);
		assert_eq!(status.task_id.as_deref(), Some("task-1"));
		assert_eq!(status.query, "rust async");
		assert_eq!(status.source, ResearchSource::Web);
		assert_eq!(status.mode, ResearchMode::Fast);
		assert_eq!(status.summary, "Two sources found");
		assert_eq!(status.sources.len(), 2);
		assert_eq!(status.sources[0].result_type, 1);
		assert_eq!(status.sources[0].result_type_name, "web");
		assert_eq!(status.sources[1].index, 1);
		assert_eq!(status.sources[1].result_type_name, "google_doc");
	}

	#[test]
	fn non_completed_code_is_in_progress() {
		assert_eq!(parse_research(&poll_payload(1)).state, ResearchState::InProgress);
		assert_eq!(parse_research(&poll_payload(6)).state, ResearchState::InProgress);
	}

	#[test]
	fn empty_result_means_no_research() {
		assert_eq!(parse_research(&Value::Null).state, ResearchState::NoResearch);
		assert_eq!(parse_research(&json!([])).state, ResearchState::NoResearch);
		assert_eq!(parse_research(&json!([[[1735689600]]])).state, ResearchState::NoResearch);
	}

	#[test]
	fn phases_map_no_research_to_failure() {
		use nlm_runtime::StatusStrategy;

		let phases = research_phases();
		let mut status = ResearchStatus::no_research();
		assert_eq!(phases.classify(&status), Phase::Failed);
		status.state = ResearchState::InProgress;
		assert_eq!(phases.classify(&status), Phase::InProgress);
		status.state = ResearchState::Completed;
		assert_eq!(phases.classify(&status), Phase::Completed);
	}

	#[test]
	fn imported_sources_unwrap_nesting() {
		let wrapped = json!([[[["s1"], "Tokio"], [["s2"], "Notes"]]]);
		let ids: Vec<_> = parse_imported(&wrapped).into_iter().map(|s| s.id).collect();
		assert_eq!(ids, vec!["s1", "s2"]);

		let untitled = json!([[[["s3"]], "junk"]]);
		let imported = parse_imported(&untitled);
		assert_eq!(imported.len(), 1);
		assert_eq!(imported[0].title, "Untitled");
	}
}
