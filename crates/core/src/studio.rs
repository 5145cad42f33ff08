//! Audio and video overviews.

use futures_util::Stream;
use nlm_protocol::params::studio::{
	CreateStudio, DeleteStudio, PollStudio, STATUS_COMPLETED, STATUS_IN_PROGRESS, StudioCommon, StudioKind,
	StudioOptions,
};
use nlm_runtime::{Phase, PollOptions, Snapshot, StatusMap, poll, wait_for_terminal};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::client::NotebookClient;
use crate::path::{Walk, require};
use crate::types::{StudioArtifact, StudioState};
use crate::Result;

/// Artifact accepted for generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudioCreated {
	pub artifact_id: String,
	pub notebook_id: String,
	pub kind: StudioKind,
	pub state: StudioState,
	pub options: StudioOptionsView,
}

/// Names of the options an artifact was requested with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudioOptionsView {
	pub format: &'static str,
	/// Audio length or video style.
	pub variant: &'static str,
	pub language: String,
}

impl StudioOptionsView {
	fn new(options: &StudioOptions, language: &str) -> Self {
		let (format, variant) = match options {
			StudioOptions::Audio { format, length } => (format.name(), length.name()),
			StudioOptions::Video { format, style } => (format.name(), style.name()),
		};
		Self {
			format,
			variant,
			language: language.to_string(),
		}
	}
}

/// Poller mapping for one artifact: a missing artifact has failed, unknown
/// codes are still pending.
pub fn studio_phases() -> StatusMap<Option<StudioArtifact>> {
	StatusMap::new(|artifact: &Option<StudioArtifact>| match artifact.as_ref().map(|a| a.status_code) {
		None => Phase::Failed,
		Some(Some(STATUS_IN_PROGRESS)) => Phase::InProgress,
		Some(Some(STATUS_COMPLETED)) => Phase::Completed,
		Some(_) => Phase::Pending,
	})
}

impl NotebookClient {
	/// Requests generation of an audio or video overview.
	pub async fn create_studio(&self, common: StudioCommon<'_>, options: StudioOptions) -> Result<StudioCreated> {
		let notebook_id = common.notebook_id.to_string();
		let view = StudioOptionsView::new(&options, common.language);
		let result = self.rpc().execute(&CreateStudio { common, options }).await?;

		let artifact_id = require(result.str_at(&[0, 0]), "create_studio", "artifact id")?;
		let kind = options.kind();
		info!(target = "nlm", notebook = %notebook_id, artifact = artifact_id, %kind, "studio generation started");
		Ok(StudioCreated {
			artifact_id: artifact_id.to_string(),
			notebook_id,
			kind,
			state: StudioState::from_code(result.i64_at(&[0, 4])),
			options: view,
		})
	}

	/// Artifacts of a notebook, suggestions excluded.
	pub async fn studio_status(&self, notebook_id: &str) -> Result<Vec<StudioArtifact>> {
		let result = self.rpc().execute(&PollStudio { notebook_id }).await?;
		Ok(parse_artifacts(&result))
	}

	/// Current state of one artifact; `None` once it no longer exists.
	pub async fn studio_artifact(&self, notebook_id: &str, artifact_id: &str) -> Result<Option<StudioArtifact>> {
		let artifacts = self.studio_status(notebook_id).await?;
		Ok(artifacts.into_iter().find(|a| a.artifact_id == artifact_id))
	}

	/// Stream of snapshots of one artifact, one per check.
	pub fn poll_studio<'a>(
		&'a self,
		notebook_id: &'a str,
		artifact_id: &'a str,
		options: PollOptions,
	) -> impl Stream<Item = Result<Snapshot<Option<StudioArtifact>>>> + 'a {
		poll(move || self.studio_artifact(notebook_id, artifact_id), studio_phases(), options)
	}

	/// Polls until the artifact is ready, disappears or `options.max_wait`
	/// passes.
	pub async fn wait_for_studio(
		&self,
		notebook_id: &str,
		artifact_id: &str,
		options: PollOptions,
	) -> Result<Option<StudioArtifact>> {
		let last = wait_for_terminal(self.poll_studio(notebook_id, artifact_id, options)).await?;
		Ok(last.status)
	}

	/// Deletes an artifact. Irreversible.
	pub async fn delete_studio(&self, artifact_id: &str) -> Result<()> {
		self.rpc().execute(&DeleteStudio { artifact_id }).await?;
		info!(target = "nlm", artifact = artifact_id, "deleted studio artifact");
		Ok(())
	}
}

/// `[[[id, title, type, sources, status, _, audio, _, video, ...], ...]]`
fn parse_artifacts(result: &Value) -> Vec<StudioArtifact> {
	let Some(items) = result.as_array() else {
		return Vec::new();
	};
	let listing = match items.first().and_then(Value::as_array) {
		Some(inner) => inner.as_slice(),
		None => items.as_slice(),
	};
	listing.iter().filter_map(parse_artifact).collect()
}

fn parse_artifact(entry: &Value) -> Option<StudioArtifact> {
	if entry.list_at(&[]).is_none_or(|fields| fields.len() < 5) {
		return None;
	}
	let artifact_id = entry.str_at(&[0])?;
	let kind = entry.i64_at(&[2]).and_then(StudioKind::from_code);
	let status_code = entry.i64_at(&[4]);

	let (audio_url, video_url, duration_seconds) = match kind {
		Some(StudioKind::Audio) => (
			entry.str_at(&[6, 3]).map(str::to_string),
			None,
			entry.at(&[6, 9, 0]).and_then(Value::as_f64),
		),
		Some(StudioKind::Video) => (None, entry.str_at(&[8, 3]).map(str::to_string), None),
		None => (None, None, None),
	};

	Some(StudioArtifact {
		artifact_id: artifact_id.to_string(),
		title: entry.str_at(&[1]).unwrap_or_default().to_string(),
		kind,
		state: StudioState::from_code(status_code),
		status_code,
		audio_url,
		video_url,
		duration_seconds,
	})
}
