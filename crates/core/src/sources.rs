//! Adding sources and keeping Drive sources current.

use nlm_protocol::params::source::{AddSource, CheckFreshness, SourceInput, SyncDriveSource};
use serde_json::Value;
use tracing::info;

use crate::client::NotebookClient;
use crate::notebooks::source_id;
use crate::path::{Walk, require};
use crate::types::{SourceRef, SyncedSource};
use crate::Result;

impl NotebookClient {
	/// Adds a URL, pasted text or Drive document to a notebook.
	pub async fn add_source(&self, notebook_id: &str, source: SourceInput<'_>) -> Result<SourceRef> {
		let fallback_title = source.fallback_title().to_string();
		let result = self.rpc().execute(&AddSource { notebook_id, source }).await?;
		let added = parse_added(&result, &fallback_title)?;
		info!(target = "nlm", notebook = notebook_id, source = %added.id, "added source");
		Ok(added)
	}

	/// `Some(true)` when a Drive source matches its document, `Some(false)`
	/// when it is stale, `None` when the service does not say.
	pub async fn check_freshness(&self, source_id: &str) -> Result<Option<bool>> {
		let result = self.rpc().execute(&CheckFreshness { source_id }).await?;
		Ok(result.at(&[0, 1]).and_then(Value::as_bool))
	}

	/// Pulls the latest content of a Drive source.
	pub async fn sync_drive_source(&self, source_id: &str) -> Result<SyncedSource> {
		let result = self.rpc().execute(&SyncDriveSource { source_id }).await?;
		parse_synced(&result)
	}
}

/// `[[[[id], title, ...]]]`
fn parse_added(result: &Value, fallback_title: &str) -> Result<SourceRef> {
	let entry = require(result.at(&[0, 0]), "add_source", "source entry")?;
	let id = require(source_id(entry), "add_source", "source id")?;
	Ok(SourceRef {
		id,
		title: entry.str_at(&[1]).unwrap_or(fallback_title).to_string(),
	})
}

/// `[[[id], title, [_, _, _, [_, [synced_at]]]]]`
fn parse_synced(result: &Value) -> Result<SyncedSource> {
	let entry = require(result.at(&[0]), "sync_drive_source", "source entry")?;
	let id = require(source_id(entry), "sync_drive_source", "source id")?;
	Ok(SyncedSource {
		id,
		title: entry.str_at(&[1]).unwrap_or("Unknown").to_string(),
		synced_at: entry.i64_at(&[2, 3, 1, 0]),
	})
}
