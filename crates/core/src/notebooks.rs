//! Notebook lifecycle.

use nlm_protocol::params::notebook::{CreateNotebook, DeleteNotebook, GetNotebook, ListNotebooks, RenameNotebook};
use serde_json::Value;
use tracing::info;

use crate::client::NotebookClient;
use crate::path::{Walk, require};
use crate::types::{Notebook, NotebookDetails, Ownership, SourceInfo, SourceKind, SourceRef, notebook_url};
use crate::Result;

const OWNERSHIP_MINE: i64 = 1;
const UNTITLED: &str = "Untitled";

impl NotebookClient {
	/// Notebooks visible to the signed-in user.
	pub async fn list_notebooks(&self) -> Result<Vec<Notebook>> {
		let result = self.rpc().execute(&ListNotebooks).await?;
		let Some(items) = result.as_array() else {
			return Ok(Vec::new());
		};
		let listing = match items.first().and_then(Value::as_array) {
			Some(inner) => inner.as_slice(),
			None => items.as_slice(),
		};
		Ok(listing.iter().filter_map(parse_notebook).collect())
	}

	/// A notebook with its typed source list.
	pub async fn get_notebook(&self, notebook_id: &str) -> Result<NotebookDetails> {
		let raw = self.rpc().execute(&GetNotebook { notebook_id }).await?;
		Ok(parse_details(notebook_id, raw))
	}

	/// Creates a notebook; an empty title leaves naming to the service.
	pub async fn create_notebook(&self, title: &str) -> Result<Notebook> {
		let result = self.rpc().execute(&CreateNotebook { title }).await?;
		let id = require(result.str_at(&[2]).filter(|id| !id.is_empty()), "create_notebook", "notebook id")?;
		info!(target = "nlm", notebook = id, "created notebook");
		Ok(Notebook {
			id: id.to_string(),
			title: if title.is_empty() { "Untitled notebook".to_string() } else { title.to_string() },
			emoji: None,
			sources: Vec::new(),
			ownership: Ownership::Owned,
			is_shared: false,
			url: notebook_url(id),
		})
	}

	pub async fn rename_notebook(&self, notebook_id: &str, title: &str) -> Result<()> {
		self.rpc().execute(&RenameNotebook { notebook_id, title }).await?;
		Ok(())
	}

	/// Deletes a notebook with all its sources and artifacts. Irreversible.
	pub async fn delete_notebook(&self, notebook_id: &str) -> Result<()> {
		self.rpc().execute(&DeleteNotebook { notebook_id }).await?;
		info!(target = "nlm", notebook = notebook_id, "deleted notebook");
		Ok(())
	}

	/// Ids of every source in a notebook.
	pub async fn source_ids(&self, notebook_id: &str) -> Result<Vec<String>> {
		let details = self.get_notebook(notebook_id).await?;
		Ok(details.sources.into_iter().map(|s| s.id).collect())
	}
}

/// `[title, [sources], id, emoji, null, [ownership, shared, ...]]`
fn parse_notebook(entry: &Value) -> Option<Notebook> {
	let id = entry.str_at(&[2]).filter(|id| !id.is_empty())?;
	let metadata = entry.list_at(&[5]).filter(|m| !m.is_empty());
	let ownership = match metadata.and_then(|m| m.i64_at(&[0])) {
		Some(code) if code != OWNERSHIP_MINE => Ownership::SharedWithMe,
		_ => Ownership::Owned,
	};
	let is_shared = metadata.and_then(|m| m.get(1)).is_some_and(truthy);
	let sources = entry
		.list_at(&[1])
		.unwrap_or_default()
		.iter()
		.filter_map(|src| {
			Some(SourceRef {
				id: source_id(src)?,
				title: src.str_at(&[1]).unwrap_or(UNTITLED).to_string(),
			})
		})
		.collect();

	Some(Notebook {
		id: id.to_string(),
		title: entry.str_at(&[0]).unwrap_or(UNTITLED).to_string(),
		emoji: entry.str_at(&[3]).map(str::to_string),
		sources,
		ownership,
		is_shared,
		url: notebook_url(id),
	})
}

/// `[[title, [sources], id, ...]]`, each source `[[id], title, metadata]`.
fn parse_details(notebook_id: &str, raw: Value) -> NotebookDetails {
	let notebook = match raw.at(&[0]) {
		Some(inner) if inner.is_array() => inner,
		_ => &raw,
	};
	let title = notebook.str_at(&[0]).map(str::to_string);
	let sources = notebook
		.list_at(&[1])
		.unwrap_or_default()
		.iter()
		.filter_map(parse_source_info)
		.collect();

	NotebookDetails {
		id: notebook_id.to_string(),
		title,
		sources,
		raw,
	}
}

fn parse_source_info(src: &Value) -> Option<SourceInfo> {
	let id = source_id(src)?;
	let type_code = src.i64_at(&[2, 4]);
	let kind = SourceKind::from_code(type_code);
	let drive_document_id = src.str_at(&[2, 0, 0]).map(str::to_string);
	Some(SourceInfo {
		can_sync: drive_document_id.is_some() && kind.is_drive_backed(),
		id,
		title: src.str_at(&[1]).unwrap_or(UNTITLED).to_string(),
		kind,
		type_code,
		drive_document_id,
	})
}

/// Source ids arrive wrapped as `[id]`, occasionally bare.
pub(crate) fn source_id(src: &Value) -> Option<String> {
	src.str_at(&[0, 0])
		.or_else(|| src.str_at(&[0]))
		.filter(|id| !id.is_empty())
		.map(str::to_string)
}

fn truthy(value: &Value) -> bool {
	match value {
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
		Value::String(s) => !s.is_empty(),
		Value::Array(a) => !a.is_empty(),
		Value::Object(o) => !o.is_empty(),
		Value::Null => false,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn parses_listing_entry() {
		let entry = json!([
			"Rust notes",
			[[["s1"], "The Book", [null]], [["s2"], "Nomicon"]],
			"nb-1",
			"🦀",
			null,
			[1, true, true]
		]);
		let nb = parse_notebook(&entry).unwrap();
		assert_eq!(nb.id, "nb-1");
		assert_eq!(nb.title, "Rust notes");
		assert_eq!(nb.emoji.as_deref(), Some("🦀"));
		assert_eq!(nb.source_count(), 2);
		assert_eq!(nb.sources[1], SourceRef { id: "s2".into(), title: "Nomicon".into() });
		assert_eq!(nb.ownership, Ownership::Owned);
		assert!(nb.is_shared);
		assert_eq!(nb.url, "https://notebooklm.google.com/notebook/nb-1");
	}

	#[test]
	fn shared_with_me_and_defaults() {
		let entry = json!([null, null, "nb-2", null, null, [2, false]]);
		let nb = parse_notebook(&entry).unwrap();
		assert_eq!(nb.title, "Untitled");
		assert_eq!(nb.ownership, Ownership::SharedWithMe);
		assert!(!nb.is_shared);
		assert!(nb.sources.is_empty());
	}

	#[test]
	fn entry_without_id_is_skipped() {
		assert!(parse_notebook(&json!(["title", []])).is_none());
		assert!(parse_notebook(&json!("junk")).is_none());
	}

	#[test]
	fn details_classify_sources() {
		let raw = json!([[
			"Title",
			[
				[["s1"], "Doc", [["drive-1"], null, null, null, 1]],
				[["s2"], "Pasted", [null, null, null, null, 4]],
				[["s3"], "Slides without doc id", [null, null, null, null, 2]],
				[["s4"], "Sheet", [["drive-4"], null, null, null, 2], [null, 2]]
			],
			"nb-1"
		]]);
		let details = parse_details("nb-1", raw.clone());
		assert_eq!(details.title.as_deref(), Some("Title"));
		assert_eq!(details.raw, raw);
		let summary: Vec<_> = details
			.sources
			.iter()
			.map(|s| (s.id.as_str(), s.kind, s.drive_document_id.as_deref(), s.can_sync))
			.collect();
		assert_eq!(
			summary,
			vec![
				("s1", SourceKind::GoogleDocs, Some("drive-1"), true),
				("s2", SourceKind::PastedText, None, false),
				("s3", SourceKind::GoogleSlidesSheets, None, false),
				("s4", SourceKind::GoogleSlidesSheets, Some("drive-4"), true),
			]
		);
	}

	#[test]
	fn details_of_empty_payload() {
		let details = parse_details("nb", Value::Null);
		assert!(details.sources.is_empty());
		assert_eq!(details.title, None);
	}
}
