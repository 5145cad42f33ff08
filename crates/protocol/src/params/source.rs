//! Source ingestion and Drive synchronisation.

use serde_json::{Value, json};

use super::{client_settings, project_marker};
use crate::positional::{Positional, Slot, slot};
use crate::rpc::{RpcId, RpcRequest};

/// Drive MIME types the service accepts.
pub mod mime {
	pub const GOOGLE_DOC: &str = "application/vnd.google-apps.document";
	pub const GOOGLE_SLIDES: &str = "application/vnd.google-apps.presentation";
	pub const GOOGLE_SHEETS: &str = "application/vnd.google-apps.spreadsheet";
	pub const PDF: &str = "application/pdf";
}

/// Trailing origin marker of a source entry: added by the user, or imported
/// from research results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
	User = 1,
	Research = 2,
}

/// An 11-slot source entry. `payload_index` selects where the content sits.
pub(crate) fn source_entry(payload_index: usize, payload: Value, origin: Origin) -> Positional<11> {
	Positional::<11>::empty()
		.with(payload_index, payload)
		.with(10, origin as i64)
}

pub(crate) fn drive_entry(document_id: &str, mime_type: &str, title: &str, origin: Origin) -> Positional<11> {
	source_entry(0, json!([document_id, mime_type, 1, title]), origin)
}

/// Content of a new source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput<'a> {
	/// Web page or YouTube video.
	Url(&'a str),
	/// Pasted text.
	Text { title: &'a str, content: &'a str },
	/// Google Drive document.
	Drive {
		document_id: &'a str,
		mime_type: &'a str,
		title: &'a str,
	},
}

impl SourceInput<'_> {
	fn entry(&self) -> Positional<11> {
		match *self {
			Self::Url(url) => source_entry(2, json!([url]), Origin::User),
			Self::Text { title, content } => {
				source_entry(1, json!([title, content]), Origin::User).with(3, 2)
			}
			Self::Drive {
				document_id,
				mime_type,
				title,
			} => drive_entry(document_id, mime_type, title, Origin::User),
		}
	}

	/// Title to report when the service does not echo one back.
	pub fn fallback_title(&self) -> &str {
		match *self {
			Self::Url(url) => url,
			Self::Text { title, .. } | Self::Drive { title, .. } => title,
		}
	}
}

/// `[[[entry]], id, [2], settings]`
#[derive(Debug, Clone)]
pub struct AddSource<'a> {
	pub notebook_id: &'a str,
	pub source: SourceInput<'a>,
}

impl RpcRequest for AddSource<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::AddSource
	}

	fn notebook_scope(&self) -> Option<&str> {
		Some(self.notebook_id)
	}

	fn params(&self) -> Value {
		Positional([
			slot(json!([[self.source.entry().into_value()]])),
			slot(self.notebook_id),
			slot(project_marker()),
			slot(client_settings()),
		])
		.into_value()
	}
}

fn source_ref(source_id: &str) -> Value {
	Positional([Slot::Absent, slot(json!([source_id])), slot(project_marker())]).into_value()
}

/// `[null, [source_id], [2]]`
#[derive(Debug, Clone)]
pub struct CheckFreshness<'a> {
	pub source_id: &'a str,
}

impl RpcRequest for CheckFreshness<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::CheckFreshness
	}

	fn params(&self) -> Value {
		source_ref(self.source_id)
	}
}

/// `[null, [source_id], [2]]`
#[derive(Debug, Clone)]
pub struct SyncDriveSource<'a> {
	pub source_id: &'a str,
}

impl RpcRequest for SyncDriveSource<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::SyncDriveSource
	}

	fn params(&self) -> Value {
		source_ref(self.source_id)
	}
}
