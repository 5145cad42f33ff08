//! RPC identifiers and the logical call they name.

use std::fmt;

use serde_json::Value;

/// Path of the batched RPC endpoint, relative to the service base URL.
pub const BATCH_EXECUTE_PATH: &str = "/_/LabsTailwindUi/data/batchexecute";

/// Path of the streaming question-answering endpoint.
pub const STREAM_QUERY_PATH: &str = "/_/LabsTailwindUi/data/google.internal.labs.tailwind.orchestration.v1.LabsTailwindOrchestrationService/GenerateFreeFormStreamed";

/// Opaque identifiers of the batched RPCs this crate speaks.
///
/// Rename and chat configuration share one identifier upstream; they are
/// kept distinct here so logs say which one ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcId {
	ListNotebooks,
	GetNotebook,
	CreateNotebook,
	RenameNotebook,
	ConfigureChat,
	DeleteNotebook,
	AddSource,
	CheckFreshness,
	SyncDriveSource,
	StartFastResearch,
	StartDeepResearch,
	PollResearch,
	ImportResearch,
	CreateStudio,
	PollStudio,
	DeleteStudio,
}

impl RpcId {
	/// Wire identifier sent in `rpcids` and inside `f.req`.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ListNotebooks => "wXbhsf",
			Self::GetNotebook => "rLM1Ne",
			Self::CreateNotebook => "CCqFvf",
			Self::RenameNotebook | Self::ConfigureChat => "s0tc2d",
			Self::DeleteNotebook => "WWINqb",
			Self::AddSource => "izAoDd",
			Self::CheckFreshness => "yR9Yof",
			Self::SyncDriveSource => "FLmJqe",
			Self::StartFastResearch => "Ljjv0c",
			Self::StartDeepResearch => "QA9ei",
			Self::PollResearch => "e3bVqc",
			Self::ImportResearch => "LBwxtb",
			Self::CreateStudio => "R7cb6c",
			Self::PollStudio => "gArtLc",
			Self::DeleteStudio => "V5N4be",
		}
	}

	/// Short operation name for logs.
	pub const fn operation(self) -> &'static str {
		match self {
			Self::ListNotebooks => "list_notebooks",
			Self::GetNotebook => "get_notebook",
			Self::CreateNotebook => "create_notebook",
			Self::RenameNotebook => "rename_notebook",
			Self::ConfigureChat => "configure_chat",
			Self::DeleteNotebook => "delete_notebook",
			Self::AddSource => "add_source",
			Self::CheckFreshness => "check_freshness",
			Self::SyncDriveSource => "sync_drive_source",
			Self::StartFastResearch => "start_fast_research",
			Self::StartDeepResearch => "start_deep_research",
			Self::PollResearch => "poll_research",
			Self::ImportResearch => "import_research",
			Self::CreateStudio => "create_studio",
			Self::PollStudio => "poll_studio",
			Self::DeleteStudio => "delete_studio",
		}
	}
}

impl fmt::Display for RpcId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One logical batched call: identifier, parameter tree and source path.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcCall {
	pub id: RpcId,
	pub params: Value,
	/// Value of the `source-path` query parameter.
	pub source_path: String,
}

impl RpcCall {
	pub fn new(id: RpcId, params: impl Into<Value>) -> Self {
		Self {
			id,
			params: params.into(),
			source_path: "/".to_string(),
		}
	}

	/// Scopes the call to a notebook page, as the web client does for
	/// notebook-level operations.
	pub fn in_notebook(mut self, notebook_id: &str) -> Self {
		self.source_path = notebook_path(notebook_id);
		self
	}
}

/// `source-path` value for a notebook page.
pub fn notebook_path(notebook_id: &str) -> String {
	format!("/notebook/{notebook_id}")
}

/// A typed parameter schema bound to one RPC.
pub trait RpcRequest {
	fn rpc_id(&self) -> RpcId;

	/// Notebook the call is scoped to, if any.
	fn notebook_scope(&self) -> Option<&str> {
		None
	}

	/// Positional parameter tree sent on the wire.
	fn params(&self) -> Value;

	fn to_call(&self) -> RpcCall {
		let call = RpcCall::new(self.rpc_id(), self.params());
		match self.notebook_scope() {
			Some(id) => call.in_notebook(id),
			None => call,
		}
	}
}
