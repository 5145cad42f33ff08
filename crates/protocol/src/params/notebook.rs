//! Notebook lifecycle calls.

use serde_json::{Value, json};

use super::{client_settings, project_marker};
use crate::positional::{Positional, Slot, slot};
use crate::rpc::{RpcId, RpcRequest};

/// `[null, 1, null, [2]]`
#[derive(Debug, Clone, Copy, Default)]
pub struct ListNotebooks;

impl RpcRequest for ListNotebooks {
	fn rpc_id(&self) -> RpcId {
		RpcId::ListNotebooks
	}

	fn params(&self) -> Value {
		Positional([Slot::Absent, slot(1), Slot::Absent, slot(project_marker())]).into_value()
	}
}

/// `[id, null, [2], null, 0]`
#[derive(Debug, Clone)]
pub struct GetNotebook<'a> {
	pub notebook_id: &'a str,
}

impl RpcRequest for GetNotebook<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::GetNotebook
	}

	fn notebook_scope(&self) -> Option<&str> {
		Some(self.notebook_id)
	}

	fn params(&self) -> Value {
		Positional([
			slot(self.notebook_id),
			Slot::Absent,
			slot(project_marker()),
			Slot::Absent,
			slot(0),
		])
		.into_value()
	}
}

/// `[title, null, null, [2], settings]`; an empty title lets the service
/// pick its default name.
#[derive(Debug, Clone)]
pub struct CreateNotebook<'a> {
	pub title: &'a str,
}

impl RpcRequest for CreateNotebook<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::CreateNotebook
	}

	fn params(&self) -> Value {
		Positional([
			slot(self.title),
			Slot::Absent,
			Slot::Absent,
			slot(project_marker()),
			slot(client_settings()),
		])
		.into_value()
	}
}

/// `[id, [[null, null, null, [null, title]]]]`
#[derive(Debug, Clone)]
pub struct RenameNotebook<'a> {
	pub notebook_id: &'a str,
	pub title: &'a str,
}

impl RpcRequest for RenameNotebook<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::RenameNotebook
	}

	fn notebook_scope(&self) -> Option<&str> {
		Some(self.notebook_id)
	}

	fn params(&self) -> Value {
		let update = Positional::<4>::empty().with(3, json!([null, self.title]));
		json!([self.notebook_id, [update.into_value()]])
	}
}

/// `[[id], [2]]`
#[derive(Debug, Clone)]
pub struct DeleteNotebook<'a> {
	pub notebook_id: &'a str,
}

impl RpcRequest for DeleteNotebook<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::DeleteNotebook
	}

	fn params(&self) -> Value {
		json!([[self.notebook_id], project_marker()])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn list_shape() {
		let call = ListNotebooks.to_call();
		assert_eq!(call.id.as_str(), "wXbhsf");
		assert_eq!(call.params, json!([null, 1, null, [2]]));
		assert_eq!(call.source_path, "/");
	}

	#[test]
	fn get_is_scoped_to_notebook() {
		let call = GetNotebook { notebook_id: "nb1" }.to_call();
		assert_eq!(call.id.as_str(), "rLM1Ne");
		assert_eq!(call.params, json!(["nb1", null, [2], null, 0]));
		assert_eq!(call.source_path, "/notebook/nb1");
	}

	#[test]
	fn create_shape() {
		let call = CreateNotebook { title: "Trips" }.to_call();
		assert_eq!(call.id.as_str(), "CCqFvf");
		assert_eq!(
			call.params,
			json!(["Trips", null, null, [2], [1, null, null, null, null, null, null, null, null, null, [1]]])
		);
	}

	#[test]
	fn rename_shape() {
		let params = RenameNotebook {
			notebook_id: "nb1",
			title: "New",
		}
		.params();
		assert_eq!(params, json!(["nb1", [[null, null, null, [null, "New"]]]]));
	}

	#[test]
	fn delete_shape() {
		let call = DeleteNotebook { notebook_id: "nb1" }.to_call();
		assert_eq!(call.id.as_str(), "WWINqb");
		assert_eq!(call.params, json!([["nb1"], [2]]));
		assert_eq!(call.source_path, "/");
	}
}
