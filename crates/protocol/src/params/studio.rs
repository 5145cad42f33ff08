//! Studio artifacts: audio and video overviews.

use serde_json::{Value, json};

use super::{coded_enum, nested_ids, simple_ids};
use crate::positional::{Positional, Slot, slot};
use crate::rpc::{RpcId, RpcRequest};

/// Status code of an artifact that is still generating.
pub const STATUS_IN_PROGRESS: i64 = 1;
/// Status code of a finished artifact.
pub const STATUS_COMPLETED: i64 = 3;

/// Filter that hides suggested-but-unrequested artifacts from listings.
pub const HIDE_SUGGESTED_FILTER: &str = "NOT artifact.status = \"ARTIFACT_STATUS_SUGGESTED\"";

coded_enum! {
	pub enum StudioKind("artifact type") {
		#[default]
		Audio = 1 => "audio",
		Video = 3 => "video",
	}
}

coded_enum! {
	pub enum AudioFormat("audio format") {
		/// Conversation between two hosts.
		#[default]
		DeepDive = 1 => "deep_dive",
		Brief = 2 => "brief",
		Critique = 3 => "critique",
		Debate = 4 => "debate",
	}
}

coded_enum! {
	pub enum AudioLength("audio length") {
		Short = 1 => "short",
		#[default]
		Default = 2 => "default",
		Long = 3 => "long",
	}
}

coded_enum! {
	pub enum VideoFormat("video format") {
		#[default]
		Explainer = 1 => "explainer",
		Brief = 2 => "brief",
	}
}

coded_enum! {
	pub enum VideoStyle("visual style") {
		#[default]
		AutoSelect = 1 => "auto_select",
		Custom = 2 => "custom",
		Classic = 3 => "classic",
		Whiteboard = 4 => "whiteboard",
		Kawaii = 5 => "kawaii",
		Anime = 6 => "anime",
		Watercolor = 7 => "watercolor",
		RetroPrint = 8 => "retro_print",
		Heritage = 9 => "heritage",
		PaperCraft = 10 => "paper_craft",
	}
}

/// Settings shared by both artifact kinds.
#[derive(Debug, Clone)]
pub struct StudioCommon<'a> {
	pub notebook_id: &'a str,
	pub source_ids: &'a [String],
	/// BCP-47 language code.
	pub language: &'a str,
	/// What the generated content should focus on; may be empty.
	pub focus_prompt: &'a str,
}

/// What to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioOptions {
	Audio { format: AudioFormat, length: AudioLength },
	Video { format: VideoFormat, style: VideoStyle },
}

impl StudioOptions {
	pub fn kind(&self) -> StudioKind {
		match self {
			Self::Audio { .. } => StudioKind::Audio,
			Self::Video { .. } => StudioKind::Video,
		}
	}
}

/// Create an audio or video artifact.
///
/// Audio: `[[2], id, [null, null, 1, nested, null, null, [null, [focus, length, null, simple, lang, null, format]]]]`.
/// Video: `[[2], id, [null, null, 3, nested, null x4, [null, null, [simple, lang, focus, null, format, style]]]]`.
#[derive(Debug, Clone)]
pub struct CreateStudio<'a> {
	pub common: StudioCommon<'a>,
	pub options: StudioOptions,
}

impl CreateStudio<'_> {
	fn artifact_settings(&self) -> Value {
		let c = &self.common;
		let kind = self.options.kind().code();
		let nested = nested_ids(c.source_ids);
		let simple = simple_ids(c.source_ids);

		match self.options {
			StudioOptions::Audio { format, length } => {
				let settings = Positional([
					slot(c.focus_prompt),
					slot(length.code()),
					Slot::Absent,
					slot(simple),
					slot(c.language),
					Slot::Absent,
					slot(format.code()),
				]);
				Positional::<7>::empty()
					.with(2, kind)
					.with(3, nested)
					.with(6, json!([null, settings.into_value()]))
					.into_value()
			}
			StudioOptions::Video { format, style } => {
				let settings = Positional([
					slot(simple),
					slot(c.language),
					slot(c.focus_prompt),
					Slot::Absent,
					slot(format.code()),
					slot(style.code()),
				]);
				Positional::<9>::empty()
					.with(2, kind)
					.with(3, nested)
					.with(8, json!([null, null, settings.into_value()]))
					.into_value()
			}
		}
	}
}

impl RpcRequest for CreateStudio<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::CreateStudio
	}

	fn notebook_scope(&self) -> Option<&str> {
		Some(self.common.notebook_id)
	}

	fn params(&self) -> Value {
		json!([[2], self.common.notebook_id, self.artifact_settings()])
	}
}

/// `[[2], id, filter]`
#[derive(Debug, Clone)]
pub struct PollStudio<'a> {
	pub notebook_id: &'a str,
}

impl RpcRequest for PollStudio<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::PollStudio
	}

	fn notebook_scope(&self) -> Option<&str> {
		Some(self.notebook_id)
	}

	fn params(&self) -> Value {
		json!([[2], self.notebook_id, HIDE_SUGGESTED_FILTER])
	}
}

/// `[[2], artifact_id]`
#[derive(Debug, Clone)]
pub struct DeleteStudio<'a> {
	pub artifact_id: &'a str,
}

impl RpcRequest for DeleteStudio<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::DeleteStudio
	}

	fn params(&self) -> Value {
		json!([[2], self.artifact_id])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn common(ids: &[String]) -> StudioCommon<'_> {
		StudioCommon {
			notebook_id: "nb",
			source_ids: ids,
			language: "en",
			focus_prompt: "cats",
		}
	}

	#[test]
	fn audio_shape() {
		let ids = vec!["s1".to_string(), "s2".to_string()];
		let call = CreateStudio {
			common: common(&ids),
			options: StudioOptions::Audio {
				format: AudioFormat::Debate,
				length: AudioLength::Long,
			},
		}
		.to_call();
		assert_eq!(call.id.as_str(), "R7cb6c");
		assert_eq!(call.source_path, "/notebook/nb");
		assert_eq!(
			call.params,
			json!([
				[2],
				"nb",
				[
					null, null, 1, [[["s1"]], [["s2"]]], null, null,
					[null, ["cats", 3, null, [["s1"], ["s2"]], "en", null, 4]]
				]
			])
		);
	}

	#[test]
	fn video_shape() {
		let ids = vec!["s1".to_string()];
		let params = CreateStudio {
			common: common(&ids),
			options: StudioOptions::Video {
				format: VideoFormat::Brief,
				style: VideoStyle::PaperCraft,
			},
		}
		.params();
		assert_eq!(
			params,
			json!([
				[2],
				"nb",
				[
					null, null, 3, [[["s1"]]], null, null, null, null,
					[null, null, [[["s1"]], "en", "cats", null, 2, 10]]
				]
			])
		);
	}

	#[test]
	fn poll_and_delete_shapes() {
		let poll = PollStudio { notebook_id: "nb" }.to_call();
		assert_eq!(poll.id.as_str(), "gArtLc");
		assert_eq!(
			poll.params,
			json!([[2], "nb", "NOT artifact.status = \"ARTIFACT_STATUS_SUGGESTED\""])
		);
		let delete = DeleteStudio { artifact_id: "a1" }.to_call();
		assert_eq!(delete.id.as_str(), "V5N4be");
		assert_eq!(delete.params, json!([[2], "a1"]));
		assert_eq!(delete.source_path, "/");
	}

	#[test]
	fn option_defaults() {
		assert_eq!(AudioLength::default().code(), 2);
		assert_eq!(VideoStyle::default().name(), "auto_select");
		assert_eq!("paper_craft".parse::<VideoStyle>(), Ok(VideoStyle::PaperCraft));
	}
}
