//! Chat behaviour settings.

use serde_json::{Value, json};

use super::coded_enum;
use crate::error::SchemaError;
use crate::positional::Positional;
use crate::rpc::{RpcId, RpcRequest};

/// Longest custom prompt the service accepts, in characters.
pub const CUSTOM_PROMPT_MAX_CHARS: usize = 10_000;

const GOAL_DEFAULT: i64 = 1;
const GOAL_CUSTOM: i64 = 2;
const GOAL_LEARNING_GUIDE: i64 = 3;

/// Conversational goal of a notebook's chat.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatGoal {
	/// General research and brainstorming.
	#[default]
	Default,
	LearningGuide,
	/// Free-form instructions.
	Custom(String),
}

impl ChatGoal {
	/// Parses a goal name, requiring a prompt exactly when the goal is `custom`.
	pub fn parse(goal: &str, custom_prompt: Option<&str>) -> Result<Self, SchemaError> {
		match goal.trim().to_ascii_lowercase().replace('-', "_").as_str() {
			"default" => Ok(Self::Default),
			"learning_guide" => Ok(Self::LearningGuide),
			"custom" => Self::custom(custom_prompt.unwrap_or_default()),
			_ => Err(SchemaError::UnknownOption {
				field: "goal",
				value: goal.to_string(),
				expected: "default, learning_guide, custom".to_string(),
			}),
		}
	}

	pub fn custom(prompt: &str) -> Result<Self, SchemaError> {
		if prompt.trim().is_empty() {
			return Err(SchemaError::Empty("custom prompt"));
		}
		let actual = prompt.chars().count();
		if actual > CUSTOM_PROMPT_MAX_CHARS {
			return Err(SchemaError::TooLong {
				field: "custom prompt",
				max: CUSTOM_PROMPT_MAX_CHARS,
				actual,
			});
		}
		Ok(Self::Custom(prompt.to_string()))
	}

	pub fn code(&self) -> i64 {
		match self {
			Self::Default => GOAL_DEFAULT,
			Self::LearningGuide => GOAL_LEARNING_GUIDE,
			Self::Custom(_) => GOAL_CUSTOM,
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			Self::Default => "default",
			Self::LearningGuide => "learning_guide",
			Self::Custom(_) => "custom",
		}
	}

	pub fn custom_prompt(&self) -> Option<&str> {
		match self {
			Self::Custom(prompt) => Some(prompt),
			_ => None,
		}
	}

	fn setting(&self) -> Value {
		match self {
			Self::Custom(prompt) => json!([self.code(), prompt]),
			_ => json!([self.code()]),
		}
	}
}

coded_enum! {
	/// Preferred answer length.
	pub enum ResponseLength("response length") {
		#[default]
		Default = 1 => "default",
		Longer = 4 => "longer",
		Shorter = 5 => "shorter",
	}
}

/// `[id, [[null x7, [[goal(, prompt)], [length]]]]]`
///
/// Shares its RPC with [`RenameNotebook`](super::notebook::RenameNotebook);
/// the slot that is filled selects the update.
#[derive(Debug, Clone)]
pub struct ConfigureChat<'a> {
	pub notebook_id: &'a str,
	pub goal: &'a ChatGoal,
	pub length: ResponseLength,
}

impl RpcRequest for ConfigureChat<'_> {
	fn rpc_id(&self) -> RpcId {
		RpcId::ConfigureChat
	}

	fn notebook_scope(&self) -> Option<&str> {
		Some(self.notebook_id)
	}

	fn params(&self) -> Value {
		let settings = json!([self.goal.setting(), [self.length.code()]]);
		let update = Positional::<8>::empty().with(7, settings);
		json!([self.notebook_id, [update.into_value()]])
	}
}
