//! Optional per-user settings in `$XDG_CONFIG_HOME/nlm/config.json`.
//!
//! ```json
//! {
//!   "base_url": "https://notebooklm.google.com",
//!   "build_label": "boq_labs-tailwind-frontend_20251221.14_p0",
//!   "language": "de",
//!   "poll_interval_secs": 15,
//!   "poll_max_wait_secs": 600
//! }
//! ```
//!
//! Every field is optional; a missing file means defaults throughout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use nlm::{ClientConfig, PollOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::PollArgs;
use crate::error::{CliError, Result};

const CONFIG_DIR: &str = "nlm";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
	pub base_url: Option<String>,
	pub build_label: Option<String>,
	pub language: Option<String>,
	pub poll_interval_secs: Option<u64>,
	pub poll_max_wait_secs: Option<u64>,
}

impl CliConfig {
	/// Loads `explicit`, or the default location when it exists.
	pub fn load(explicit: Option<&Path>) -> Result<Self> {
		match explicit {
			Some(path) => Self::read(path),
			None => match default_path() {
				Some(path) if path.is_file() => Self::read(&path),
				_ => Ok(Self::default()),
			},
		}
	}

	fn read(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)?;
		let config: Self = serde_json::from_str(&content).map_err(|e| CliError::Config {
			path: path.to_path_buf(),
			message: e.to_string(),
		})?;
		if config.poll_interval_secs == Some(0) {
			return Err(CliError::Config {
				path: path.to_path_buf(),
				message: "poll_interval_secs must be at least 1".into(),
			});
		}
		debug!(target = "nlm", path = %path.display(), "loaded config");
		Ok(config)
	}

	pub fn client_config(&self) -> Result<ClientConfig> {
		let mut config = ClientConfig::default();
		if let Some(base_url) = &self.base_url {
			config = config.with_base_url(base_url)?;
		}
		if let Some(label) = &self.build_label {
			config = config.with_build_label(label);
		}
		if let Some(language) = &self.language {
			config = config.with_language(language);
		}
		Ok(config)
	}

	/// Poll settings: command-line flags, then this file, then the defaults.
	pub fn poll_options(&self, args: &PollArgs) -> PollOptions {
		let defaults = PollOptions::default();
		let interval = args.interval.or(self.poll_interval_secs).map(Duration::from_secs);
		let max_wait = args.max_wait.or(self.poll_max_wait_secs).map(Duration::from_secs);
		PollOptions::new(
			interval.unwrap_or(defaults.interval),
			max_wait.unwrap_or(defaults.max_wait),
		)
	}
}

/// `$XDG_CONFIG_HOME/nlm/config.json`, falling back to `~/.config`.
pub fn default_path() -> Option<PathBuf> {
	let base = std::env::var_os("XDG_CONFIG_HOME")
		.filter(|dir| !dir.is_empty())
		.map(PathBuf::from)
		.or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
	Some(base.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
	use tempfile::TempDir;

	use super::*;

	fn write(dir: &TempDir, content: &str) -> PathBuf {
		let path = dir.path().join("config.json");
		std::fs::write(&path, content).unwrap();
		path
	}

	#[test]
	fn overrides_apply_to_client_config() {
		let dir = TempDir::new().unwrap();
		let path = write(&dir, r#"{"base_url": "http://127.0.0.1:9000/", "language": "de"}"#);

		let config = CliConfig::load(Some(&path)).unwrap().client_config().unwrap();
		assert_eq!(config.base_url, "http://127.0.0.1:9000");
		assert_eq!(config.language, "de");
		assert_eq!(config.build_label, ClientConfig::default().build_label);
	}

	#[test]
	fn flags_beat_file_beats_defaults() {
		let config = CliConfig {
			poll_interval_secs: Some(10),
			poll_max_wait_secs: Some(60),
			..CliConfig::default()
		};
		let args = PollArgs {
			interval: Some(2),
			max_wait: None,
		};
		let options = config.poll_options(&args);
		assert_eq!(options.interval, Duration::from_secs(2));
		assert_eq!(options.max_wait, Duration::from_secs(60));

		let options = CliConfig::default().poll_options(&PollArgs::default());
		assert_eq!(options, PollOptions::default());
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let dir = TempDir::new().unwrap();
		let path = write(&dir, r#"{"langauge": "de"}"#);
		assert!(matches!(CliConfig::load(Some(&path)), Err(CliError::Config { .. })));
	}

	#[test]
	fn zero_poll_interval_is_rejected() {
		let dir = TempDir::new().unwrap();
		let path = write(&dir, r#"{"poll_interval_secs": 0}"#);
		match CliConfig::load(Some(&path)) {
			Err(CliError::Config { message, .. }) => assert!(message.contains("poll_interval_secs")),
			other => panic!("expected config error, got {other:?}"),
		}
	}

	#[test]
	fn explicit_missing_file_is_an_error() {
		let dir = TempDir::new().unwrap();
		assert!(matches!(CliConfig::load(Some(&dir.path().join("nope.json"))), Err(CliError::Io(_))));
	}
}
