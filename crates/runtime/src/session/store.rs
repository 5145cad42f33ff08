//! Persisted credential bundle.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cookies::{self, CookieJar};
use crate::error::{Error, Result};

/// Environment variable overriding the credential file location.
pub const AUTH_FILE_ENV: &str = "NLM_AUTH_FILE";

const AUTH_DIR: &str = ".notebooklm-consumer";
const AUTH_FILE: &str = "auth.json";

/// Cookies plus the tokens derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialBundle {
	pub cookies: CookieJar,
	#[serde(default)]
	pub csrf_token: Option<String>,
	#[serde(default)]
	pub session_id: Option<String>,
	/// Unix seconds of the last successful capture or refresh.
	#[serde(default)]
	pub extracted_at: Option<f64>,
}

impl CredentialBundle {
	/// Bundle from captured cookies, filtered to the allow-list.
	pub fn from_cookies(cookies: CookieJar) -> Self {
		Self {
			cookies: cookies::filter_allowed(cookies),
			..Self::default()
		}
	}

	pub fn with_tokens(mut self, csrf_token: Option<String>, session_id: Option<String>) -> Self {
		self.csrf_token = csrf_token;
		self.session_id = session_id;
		self.normalize();
		self
	}

	/// Whether both ephemeral tokens are known.
	pub fn has_tokens(&self) -> bool {
		self.csrf_token.is_some() && self.session_id.is_some()
	}

	pub fn clear_tokens(&mut self) {
		self.csrf_token = None;
		self.session_id = None;
	}

	pub fn stamp(&mut self) {
		self.extracted_at = Some(unix_now());
	}

	pub fn cookie_header(&self) -> String {
		cookies::cookie_header(&self.cookies)
	}

	/// Older files store unknown tokens as empty strings.
	fn normalize(&mut self) {
		for token in [&mut self.csrf_token, &mut self.session_id] {
			if token.as_deref().is_some_and(|t| t.trim().is_empty()) {
				*token = None;
			}
		}
	}
}

fn unix_now() -> f64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs_f64())
		.unwrap_or_default()
}

/// Reads and writes the credential file.
#[derive(Debug, Clone)]
pub struct SessionStore {
	path: PathBuf,
}

impl SessionStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Store at `$NLM_AUTH_FILE`, or `~/.notebooklm-consumer/auth.json`.
	pub fn at_default_location() -> Result<Self> {
		Self::default_path().map(Self::new)
	}

	pub fn default_path() -> Result<PathBuf> {
		if let Some(path) = std::env::var_os(AUTH_FILE_ENV).filter(|p| !p.is_empty()) {
			return Ok(PathBuf::from(path));
		}
		dirs::home_dir()
			.map(|home| home.join(AUTH_DIR).join(AUTH_FILE))
			.ok_or_else(|| Error::InvalidArgument("cannot determine home directory for the credential file".into()))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Loads the bundle; `None` when no file exists yet.
	pub fn load(&self) -> Result<Option<CredentialBundle>> {
		let content = match fs::read_to_string(&self.path) {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(e.into()),
		};
		let mut bundle: CredentialBundle = serde_json::from_str(&content)?;
		bundle.normalize();
		debug!(target = "nlm", path = %self.path.display(), cookies = bundle.cookies.len(), "loaded credentials");
		Ok(Some(bundle))
	}

	/// Writes the bundle, readable only by the owner on unix.
	pub fn save(&self, bundle: &CredentialBundle) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent)?;
		}
		let content = serde_json::to_string_pretty(bundle)?;

		let mut options = fs::OpenOptions::new();
		options.write(true).create(true).truncate(true);
		#[cfg(unix)]
		{
			use std::os::unix::fs::OpenOptionsExt;
			options.mode(0o600);
		}
		let mut file = options.open(&self.path)?;
		// `mode` only applies on creation; narrow an older file before writing.
		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			file.set_permissions(fs::Permissions::from_mode(0o600))?;
		}
		file.write_all(content.as_bytes())?;
		debug!(target = "nlm", path = %self.path.display(), "saved credentials");
		Ok(())
	}
}
