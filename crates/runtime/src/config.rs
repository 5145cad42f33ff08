//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://notebooklm.google.com";

/// Frontend build label sent as `bl`. The service accepts stale labels for a
/// while, but this will eventually need bumping.
pub const DEFAULT_BUILD_LABEL: &str = "boq_labs-tailwind-frontend_20251221.14_p0";

pub const DEFAULT_LANGUAGE: &str = "en";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// Settings shared by every component talking to the service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Service origin, e.g. `https://notebooklm.google.com`.
	pub base_url: String,
	pub build_label: String,
	/// Value of the `hl` query parameter.
	pub language: String,
	/// Timeout for batched RPC requests.
	pub request_timeout: Duration,
	/// Timeout for a whole streamed answer, which can take a while to finish.
	pub stream_timeout: Duration,
	/// Timeout for the home-page fetch during token refresh.
	pub page_fetch_timeout: Duration,
	pub user_agent: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			build_label: DEFAULT_BUILD_LABEL.to_string(),
			language: DEFAULT_LANGUAGE.to_string(),
			request_timeout: Duration::from_secs(30),
			stream_timeout: Duration::from_secs(120),
			page_fetch_timeout: Duration::from_secs(15),
			user_agent: DEFAULT_USER_AGENT.to_string(),
		}
	}
}

impl ClientConfig {
	/// Points the client at another origin, e.g. an emulated service in tests.
	pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
		Url::parse(base_url).map_err(|e| Error::InvalidArgument(format!("invalid base URL '{base_url}': {e}")))?;
		self.base_url = base_url.trim_end_matches('/').to_string();
		Ok(self)
	}

	pub fn with_build_label(mut self, label: impl Into<String>) -> Self {
		self.build_label = label.into();
		self
	}

	pub fn with_language(mut self, language: impl Into<String>) -> Self {
		self.language = language.into();
		self
	}

	/// Absolute URL of a service path.
	pub fn endpoint(&self, path: &str) -> Result<Url> {
		Url::parse(&self.base_url)
			.and_then(|base| base.join(path))
			.map_err(|e| Error::InvalidArgument(format!("invalid endpoint '{}{path}': {e}", self.base_url)))
	}

	/// Service origin without a trailing slash, for `Origin` headers.
	pub fn origin(&self) -> String {
		self.base_url.trim_end_matches('/').to_string()
	}

	/// Service home page, fetched to refresh tokens and sent as `Referer`.
	pub fn home_url(&self) -> String {
		format!("{}/", self.origin())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn endpoint_joins_absolute_paths() {
		let config = ClientConfig::default().with_base_url("http://127.0.0.1:8080").unwrap();
		assert_eq!(
			config.endpoint("/_/LabsTailwindUi/data/batchexecute").unwrap().as_str(),
			"http://127.0.0.1:8080/_/LabsTailwindUi/data/batchexecute"
		);
		assert_eq!(config.origin(), "http://127.0.0.1:8080");
		assert_eq!(config.home_url(), "http://127.0.0.1:8080/");
	}

	#[test]
	fn rejects_invalid_base_url() {
		assert!(matches!(
			ClientConfig::default().with_base_url("not a url"),
			Err(Error::InvalidArgument(_))
		));
	}
}
