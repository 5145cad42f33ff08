//! Authentication session.
//!
//! A session starts from browser cookies (captured externally) and derives
//! two short-lived tokens from the service home page on demand:
//!
//! ```text
//! Unloaded --load--> Loaded(cookies only) --refresh--> Loaded(cookies + tokens)
//!                          ^                                   |
//!                          +------ invalidate / save_explicit -+
//! ```
//!
//! Refresh runs under one async lock, so concurrent callers that find the
//! tokens missing trigger a single page fetch. A manager refreshes at most
//! once until it is explicitly invalidated, which keeps a broken page layout
//! from turning every call into a refetch.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::transport::{HttpRequest, HttpTransport};

pub mod cookies;
pub mod store;
pub mod tokens;

pub use cookies::{CookieJar, parse_cookie_header};
pub use store::{CredentialBundle, SessionStore};
pub use tokens::{PageTokens, extract_tokens};

const ACCOUNTS_HOST: &str = "accounts.google.com";

/// Headers that make the home-page fetch look like a browser navigation.
const PAGE_FETCH_HEADERS: [(&str, &str); 10] = [
	("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8"),
	("Accept-Language", "en-US,en;q=0.9"),
	("Sec-Fetch-Dest", "document"),
	("Sec-Fetch-Mode", "navigate"),
	("Sec-Fetch-Site", "none"),
	("Sec-Fetch-User", "?1"),
	("Upgrade-Insecure-Requests", "1"),
	("sec-ch-ua", "\"Google Chrome\";v=\"143\", \"Chromium\";v=\"143\", \"Not A(Brand\";v=\"24\""),
	("sec-ch-ua-mobile", "?0"),
	("sec-ch-ua-platform", "\"macOS\""),
];

#[derive(Debug, Default)]
struct State {
	bundle: Option<CredentialBundle>,
	refresh_attempted: bool,
}

/// Owns the live credential bundle.
pub struct SessionManager {
	transport: Arc<dyn HttpTransport>,
	config: ClientConfig,
	store: Option<SessionStore>,
	state: Mutex<State>,
}

impl SessionManager {
	/// Manager over an in-memory bundle, optionally persisted to `store`.
	pub fn new(
		transport: Arc<dyn HttpTransport>,
		config: ClientConfig,
		bundle: CredentialBundle,
		store: Option<SessionStore>,
	) -> Self {
		Self {
			transport,
			config,
			store,
			state: Mutex::new(State {
				bundle: Some(bundle),
				refresh_attempted: false,
			}),
		}
	}

	/// Manager that loads its bundle from `store` on first use.
	pub fn from_store(transport: Arc<dyn HttpTransport>, config: ClientConfig, store: SessionStore) -> Self {
		Self {
			transport,
			config,
			store: Some(store),
			state: Mutex::new(State::default()),
		}
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	pub fn store(&self) -> Option<&SessionStore> {
		self.store.as_ref()
	}

	/// Current bundle, validated for mandatory cookies. Never touches the
	/// network.
	pub async fn current_credentials(&self) -> Result<CredentialBundle> {
		let mut state = self.state.lock().await;
		self.loaded(&mut state).cloned()
	}

	/// Bundle with tokens, fetching the home page when they are missing and
	/// no refresh has been attempted yet.
	pub async fn ensure_ephemeral_tokens(&self) -> Result<CredentialBundle> {
		let mut state = self.state.lock().await;
		let bundle = self.loaded(&mut state)?.clone();
		if bundle.has_tokens() {
			return Ok(bundle);
		}
		if !state.refresh_attempted {
			return self.refresh_locked(&mut state).await;
		}
		// The session id is optional; the page simply may not carry one.
		if bundle.csrf_token.is_some() {
			return Ok(bundle);
		}
		Err(Error::Auth(
			"no CSRF token available and the token refresh already failed; capture fresh cookies".into(),
		))
	}

	/// Discards the tokens and refreshes them now.
	pub async fn force_refresh(&self) -> Result<CredentialBundle> {
		let mut state = self.state.lock().await;
		self.loaded(&mut state)?;
		if let Some(bundle) = state.bundle.as_mut() {
			bundle.clear_tokens();
		}
		self.refresh_locked(&mut state).await
	}

	/// Refreshes after `rejected` was turned away by the service.
	///
	/// When the live tokens already differ from the rejected ones, another
	/// caller refreshed while this one waited for the lock and the live bundle
	/// is returned without fetching the page again.
	pub async fn refresh_after_rejection(&self, rejected: &CredentialBundle) -> Result<CredentialBundle> {
		let mut state = self.state.lock().await;
		let current = self.loaded(&mut state)?;
		let replaced = current.csrf_token.is_some()
			&& (current.csrf_token != rejected.csrf_token || current.session_id != rejected.session_id);
		if replaced {
			debug!(target = "nlm", "reusing tokens refreshed by a concurrent call");
			return Ok(current.clone());
		}
		if let Some(bundle) = state.bundle.as_mut() {
			bundle.clear_tokens();
		}
		self.refresh_locked(&mut state).await
	}

	/// Re-arms the refresh so the next `ensure_ephemeral_tokens` fetches again.
	pub async fn invalidate(&self) {
		let mut state = self.state.lock().await;
		if let Some(bundle) = state.bundle.as_mut() {
			bundle.clear_tokens();
		}
		state.refresh_attempted = false;
	}

	/// Replaces the cookie set with freshly captured cookies and persists it.
	///
	/// Tokens are cleared so they are derived again from the new cookies.
	pub async fn save_explicit(&self, cookies: CookieJar) -> Result<CredentialBundle> {
		let mut bundle = CredentialBundle::from_cookies(cookies);
		cookies::validate(&bundle.cookies)?;
		bundle.stamp();
		if let Some(store) = &self.store {
			store.save(&bundle)?;
		}

		let mut state = self.state.lock().await;
		state.bundle = Some(bundle.clone());
		state.refresh_attempted = false;
		info!(target = "nlm", cookies = bundle.cookies.len(), "saved new session cookies");
		Ok(bundle)
	}

	fn loaded<'s>(&self, state: &'s mut State) -> Result<&'s CredentialBundle> {
		if state.bundle.is_none() {
			let bundle = match &self.store {
				Some(store) => store.load()?.ok_or_else(|| {
					Error::Auth(format!(
						"no credentials found at {}; run `nlm auth save` with cookies from a signed-in browser",
						store.path().display()
					))
				})?,
				None => return Err(Error::Auth("no credentials configured".into())),
			};
			state.bundle = Some(bundle);
		}
		let bundle = state
			.bundle
			.as_ref()
			.ok_or_else(|| Error::Auth("no credentials configured".into()))?;
		cookies::validate(&bundle.cookies)?;
		Ok(bundle)
	}

	async fn refresh_locked(&self, state: &mut State) -> Result<CredentialBundle> {
		state.refresh_attempted = true;
		let cookie_header = self.loaded(state)?.cookie_header();

		info!(target = "nlm", "refreshing session tokens from home page");
		let url = self.config.endpoint("/")?;
		let mut request = HttpRequest::get(url, self.config.page_fetch_timeout)
			.header("User-Agent", self.config.user_agent.clone())
			.header("Cookie", cookie_header);
		for (name, value) in PAGE_FETCH_HEADERS {
			request = request.header(name, value);
		}

		let response = self.transport.send(request).await?;
		if response.url.host_str() == Some(ACCOUNTS_HOST) {
			return Err(Error::Auth(
				"cookies have expired (redirected to sign-in); capture fresh cookies".into(),
			));
		}
		if response.status != 200 {
			return Err(Error::Auth(format!("home page fetch failed with HTTP {}", response.status)));
		}

		let tokens = extract_tokens(&response.text())?;
		if tokens.session_id.is_none() {
			warn!(target = "nlm", "session id marker not found; continuing without f.sid");
		}

		let bundle = state
			.bundle
			.as_mut()
			.ok_or_else(|| Error::Auth("no credentials configured".into()))?;
		bundle.csrf_token = Some(tokens.csrf_token);
		bundle.session_id = tokens.session_id;
		bundle.stamp();
		let refreshed = bundle.clone();

		if let Some(store) = &self.store {
			if let Err(e) = store.save(&refreshed) {
				warn!(target = "nlm", error = %e, "failed to persist refreshed tokens");
			}
		}
		debug!(target = "nlm", has_session_id = refreshed.session_id.is_some(), "session tokens refreshed");
		Ok(refreshed)
	}
}
