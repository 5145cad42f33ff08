//! Client construction and credential resolution.

use std::sync::Arc;

use nlm_runtime::{
	ClientConfig, CredentialBundle, HttpTransport, ReqwestTransport, RpcClient, SessionManager, SessionStore,
	StreamClient, parse_cookie_header,
};
use tracing::debug;

use crate::Result;

/// Raw `Cookie` header of a signed-in browser session.
pub const COOKIES_ENV: &str = "NOTEBOOKLM_COOKIES";
/// Optional CSRF token accompanying [`COOKIES_ENV`].
pub const CSRF_TOKEN_ENV: &str = "NOTEBOOKLM_CSRF_TOKEN";
/// Optional session id accompanying [`COOKIES_ENV`].
pub const SESSION_ID_ENV: &str = "NOTEBOOKLM_SESSION_ID";

/// Where a client's credentials come from.
#[derive(Debug, Clone)]
pub enum Credentials {
	/// In-memory bundle; refreshed tokens are persisted only when `store` is set.
	Bundle {
		bundle: CredentialBundle,
		store: Option<SessionStore>,
	},
	/// Loaded lazily from the credential file, refreshes written back.
	Store(SessionStore),
}

impl Credentials {
	/// Environment credentials when [`COOKIES_ENV`] is set, otherwise `store`.
	pub fn from_env_or(store: SessionStore) -> Self {
		Self::from_lookup(|name| std::env::var(name).ok(), store)
	}

	/// Resolves credentials through `lookup`, an environment accessor.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, store: SessionStore) -> Self {
		let set = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
		match set(COOKIES_ENV) {
			Some(header) => {
				debug!(target = "nlm", "using credentials from environment");
				let bundle = CredentialBundle::from_cookies(parse_cookie_header(&header))
					.with_tokens(set(CSRF_TOKEN_ENV), set(SESSION_ID_ENV));
				Self::Bundle { bundle, store: None }
			}
			None => Self::Store(store),
		}
	}

	fn into_session(self, transport: Arc<dyn HttpTransport>, config: ClientConfig) -> SessionManager {
		match self {
			Self::Bundle { bundle, store } => SessionManager::new(transport, config, bundle, store),
			Self::Store(store) => SessionManager::from_store(transport, config, store),
		}
	}
}

/// Entry point for all notebook operations.
///
/// Batched calls and streamed queries share one session, so a token refresh
/// triggered by either is visible to both.
pub struct NotebookClient {
	rpc: RpcClient,
	stream: StreamClient,
}

impl NotebookClient {
	/// Client over HTTPS.
	pub fn connect(config: ClientConfig, credentials: Credentials) -> Result<Self> {
		let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new()?);
		Ok(Self::with_transport(transport, config, credentials))
	}

	pub fn with_transport(transport: Arc<dyn HttpTransport>, config: ClientConfig, credentials: Credentials) -> Self {
		let session = Arc::new(credentials.into_session(transport.clone(), config));
		let rpc = RpcClient::new(session, transport);
		let stream = StreamClient::from_rpc(&rpc);
		Self { rpc, stream }
	}

	pub fn session(&self) -> &Arc<SessionManager> {
		self.rpc.session()
	}

	pub fn rpc(&self) -> &RpcClient {
		&self.rpc
	}

	pub(crate) fn stream(&self) -> &StreamClient {
		&self.stream
	}

	/// Validates the mandatory cookies without touching the network.
	pub async fn check_credentials(&self) -> Result<CredentialBundle> {
		self.session().current_credentials().await
	}
}
