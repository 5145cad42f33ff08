//! Batched RPC client.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use nlm_protocol::envelope::{RpcOutcome, StatusClass, find_rpc_result};
use nlm_protocol::rpc::BATCH_EXECUTE_PATH;
use nlm_protocol::{RpcCall, RpcRequest, decode_response, encode_request};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::{CredentialBundle, SessionManager};
use crate::transport::{HttpRequest, HttpTransport};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";
const REQID_STEP: u64 = 100_000;

/// Request id counter shared by batched and streamed calls. Starts from the
/// wall clock so ids differ between processes, as the web client's do.
#[derive(Debug)]
pub(crate) struct RequestIds(AtomicU64);

impl RequestIds {
	pub(crate) fn new() -> Self {
		let seed = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs() % REQID_STEP)
			.unwrap_or_default();
		Self::starting_at(seed)
	}

	pub(crate) fn starting_at(seed: u64) -> Self {
		Self(AtomicU64::new(seed))
	}

	pub(crate) fn next(&self) -> u64 {
		self.0.fetch_add(REQID_STEP, Ordering::Relaxed) + REQID_STEP
	}
}

/// Query parameters every service request carries.
pub(crate) fn append_common_query(url: &mut Url, config: &ClientConfig, creds: &CredentialBundle, reqid: u64) {
	let mut query = url.query_pairs_mut();
	query.append_pair("bl", &config.build_label);
	if let Some(sid) = creds.session_id.as_deref() {
		query.append_pair("f.sid", sid);
	}
	query
		.append_pair("hl", &config.language)
		.append_pair("_reqid", &reqid.to_string())
		.append_pair("rt", "c");
}

/// Headers of an authenticated XHR-style post.
pub(crate) fn authenticated_post(url: Url, body: String, config: &ClientConfig, creds: &CredentialBundle) -> HttpRequest {
	HttpRequest::post(url, body, config.request_timeout)
		.header("Content-Type", FORM_CONTENT_TYPE)
		.header("Origin", config.origin())
		.header("Referer", config.home_url())
		.header("Cookie", creds.cookie_header())
		.header("X-Same-Domain", "1")
		.header("User-Agent", config.user_agent.clone())
}

/// Maps HTTP status codes to error kinds; `context` names the call.
pub(crate) fn check_http_status(status: u16, context: &str) -> Result<()> {
	match status {
		200..=299 => Ok(()),
		401 | 403 => Err(Error::Auth(format!("{context}: HTTP {status}"))),
		429 => Err(Error::RateLimit(format!("{context}: HTTP 429"))),
		_ => Err(Error::Protocol(format!("{context}: unexpected HTTP {status}"))),
	}
}

/// Maps an in-band status code to an error.
pub(crate) fn status_error(code: i64, context: &str) -> Error {
	match StatusClass::of(code) {
		StatusClass::Unauthenticated => Error::Auth(format!("{context}: rejected with status {code}")),
		StatusClass::RateLimited => Error::RateLimit(format!("{context}: resource exhausted (status {code})")),
		StatusClass::Other => Error::Protocol(format!("{context}: failed with status {code}")),
	}
}

/// Issues batched RPC calls with session handling and error classification.
///
/// An authentication failure triggers one forced token refresh and a single
/// retry; every other failure is returned as is.
pub struct RpcClient {
	session: Arc<SessionManager>,
	transport: Arc<dyn HttpTransport>,
	reqids: Arc<RequestIds>,
}

impl RpcClient {
	pub fn new(session: Arc<SessionManager>, transport: Arc<dyn HttpTransport>) -> Self {
		Self::with_request_ids(session, transport, Arc::new(RequestIds::new()))
	}

	pub(crate) fn with_request_ids(
		session: Arc<SessionManager>,
		transport: Arc<dyn HttpTransport>,
		reqids: Arc<RequestIds>,
	) -> Self {
		Self {
			session,
			transport,
			reqids,
		}
	}

	pub fn session(&self) -> &Arc<SessionManager> {
		&self.session
	}

	pub(crate) fn request_ids(&self) -> &Arc<RequestIds> {
		&self.reqids
	}

	pub(crate) fn transport(&self) -> &Arc<dyn HttpTransport> {
		&self.transport
	}

	/// Runs a typed request.
	pub async fn execute<R: RpcRequest + ?Sized>(&self, request: &R) -> Result<Value> {
		self.call(&request.to_call()).await
	}

	/// Runs a logical call and returns its parsed payload.
	pub async fn call(&self, call: &RpcCall) -> Result<Value> {
		let creds = self.session.ensure_ephemeral_tokens().await?;
		match self.call_once(call, &creds).await {
			Err(err) if err.is_auth() => {
				warn!(target = "nlm", rpc = call.id.operation(), error = %err, "auth rejected, refreshing tokens and retrying once");
				let creds = self.session.refresh_after_rejection(&creds).await?;
				self.call_once(call, &creds).await
			}
			result => result,
		}
	}

	async fn call_once(&self, call: &RpcCall, creds: &CredentialBundle) -> Result<Value> {
		let config = self.session.config();
		let rpc_id = call.id.as_str();
		let reqid = self.reqids.next();

		let mut url = config.endpoint(BATCH_EXECUTE_PATH)?;
		url.query_pairs_mut()
			.append_pair("rpcids", rpc_id)
			.append_pair("source-path", &call.source_path);
		append_common_query(&mut url, config, creds, reqid);

		let body = encode_request(rpc_id, &call.params, creds.csrf_token.as_deref());
		let request = authenticated_post(url, body, config, creds);

		debug!(target = "nlm", rpc = call.id.operation(), id = rpc_id, reqid, source_path = %call.source_path, "rpc call");
		let response = self.transport.send(request).await?;
		let context = call.id.operation();
		check_http_status(response.status, context)?;

		let entries = decode_response(&response.body)?;
		match find_rpc_result(&entries, rpc_id) {
			RpcOutcome::Payload(value) => Ok(value),
			RpcOutcome::Status(code) => Err(status_error(code, context)),
			RpcOutcome::ServerError(entry) => Err(Error::Protocol(format!("{context}: server error entry {entry}"))),
			RpcOutcome::Missing => Err(Error::Protocol(format!("{context}: response has no result for {rpc_id}"))),
		}
	}
}
