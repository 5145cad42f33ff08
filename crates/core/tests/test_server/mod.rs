//! In-process emulation of the notebook service.
//!
//! Serves the home page with tokens, the batched RPC endpoint with scripted
//! replies per RPC id, and the streaming query endpoint. Every request is
//! recorded for assertions.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use nlm::{ClientConfig, CredentialBundle, Credentials, NotebookClient};
use nlm_protocol::codec::{encode_frames, parse_request_body};
use nlm_protocol::rpc::{BATCH_EXECUTE_PATH, STREAM_QUERY_PATH};
use nlm_runtime::parse_cookie_header;
use parking_lot::Mutex;
use serde_json::{Value, json};

pub const COOKIES: &str = "SID=a; HSID=b; SSID=c; APISID=d; SAPISID=e; __Secure-1PSID=f";

/// What the batched endpoint answers for one call.
#[derive(Debug, Clone)]
pub enum Reply {
	Payload(Value),
	/// In-band status code, e.g. 16 for an expired session.
	Status(i64),
	Http(u16),
}

/// A request received by the emulator.
#[derive(Debug, Clone)]
pub struct Recorded {
	pub rpc_id: Option<String>,
	pub params: Value,
	pub csrf_token: Option<String>,
	pub query: HashMap<String, String>,
}

#[derive(Default)]
struct Inner {
	csrf_token: String,
	session_id: Option<String>,
	/// Batched calls carrying another token are rejected as unauthenticated.
	enforce_csrf: bool,
	page_fetches: usize,
	replies: HashMap<String, VecDeque<Reply>>,
	stream_frames: Vec<Value>,
	calls: Vec<Recorded>,
	streams: Vec<Recorded>,
}

#[derive(Clone)]
pub struct TestServer {
	addr: SocketAddr,
	inner: Arc<Mutex<Inner>>,
}

impl TestServer {
	pub async fn start() -> Self {
		let inner = Arc::new(Mutex::new(Inner {
			csrf_token: "csrf-live".to_string(),
			session_id: Some("sid-live".to_string()),
			..Inner::default()
		}));
		let app = Router::new()
			.route("/", get(home))
			.route(BATCH_EXECUTE_PATH, post(batch))
			.route(STREAM_QUERY_PATH, post(stream))
			.with_state(inner.clone());

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});
		Self { addr, inner }
	}

	pub fn base_url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn config(&self) -> ClientConfig {
		ClientConfig::default().with_base_url(&self.base_url()).unwrap()
	}

	/// Client holding cookies only, so the first call fetches tokens.
	pub fn client(&self) -> NotebookClient {
		self.client_with(CredentialBundle::from_cookies(parse_cookie_header(COOKIES)))
	}

	pub fn client_with(&self, bundle: CredentialBundle) -> NotebookClient {
		NotebookClient::connect(self.config(), Credentials::Bundle { bundle, store: None }).unwrap()
	}

	/// Tokens served by the home page from now on.
	pub fn set_tokens(&self, csrf_token: &str, session_id: Option<&str>) {
		let mut inner = self.inner.lock();
		inner.csrf_token = csrf_token.to_string();
		inner.session_id = session_id.map(str::to_string);
	}

	pub fn enforce_csrf(&self) {
		self.inner.lock().enforce_csrf = true;
	}

	/// Queues a reply for `rpc_id`; the last queued reply repeats.
	pub fn on(&self, rpc_id: &str, reply: Reply) -> &Self {
		self.inner.lock().replies.entry(rpc_id.to_string()).or_default().push_back(reply);
		self
	}

	pub fn payload(&self, rpc_id: &str, payload: Value) -> &Self {
		self.on(rpc_id, Reply::Payload(payload))
	}

	pub fn stream_frames(&self, frames: Vec<Value>) {
		self.inner.lock().stream_frames = frames;
	}

	pub fn page_fetches(&self) -> usize {
		self.inner.lock().page_fetches
	}

	pub fn calls(&self) -> Vec<Recorded> {
		self.inner.lock().calls.clone()
	}

	pub fn calls_to(&self, rpc_id: &str) -> Vec<Recorded> {
		self.calls()
			.into_iter()
			.filter(|c| c.rpc_id.as_deref() == Some(rpc_id))
			.collect()
	}

	pub fn streams(&self) -> Vec<Recorded> {
		self.inner.lock().streams.clone()
	}
}

/// Payload of a query event frame.
pub fn answer_frame(text: &str, kind: i64) -> Value {
	let payload = json!([[text, null, null, null, [null, null, null, [], kind]]]);
	json!([["wrb.fr", null, payload.to_string()]])
}

fn record(body: &str, query: HashMap<String, String>) -> Recorded {
	let parsed = parse_request_body(body).unwrap_or_else(|| panic!("unparseable request body: {body}"));
	Recorded {
		rpc_id: parsed.rpc_id,
		params: parsed.params,
		csrf_token: parsed.csrf_token,
		query,
	}
}

async fn home(State(inner): State<Arc<Mutex<Inner>>>) -> String {
	let mut inner = inner.lock();
	inner.page_fetches += 1;
	let mut tokens = format!(r#""SNlM0e":"{}""#, inner.csrf_token);
	if let Some(sid) = &inner.session_id {
		tokens.push_str(&format!(r#","FdrFJe":"{sid}""#));
	}
	format!("<html><script>window.WIZ_global_data = {{{tokens}}};</script></html>")
}

async fn batch(
	State(inner): State<Arc<Mutex<Inner>>>,
	Query(query): Query<HashMap<String, String>>,
	body: String,
) -> (StatusCode, Vec<u8>) {
	let call = record(&body, query);
	let rpc_id = call.rpc_id.clone().unwrap_or_default();
	assert_eq!(query_id(&call), Some(rpc_id.as_str()), "rpcids query must match the body");

	let mut inner = inner.lock();
	let stale = inner.enforce_csrf && call.csrf_token.as_deref() != Some(inner.csrf_token.as_str());
	inner.calls.push(call);
	if stale {
		return ok(encode_frames(&[status_entry(&rpc_id, 16)]));
	}

	let reply = match inner.replies.get_mut(&rpc_id) {
		Some(queue) if queue.len() > 1 => queue.pop_front(),
		Some(queue) => queue.front().cloned(),
		None => None,
	};
	match reply.unwrap_or(Reply::Payload(json!([]))) {
		Reply::Payload(payload) => ok(encode_frames(&[
			json!([["wrb.fr", rpc_id, payload.to_string(), null, null, null, "generic"], ["di", 87]]),
			json!([["af.httprm", 86, "-1234", 19]]),
		])),
		Reply::Status(code) => ok(encode_frames(&[status_entry(&rpc_id, code)])),
		Reply::Http(status) => (StatusCode::from_u16(status).unwrap(), Vec::new()),
	}
}

fn query_id(call: &Recorded) -> Option<&str> {
	call.query.get("rpcids").map(String::as_str)
}

fn status_entry(rpc_id: &str, code: i64) -> Value {
	json!([["wrb.fr", rpc_id, null, null, null, [code], "generic"]])
}

fn ok(body: Vec<u8>) -> (StatusCode, Vec<u8>) {
	(StatusCode::OK, body)
}

async fn stream(
	State(inner): State<Arc<Mutex<Inner>>>,
	Query(query): Query<HashMap<String, String>>,
	body: String,
) -> (StatusCode, Vec<u8>) {
	let call = record(&body, query);
	let mut inner = inner.lock();
	inner.streams.push(call);
	ok(encode_frames(&inner.stream_frames))
}
