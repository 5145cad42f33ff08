//! Streaming question answering.
//!
//! The query endpoint is not batched: each response frame is one update of
//! the answer being generated. The first payload element looks like
//!
//! ```text
//! [text, _, _, _, type_info]       type_info = [..., citations@3, ..., kind]
//! ```
//!
//! where the last element of `type_info` is `1` for answer text and `2` for a
//! thinking step. Answer frames are cumulative, so the last one is the full
//! answer.

use std::collections::VecDeque;
use std::mem;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt};
use nlm_protocol::codec::encode_stream_request;
use nlm_protocol::envelope::{RpcOutcome, result_payloads};
use nlm_protocol::params::query::StreamQuery;
use nlm_protocol::rpc::STREAM_QUERY_PATH;
use nlm_protocol::FrameDecoder;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::rpc::{RequestIds, RpcClient, append_common_query, authenticated_post, check_http_status, status_error};
use crate::session::SessionManager;
use crate::transport::{BodyStream, HttpTransport};

const KIND_ANSWER: i64 = 1;
const KIND_THINKING: i64 = 2;
const CONTEXT: &str = "query";

/// One update from the answer stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryEvent {
	/// Intermediate reasoning step.
	Thinking { text: String },
	/// Answer text so far.
	Answer { text: String },
	/// A source the answer draws on.
	Citation { source_id: String, raw: Value },
}

/// A question about a notebook's sources.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
	/// Sources to consult; empty lets the service decide.
	pub source_ids: Vec<String>,
	pub question: String,
	/// Continues an earlier conversation when set.
	pub conversation_id: Option<String>,
}

/// Events of one answer, tagged with the conversation they belong to.
pub struct QueryStream {
	conversation_id: String,
	events: BoxStream<'static, Result<QueryEvent>>,
}

impl QueryStream {
	/// Id to pass as `conversation_id` for follow-up questions.
	pub fn conversation_id(&self) -> &str {
		&self.conversation_id
	}
}

impl Stream for QueryStream {
	type Item = Result<QueryEvent>;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		self.events.poll_next_unpin(cx)
	}
}

/// A source cited by an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
	pub source_id: String,
	pub raw: Value,
}

/// A fully consumed answer stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryAnswer {
	pub conversation_id: String,
	pub answer: String,
	pub thinking: Vec<String>,
	pub citations: Vec<Citation>,
}

impl QueryAnswer {
	/// Folds a stream into its final answer; citations are deduplicated by
	/// source id in first-seen order.
	pub async fn collect(mut stream: QueryStream) -> Result<Self> {
		let mut answer = QueryAnswer {
			conversation_id: stream.conversation_id.clone(),
			..Self::default()
		};
		while let Some(event) = stream.next().await {
			match event? {
				QueryEvent::Answer { text } => answer.answer = text,
				QueryEvent::Thinking { text } => {
					if answer.thinking.last() != Some(&text) {
						answer.thinking.push(text);
					}
				}
				QueryEvent::Citation { source_id, raw } => {
					if !answer.citations.iter().any(|c| c.source_id == source_id) {
						answer.citations.push(Citation { source_id, raw });
					}
				}
			}
		}
		Ok(answer)
	}
}

/// Client for the streaming query endpoint. Shares credentials with the
/// batched client but not its framing.
pub struct StreamClient {
	session: Arc<SessionManager>,
	transport: Arc<dyn HttpTransport>,
	reqids: Arc<RequestIds>,
}

impl StreamClient {
	pub fn new(session: Arc<SessionManager>, transport: Arc<dyn HttpTransport>) -> Self {
		Self {
			session,
			transport,
			reqids: Arc::new(RequestIds::new()),
		}
	}

	/// Client sharing session, transport and request ids with `rpc`.
	pub fn from_rpc(rpc: &RpcClient) -> Self {
		Self {
			session: rpc.session().clone(),
			transport: rpc.transport().clone(),
			reqids: rpc.request_ids().clone(),
		}
	}

	/// Sends a question and returns its answer as a stream of events.
	///
	/// Auth and rate-limit failures are classified like batched calls but not
	/// retried.
	pub async fn query(&self, request: QueryRequest) -> Result<QueryStream> {
		if request.question.trim().is_empty() {
			return Err(Error::InvalidArgument("question must not be empty".into()));
		}
		let creds = self.session.ensure_ephemeral_tokens().await?;
		let config = self.session.config();
		let conversation_id = request
			.conversation_id
			.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

		let params = StreamQuery {
			source_ids: &request.source_ids,
			question: &request.question,
			conversation_id: &conversation_id,
		}
		.params();
		let body = encode_stream_request(&params, creds.csrf_token.as_deref());

		let mut url = config.endpoint(STREAM_QUERY_PATH)?;
		let reqid = self.reqids.next();
		append_common_query(&mut url, config, &creds, reqid);
		let mut http = authenticated_post(url, body, config, &creds);
		http.timeout = config.stream_timeout;

		debug!(target = "nlm", %conversation_id, sources = request.source_ids.len(), reqid, "streaming query");
		let response = self.transport.send_streaming(http).await?;
		check_http_status(response.status, CONTEXT)?;

		Ok(QueryStream {
			conversation_id,
			events: decode_events(response.body).boxed(),
		})
	}
}

struct DecodeState {
	body: BodyStream,
	decoder: FrameDecoder,
	pending: VecDeque<Result<QueryEvent>>,
	finished: bool,
}

/// Turns raw body chunks into events as soon as each frame completes.
fn decode_events(body: BodyStream) -> impl Stream<Item = Result<QueryEvent>> + Send {
	let state = DecodeState {
		body,
		decoder: FrameDecoder::new(),
		pending: VecDeque::new(),
		finished: false,
	};

	stream::unfold(state, |mut st| async move {
		loop {
			if let Some(event) = st.pending.pop_front() {
				if event.is_err() {
					st.pending.clear();
					st.finished = true;
					st.body = stream::empty().boxed();
				}
				return Some((event, st));
			}
			if st.finished {
				return None;
			}

			match st.decoder.next_frame() {
				Ok(Some(frame)) => st.pending.extend(frame_events(&frame.value)),
				Ok(None) => match st.body.next().await {
					Some(Ok(chunk)) => st.decoder.push(&chunk),
					Some(Err(err)) => {
						st.finished = true;
						return Some((Err(err), st));
					}
					None => {
						st.finished = true;
						if let Err(err) = mem::take(&mut st.decoder).finish() {
							return Some((Err(err.into()), st));
						}
					}
				},
				Err(err) => {
					st.finished = true;
					return Some((Err(err.into()), st));
				}
			}
		}
	})
}

/// Events carried by one frame, in payload order.
fn frame_events(frame: &Value) -> Vec<Result<QueryEvent>> {
	let mut events = Vec::new();
	for outcome in result_payloads(frame) {
		match outcome {
			RpcOutcome::Payload(payload) => events.extend(payload_events(&payload).into_iter().map(Ok)),
			RpcOutcome::Status(code) => events.push(Err(status_error(code, CONTEXT))),
			RpcOutcome::ServerError(_) | RpcOutcome::Missing => {}
		}
	}
	events
}

fn payload_events(payload: &Value) -> Vec<QueryEvent> {
	let Some(first) = payload.get(0).and_then(Value::as_array) else {
		return Vec::new();
	};
	let text = first.first().and_then(Value::as_str);
	let type_info = first.get(4).and_then(Value::as_array);
	let kind = type_info.and_then(|info| info.last()).and_then(Value::as_i64);

	let mut events = Vec::new();
	match (kind, text) {
		(Some(KIND_ANSWER), Some(text)) => events.push(QueryEvent::Answer { text: text.to_string() }),
		(Some(KIND_THINKING), Some(text)) => events.push(QueryEvent::Thinking { text: text.to_string() }),
		_ => {}
	}

	let citations = type_info
		.and_then(|info| info.get(3))
		.and_then(Value::as_array)
		.into_iter()
		.flatten();
	for raw in citations {
		if let Some(source_id) = first_string(raw) {
			events.push(QueryEvent::Citation {
				source_id: source_id.to_string(),
				raw: raw.clone(),
			});
		}
	}
	events
}

/// Depth-first first string; citation entries nest the source id.
fn first_string(value: &Value) -> Option<&str> {
	match value {
		Value::String(s) => Some(s),
		Value::Array(items) => items.iter().find_map(first_string),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use nlm_protocol::codec::{encode_frames, parse_request_body};
	use serde_json::json;

	use super::*;
	use crate::config::ClientConfig;
	use crate::session::{CredentialBundle, parse_cookie_header};
	use crate::transport::mock::MockTransport;

	fn client(transport: &Arc<MockTransport>) -> StreamClient {
		let bundle = CredentialBundle::from_cookies(parse_cookie_header("SID=1; HSID=2; SSID=3; APISID=4; SAPISID=5"))
			.with_tokens(Some("csrf".into()), Some("sid".into()));
		let session = Arc::new(SessionManager::new(transport.clone(), ClientConfig::default(), bundle, None));
		StreamClient::new(session, transport.clone())
	}

	fn event_frame(text: &str, kind: i64, citations: Value) -> Value {
		let payload = json!([[text, null, null, null, [null, null, null, citations, kind]]]);
		json!([["wrb.fr", null, payload.to_string()]])
	}

	fn chunked(body: Vec<u8>, size: usize) -> Vec<Vec<u8>> {
		body.chunks(size).map(<[u8]>::to_vec).collect()
	}

	fn request(question: &str) -> QueryRequest {
		QueryRequest {
			source_ids: vec!["s1".into()],
			question: question.into(),
			conversation_id: None,
		}
	}

	#[tokio::test]
	async fn events_arrive_in_order_across_chunk_boundaries() {
		let body = encode_frames(&[
			event_frame("Looking at sources", 2, json!([])),
			event_frame("Rust is", 1, json!([])),
			json!([["di", 42]]),
			event_frame("Rust is fast.", 1, json!([[["s1"], [0, 10]]])),
		]);
		let transport = Arc::new(MockTransport::new());
		transport.reply_stream(200, chunked(body, 7));

		let stream = client(&transport).query(request("why rust?")).await.unwrap();
		let events: Vec<_> = stream.map(|e| e.unwrap()).collect().await;
		assert_eq!(
			events,
			vec![
				QueryEvent::Thinking {
					text: "Looking at sources".into()
				},
				QueryEvent::Answer { text: "Rust is".into() },
				QueryEvent::Answer {
					text: "Rust is fast.".into()
				},
				QueryEvent::Citation {
					source_id: "s1".into(),
					raw: json!([["s1"], [0, 10]])
				},
			]
		);
	}

	#[tokio::test]
	async fn request_uses_unbatched_envelope_and_fresh_conversation() {
		let transport = Arc::new(MockTransport::new());
		transport.reply_stream(200, vec![encode_frames(std::iter::empty())]);
		let stream = client(&transport).query(request("q")).await.unwrap();
		let conversation_id = stream.conversation_id().to_string();
		assert_eq!(uuid::Uuid::parse_str(&conversation_id).unwrap().get_version_num(), 4);

		let sent = &transport.requests()[0];
		assert!(sent.url.path().ends_with("/GenerateFreeFormStreamed"));
		assert_eq!(sent.query_param("f.sid").as_deref(), Some("sid"));
		assert_eq!(sent.query_param("rpcids"), None);
		let body = parse_request_body(sent.body.as_deref().unwrap()).unwrap();
		assert_eq!(body.rpc_id, None);
		assert_eq!(body.params, json!([[[[["s1"]]]], "q", null, [2, null, [1]], conversation_id]));
		assert_eq!(body.csrf_token.as_deref(), Some("csrf"));
	}

	#[tokio::test]
	async fn collect_keeps_last_answer_and_unique_citations() {
		let body = encode_frames(&[
			event_frame("step", 2, json!([])),
			event_frame("step", 2, json!([])),
			event_frame("A", 1, json!([[["s1"]]])),
			event_frame("AB", 1, json!([[["s1"]], [["s2"]]])),
		]);
		let transport = Arc::new(MockTransport::new());
		transport.reply_stream(200, vec![body]);
		let mut req = request("q");
		req.conversation_id = Some("conv-1".into());

		let answer = QueryAnswer::collect(client(&transport).query(req).await.unwrap()).await.unwrap();
		assert_eq!(answer.conversation_id, "conv-1");
		assert_eq!(answer.answer, "AB");
		assert_eq!(answer.thinking, vec!["step".to_string()]);
		let ids: Vec<_> = answer.citations.iter().map(|c| c.source_id.as_str()).collect();
		assert_eq!(ids, vec!["s1", "s2"]);
	}

	#[tokio::test]
	async fn truncated_stream_ends_with_protocol_error() {
		let mut body = encode_frames(&[event_frame("partial", 1, json!([]))]);
		body.extend_from_slice(b"500\n[[\"wrb.fr\"");
		let transport = Arc::new(MockTransport::new());
		transport.reply_stream(200, vec![body]);

		let events: Vec<_> = client(&transport).query(request("q")).await.unwrap().collect().await;
		assert_eq!(events.len(), 2);
		assert!(events[0].is_ok());
		assert!(matches!(events[1], Err(Error::Protocol(_))));
	}

	#[tokio::test]
	async fn in_band_status_is_classified() {
		let body = encode_frames(&[json!([["wrb.fr", null, null, null, null, [8]]])]);
		let transport = Arc::new(MockTransport::new());
		transport.reply_stream(200, vec![body]);
		let events: Vec<_> = client(&transport).query(request("q")).await.unwrap().collect().await;
		assert_eq!(events.len(), 1);
		assert!(events[0].as_ref().unwrap_err().is_rate_limited());
	}

	#[tokio::test]
	async fn http_auth_failure_is_not_retried() {
		let transport = Arc::new(MockTransport::new());
		transport.reply_stream(401, vec![]);
		let err = client(&transport).query(request("q")).await.err().unwrap();
		assert!(err.is_auth());
		assert_eq!(transport.request_count(), 1);
	}

	#[tokio::test]
	async fn empty_question_is_rejected_before_network() {
		let transport = Arc::new(MockTransport::new());
		let err = client(&transport).query(request("  ")).await.err().unwrap();
		assert!(matches!(err, Error::InvalidArgument(_)));
		assert_eq!(transport.request_count(), 0);
	}
}
