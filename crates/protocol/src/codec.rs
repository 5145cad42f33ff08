//! Request encoding and response framing for the batchexecute protocol.
//!
//! Requests are form posts carrying two fields:
//!
//! - `f.req`: the JSON envelope `[[[rpc_id, params_json, null, "generic"]]]`
//!   (or `[null, params_json]` for the streaming query endpoint)
//! - `at`: the CSRF token
//!
//! Responses start with the anti-forgery prefix `)]}'` followed by frames,
//! each a decimal count followed by the JSON payload on its own line:
//!
//! ```text
//! )]}'
//!
//! 58
//! [["wrb.fr","wXbhsf","[[...]]",null,null,null,"generic"]]
//! 25
//! [["e",4,null,null,131]]
//! ```
//!
//! The count starts immediately after the digits, so it covers the newline
//! ending the count line, the payload and the payload's trailing newline.
//! It is measured in UTF-16 code units: `é` counts one, `🦀` counts two.
//! Frames are decoded with [`FrameDecoder`], which accepts input incrementally
//! so the streaming endpoint can surface frames as they arrive.

use serde_json::Value;

use crate::error::{DecodeError, Result};

/// Literal bytes every response body starts with.
pub const ANTI_XSSI_PREFIX: &[u8] = b")]}'";

/// Builds the form body for a batched RPC call.
pub fn encode_request(rpc_id: &str, params: &Value, csrf_token: Option<&str>) -> String {
	let envelope = Value::Array(vec![Value::Array(vec![Value::Array(vec![
		Value::String(rpc_id.to_string()),
		Value::String(params.to_string()),
		Value::Null,
		Value::String("generic".into()),
	])])]);
	form_body(&envelope, csrf_token)
}

/// Builds the form body for the streaming query endpoint.
pub fn encode_stream_request(params: &Value, csrf_token: Option<&str>) -> String {
	let envelope = Value::Array(vec![Value::Null, Value::String(params.to_string())]);
	form_body(&envelope, csrf_token)
}

fn form_body(envelope: &Value, csrf_token: Option<&str>) -> String {
	let mut form = url::form_urlencoded::Serializer::new(String::new());
	form.append_pair("f.req", &envelope.to_string());
	if let Some(token) = csrf_token.filter(|t| !t.is_empty()) {
		form.append_pair("at", token);
	}
	form.finish()
}

/// A request body decoded back into its logical parts.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
	/// RPC id for batched calls, `None` for streaming query bodies.
	pub rpc_id: Option<String>,
	/// Parameter tree after unwrapping the inner JSON string.
	pub params: Value,
	pub csrf_token: Option<String>,
}

/// Parses a form body produced by [`encode_request`] or [`encode_stream_request`].
///
/// Returns `None` when the body does not have either envelope shape.
pub fn parse_request_body(body: &str) -> Option<RequestBody> {
	let mut f_req = None;
	let mut csrf_token = None;
	for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
		match key.as_ref() {
			"f.req" => f_req = Some(value.into_owned()),
			"at" => csrf_token = Some(value.into_owned()),
			_ => {}
		}
	}

	let envelope: Value = serde_json::from_str(&f_req?).ok()?;
	let (rpc_id, params_json) = match envelope.as_array()?.as_slice() {
		[Value::Null, Value::String(params)] => (None, params.clone()),
		[outer] => {
			let call = outer.get(0)?.as_array()?;
			(Some(call.first()?.as_str()?.to_string()), call.get(1)?.as_str()?.to_string())
		}
		_ => return None,
	};

	Some(RequestBody {
		rpc_id,
		params: serde_json::from_str(&params_json).ok()?,
		csrf_token,
	})
}

/// Decodes a complete batched response into its combined entry list.
///
/// Each frame must be a JSON array; its entries are appended in arrival order.
/// Any framing violation fails the whole decode.
pub fn decode_response(body: &[u8]) -> Result<Vec<Value>> {
	let mut decoder = FrameDecoder::new();
	decoder.push(body);

	let mut entries = Vec::new();
	while let Some(frame) = decoder.next_frame()? {
		match frame.value {
			Value::Array(items) => entries.extend(items),
			_ => return Err(DecodeError::NotAnArray { offset: frame.offset }),
		}
	}
	decoder.finish()?;
	Ok(entries)
}

/// Builds a response body in wire framing, one frame per value.
///
/// This is the inverse of [`decode_response`] and is what an emulated
/// service returns.
pub fn encode_frames<'a, I>(frames: I) -> Vec<u8>
where
	I: IntoIterator<Item = &'a Value>,
{
	let mut out = Vec::from(ANTI_XSSI_PREFIX);
	out.extend_from_slice(b"\n\n");
	for frame in frames {
		let chunk = format!("\n{frame}\n");
		out.extend_from_slice(chunk.encode_utf16().count().to_string().as_bytes());
		out.extend_from_slice(chunk.as_bytes());
	}
	out
}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
	/// Byte offset of the frame header within the whole body.
	pub offset: usize,
	pub value: Value,
}

/// Incremental decoder for prefixed, length-delimited JSON frames.
///
/// Feed bytes with [`push`](Self::push), drain complete frames with
/// [`next_frame`](Self::next_frame) and call [`finish`](Self::finish) once the
/// input is exhausted to detect truncation.
#[derive(Debug, Default)]
pub struct FrameDecoder {
	buf: Vec<u8>,
	/// Absolute offset of `buf[0]` within the body.
	base: usize,
	prefix_stripped: bool,
}

impl FrameDecoder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, bytes: &[u8]) {
		self.buf.extend_from_slice(bytes);
	}

	/// Returns the next complete frame, or `None` when more input is needed.
	///
	/// Empty frames (count `0` or whitespace-only payloads) are skipped.
	pub fn next_frame(&mut self) -> Result<Option<Frame>> {
		if !self.strip_prefix()? {
			return Ok(None);
		}

		loop {
			self.skip_whitespace();
			let Some((digits, declared)) = self.parse_header()? else {
				return Ok(None);
			};

			let offset = self.base;
			let Some(len) = utf16_prefix_len(&self.buf[digits..], declared, offset)? else {
				return Ok(None);
			};
			let chunk = &self.buf[digits..digits + len];
			let text = std::str::from_utf8(chunk).map_err(|_| DecodeError::InvalidUtf8 { offset })?;
			let payload = text.trim();
			let parsed = if payload.is_empty() {
				None
			} else {
				Some(serde_json::from_str::<Value>(payload).map_err(|e| DecodeError::InvalidJson {
					offset,
					message: e.to_string(),
				})?)
			};
			self.consume(digits + len);

			if let Some(value) = parsed {
				return Ok(Some(Frame { offset, value }));
			}
		}
	}

	/// Verifies that no partial frame is left over at end of input.
	pub fn finish(mut self) -> Result<()> {
		if !self.strip_prefix()? {
			return Err(DecodeError::MissingPrefix);
		}
		self.skip_whitespace();
		if self.buf.is_empty() {
			return Ok(());
		}

		let digits = self.buf.iter().take_while(|b| b.is_ascii_digit()).count();
		let declared = self.parse_count(digits)?;
		let rest = &self.buf[digits..];
		if declared == 0 && rest.iter().all(u8::is_ascii_whitespace) {
			return Ok(());
		}
		Err(DecodeError::Truncated {
			offset: self.base,
			declared,
			available: String::from_utf8_lossy(rest).encode_utf16().count(),
		})
	}

	/// Returns `false` while too few bytes have arrived to check the prefix.
	fn strip_prefix(&mut self) -> Result<bool> {
		if self.prefix_stripped {
			return Ok(true);
		}
		let n = self.buf.len().min(ANTI_XSSI_PREFIX.len());
		if self.buf[..n] != ANTI_XSSI_PREFIX[..n] {
			return Err(DecodeError::MissingPrefix);
		}
		if n < ANTI_XSSI_PREFIX.len() {
			return Ok(false);
		}
		self.consume(ANTI_XSSI_PREFIX.len());
		self.prefix_stripped = true;
		Ok(true)
	}

	/// Reads the count at the front of the buffer.
	///
	/// Returns the number of digit bytes and the declared count, or `None`
	/// while the buffer still ends inside the digits. The digits must be
	/// followed by a line break.
	fn parse_header(&self) -> Result<Option<(usize, usize)>> {
		if self.buf.is_empty() {
			return Ok(None);
		}
		let digits = self.buf.iter().take_while(|b| b.is_ascii_digit()).count();
		match self.buf.get(digits) {
			None if digits > 0 => Ok(None),
			Some(b'\n' | b'\r') if digits > 0 => Ok(Some((digits, self.parse_count(digits)?))),
			_ => Err(self.invalid_header(digits + 1)),
		}
	}

	fn parse_count(&self, digits: usize) -> Result<usize> {
		std::str::from_utf8(&self.buf[..digits])
			.ok()
			.and_then(|s| s.parse::<usize>().ok())
			.ok_or_else(|| self.invalid_header(digits + 1))
	}

	fn invalid_header(&self, end: usize) -> DecodeError {
		let shown = &self.buf[..end.min(self.buf.len()).min(32)];
		DecodeError::InvalidHeader {
			offset: self.base,
			header: String::from_utf8_lossy(shown).into_owned(),
		}
	}

	fn skip_whitespace(&mut self) {
		let n = self.buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
		self.consume(n);
	}

	fn consume(&mut self, n: usize) {
		self.buf.drain(..n);
		self.base += n;
	}
}

/// Byte length of the first `units` UTF-16 code units of `bytes`, or `None`
/// when `bytes` ends before that many units have arrived.
fn utf16_prefix_len(bytes: &[u8], units: usize, offset: usize) -> Result<Option<usize>> {
	let mut counted = 0;
	let mut pos = 0;
	while counted < units {
		let Some(&lead) = bytes.get(pos) else {
			return Ok(None);
		};
		let (width, weight) = match lead {
			0x00..=0x7f => (1, 1),
			0xc0..=0xdf => (2, 1),
			0xe0..=0xef => (3, 1),
			0xf0..=0xf7 => (4, 2),
			_ => return Err(DecodeError::InvalidUtf8 { offset }),
		};
		if pos + width > bytes.len() {
			return Ok(None);
		}
		counted += weight;
		pos += width;
	}
	// A count ending between the halves of a surrogate pair.
	if counted > units {
		return Err(DecodeError::InvalidUtf8 { offset });
	}
	Ok(Some(pos))
}
