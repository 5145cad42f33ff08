//! HTTP transport seam.
//!
//! Sessions, RPC calls and streams talk to the network only through
//! [`HttpTransport`], so tests can substitute a scripted transport and the
//! production path stays a thin wrapper over `reqwest`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::redirect::Policy;
use url::Url;

use crate::error::{Error, Result};

/// Boxed future returned by transport methods.
pub type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Response body delivered chunk by chunk.
pub type BodyStream = BoxStream<'static, Result<Vec<u8>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
	Get,
	Post,
}

/// A request as the runtime builds it.
#[derive(Debug, Clone)]
pub struct HttpRequest {
	pub method: Method,
	pub url: Url,
	pub headers: Vec<(&'static str, String)>,
	pub body: Option<String>,
	pub timeout: Duration,
}

impl HttpRequest {
	pub fn get(url: Url, timeout: Duration) -> Self {
		Self {
			method: Method::Get,
			url,
			headers: Vec::new(),
			body: None,
			timeout,
		}
	}

	pub fn post(url: Url, body: String, timeout: Duration) -> Self {
		Self {
			method: Method::Post,
			url,
			headers: Vec::new(),
			body: Some(body),
			timeout,
		}
	}

	pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));
		self
	}

	/// Case-insensitive header lookup.
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(n, _)| n.eq_ignore_ascii_case(name))
			.map(|(_, v)| v.as_str())
	}

	/// Value of a query parameter on the request URL.
	pub fn query_param(&self, name: &str) -> Option<String> {
		self.url
			.query_pairs()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.into_owned())
	}
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
	pub status: u16,
	/// Final URL after redirects.
	pub url: Url,
	pub body: Vec<u8>,
}

impl HttpResponse {
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// A response whose body is read incrementally.
pub struct StreamingResponse {
	pub status: u16,
	pub body: BodyStream,
}

impl fmt::Debug for StreamingResponse {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StreamingResponse").field("status", &self.status).finish_non_exhaustive()
	}
}

/// The network operations the runtime needs.
pub trait HttpTransport: Send + Sync {
	/// Sends a request and buffers the whole response, following redirects.
	fn send(&self, request: HttpRequest) -> BoxFut<'_, Result<HttpResponse>>;

	/// Sends a request and returns as soon as the response head arrives.
	fn send_streaming(&self, request: HttpRequest) -> BoxFut<'_, Result<StreamingResponse>>;
}

/// [`HttpTransport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: reqwest::Client,
}

impl ReqwestTransport {
	pub fn new() -> Result<Self> {
		let client = reqwest::Client::builder()
			.redirect(Policy::limited(10))
			.build()
			.map_err(|e| Error::Transport(format!("failed to create HTTP client: {e}")))?;
		Ok(Self { client })
	}

	fn build(&self, request: HttpRequest) -> reqwest::RequestBuilder {
		let mut builder = match request.method {
			Method::Get => self.client.get(request.url),
			Method::Post => self.client.post(request.url),
		};
		for (name, value) in request.headers {
			builder = builder.header(name, value);
		}
		if let Some(body) = request.body {
			builder = builder.body(body);
		}
		builder.timeout(request.timeout)
	}
}

impl HttpTransport for ReqwestTransport {
	fn send(&self, request: HttpRequest) -> BoxFut<'_, Result<HttpResponse>> {
		let builder = self.build(request);
		Box::pin(async move {
			let response = builder.send().await?;
			let status = response.status().as_u16();
			let url = response.url().clone();
			let body = response.bytes().await?.to_vec();
			Ok(HttpResponse { status, url, body })
		})
	}

	fn send_streaming(&self, request: HttpRequest) -> BoxFut<'_, Result<StreamingResponse>> {
		let builder = self.build(request);
		Box::pin(async move {
			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response
				.bytes_stream()
				.map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(Error::from))
				.boxed();
			Ok(StreamingResponse { status, body })
		})
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn header_lookup_ignores_case() {
		let url = Url::parse("https://example.com/x?rpcids=abc&rt=c").unwrap();
		let request = HttpRequest::get(url, Duration::from_secs(1)).header("X-Same-Domain", "1");
		assert_eq!(request.header_value("x-same-domain"), Some("1"));
		assert_eq!(request.query_param("rpcids").as_deref(), Some("abc"));
		assert_eq!(request.query_param("f.sid"), None);
	}
}
