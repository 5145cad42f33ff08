//! Runtime for the notebook service's RPC protocol.
//!
//! Wraps the wire codec from [`nlm_protocol`] with everything needed to talk
//! to the live service: credential persistence and token refresh
//! ([`session`]), batched calls with auth retry ([`rpc`]), the streaming
//! query endpoint ([`stream`]) and polling of long-running tasks
//! ([`poller`]). HTTP goes through the [`HttpTransport`] seam so tests can
//! substitute canned responses.

pub mod config;
pub mod error;
pub mod poller;
pub mod rpc;
pub mod session;
pub mod stream;
pub mod transport;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use poller::{Phase, PollOptions, Snapshot, StatusMap, StatusStrategy, poll, wait_for_terminal};
pub use rpc::RpcClient;
pub use session::{CookieJar, CredentialBundle, SessionManager, SessionStore, parse_cookie_header};
pub use stream::{Citation, QueryAnswer, QueryEvent, QueryRequest, QueryStream, StreamClient};
pub use transport::{HttpTransport, ReqwestTransport};
