//! Typed client for the NotebookLM notebook service.
//!
//! [`NotebookClient`] exposes notebook, source, chat, research, studio and
//! query operations over the service's private RPC protocol. Each operation
//! builds a fixed-shape parameter array from [`nlm_protocol::params`], sends
//! it through the session-aware runtime and shapes the positional reply into
//! the types in [`types`].
//!
//! ```ignore
//! use nlm::{ClientConfig, Credentials, NotebookClient, SessionStore};
//!
//! let store = SessionStore::at_default_location()?;
//! let client = NotebookClient::connect(ClientConfig::default(), Credentials::from_env_or(store))?;
//! for notebook in client.list_notebooks().await? {
//!     println!("{} {}", notebook.id, notebook.title);
//! }
//! ```

mod chat;
pub mod client;
mod notebooks;
mod path;
pub mod query;
pub mod research;
mod sources;
pub mod studio;
pub mod types;

pub use client::{Credentials, NotebookClient};
pub use nlm_protocol::params::chat::{ChatGoal, ResponseLength};
pub use nlm_protocol::params::research::{ResearchMode, ResearchSource, ResultType};
pub use nlm_protocol::params::source::{SourceInput, mime};
pub use nlm_protocol::params::studio::{
	AudioFormat, AudioLength, StudioCommon, StudioKind, StudioOptions, VideoFormat, VideoStyle,
};
pub use nlm_runtime::{
	ClientConfig, CredentialBundle, Error, Phase, PollOptions, QueryAnswer, QueryEvent, QueryStream, Result,
	SessionStore, Snapshot, parse_cookie_header,
};
pub use query::Question;
pub use studio::{StudioCreated, StudioOptionsView};
pub use types::*;
