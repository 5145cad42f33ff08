//! Wire protocol for the notebook service's private RPC surface.
//!
//! - [`codec`]: form-encoded requests and prefixed, length-delimited response frames
//! - [`envelope`]: locating a call's payload or status among decoded entries
//! - [`positional`] and [`params`]: fixed-arity parameter schemas per RPC
//! - [`rpc`]: RPC identifiers, endpoint paths and the logical call type
//!
//! Nothing here performs I/O.

pub mod codec;
pub mod envelope;
pub mod error;
pub mod params;
pub mod positional;
pub mod rpc;

pub use codec::{FrameDecoder, decode_response, encode_request, encode_stream_request};
pub use envelope::{RpcOutcome, StatusClass, find_rpc_result};
pub use error::{DecodeError, SchemaError};
pub use positional::{Positional, Slot};
pub use rpc::{RpcCall, RpcId, RpcRequest};
