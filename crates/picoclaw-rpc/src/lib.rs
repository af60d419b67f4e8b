//! # picoclaw-rpc
//!
//! The I/O boundary of the PicoClaw core: a length-framed JSON-RPC 2.0
//! transport plus the serial runtime dispatcher that owns the session
//! map and drives `picoclaw-core` per request.
//!
//! - **[`codec`]** -- `Content-Length` framed read/write over tokio I/O
//! - **[`types`]** -- JSON-RPC envelopes and method param/result shapes
//! - **[`runtime`]** -- the [`Runtime`] dispatcher and callback plumbing

pub mod codec;
pub mod runtime;
pub mod types;

pub use codec::{read_frame, write_frame, MAX_FRAME_BYTES};
pub use runtime::Runtime;
pub use types::{
    ExecuteToolParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, LlmCallParams, PingResult,
    ProcessMessageParams, ProcessMessageResult,
};
