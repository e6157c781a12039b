//! # Bridge API
//!
//! The HTTP-facing edge of the bridge: request extraction and content
//! negotiation, caller identity, the call pipeline, and the JSON envelope.
//! Routing is left to the embedding application:
//!
//! ```ignore
//! async fn save_order(
//!     State(bridge): State<Arc<ProcedureBridge<MyConnector>>>,
//!     request: BridgeRequest,
//! ) -> Result<JsonResult, BridgeError> {
//!     bridge.execute("SaveOrder", &request, CallOptions::new()).await
//! }
//! ```

mod errors;
mod handler;
mod identity;
mod request;
mod response;

pub use errors::{BridgeError, BridgeResult, RequestError, FAULT_MESSAGE};
pub use handler::{CallOptions, ProcedureBridge};
pub use identity::{CallerIdentity, SESSION_ID_PARAMETER, USER_ID_PARAMETER};
pub use request::{
    BodyLimit, BridgeRequest, ContentKind, DEFAULT_BODY_LIMIT, UNSUPPORTED_CONTENT_TYPE,
};
pub use response::JsonResult;
