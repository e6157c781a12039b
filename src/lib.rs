//! procbridge - JSON request bodies to stored procedure calls
//!
//! A request body is walked token by token and bound to named procedure
//! parameters (scalars, nulls, and table-valued parameters built from
//! arrays). The procedure answers through two output parameters, a status
//! code and a JSON body. Engine errors that name a bad parameter become 400s;
//! everything else is a fault.
//!
//! ```ignore
//! let config = BridgeConfig::load(Path::new("procbridge.json"))?;
//! let bridge = ProcedureBridge::new(config, connector)?;
//! let response = bridge.execute("SaveOrder", &request, CallOptions::new()).await?;
//! ```

pub mod api;
pub mod binder;
pub mod classifier;
pub mod config;
pub mod invoker;
pub mod observability;
pub mod outcome;
pub mod schema;
pub mod session;
pub mod token;

pub use api::{BridgeError, BridgeRequest, CallOptions, JsonResult, ProcedureBridge};
pub use config::{BridgeConfig, ConnectionConfig};
pub use outcome::{ClassifiedError, ProcedureCallResult};
