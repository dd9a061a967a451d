//! Discovery-driven client for Google-style REST APIs.
//!
//! An `(api, version, methodName)` triple is resolved against the discovery
//! service into a concrete endpoint, then sent with path, query and body
//! parameters and a bearer token. List methods can be paged through
//! automatically with `nextPageToken`.

pub mod app;
pub mod cli;
pub mod constants;
pub mod errors;
pub mod managers;
pub mod services;
pub mod utils;

pub use errors::{ToolError, ToolErrorKind};
pub use managers::api::{ApiManager, ApiParams, ApiSelector, ClientConfig, ExecuteOutcome};
