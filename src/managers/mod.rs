pub mod api;
pub mod discovery;
pub mod executor;
pub mod method;
pub mod request;
