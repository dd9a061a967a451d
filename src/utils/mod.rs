pub mod path_template;
pub mod query;
pub mod redact;
pub mod suggest;
pub mod tool_errors;
