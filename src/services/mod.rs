pub mod logger;
pub mod settings;
pub mod token;
pub mod transport;
pub mod validation;
