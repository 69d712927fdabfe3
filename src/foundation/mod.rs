pub mod cancel;
pub mod core;
pub mod error;
pub mod json;
pub mod settings;
