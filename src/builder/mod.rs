//! Construction of engines from definitions and handler sets.
//!
//! [`FtsmBuilder`] checks, before any handler runs, that the handler set
//! covers every declared state and that every dependency resolves.

pub mod error;
pub mod machine;

pub use error::ConfigurationError;
pub use machine::FtsmBuilder;
