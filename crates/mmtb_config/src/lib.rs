//! Parsing and validation of `mmtb.toml` testbench configuration files.
//!
//! The file declares the port interface of each design and the
//! clock/reset/stimulus/settle parameters of each testbench, producing a
//! strongly-typed [`ProjectConfig`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
