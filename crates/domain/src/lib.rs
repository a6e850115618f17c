//! `wio-domain` — configuration, errors and data model shared by the wio
//! crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, ConfigKey, ConfigStore, MemoryConfigStore};
pub use error::{Error, Result};
pub use types::{Board, CreatedNode, Credentials, Node, ProvisioningRequest, SessionToken};
