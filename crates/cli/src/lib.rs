//! `wio-cli` — command tree, config file store and interactive flows for
//! the `wio` binary.

pub mod cli;
pub mod store;
