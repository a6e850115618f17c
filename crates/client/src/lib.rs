//! `wio-client` — network clients for the Wio platform.
//!
//! | Component            | Transport | Endpoint                          |
//! |----------------------|-----------|-----------------------------------|
//! | [`AuthClient`]       | HTTP/JSON | `/v1/user/create`, `/v1/user/login` |
//! | [`NodeRegistry`]     | HTTP/form | `/v1/nodes/{create,list,delete}`  |
//! | [`NodeProvisioner`]  | UDP       | device AP listener (`192.168.4.1:1025`) |
//!
//! Every component is built from a borrowed [`Config`](wio_domain::Config)
//! and performs exactly one attempt per call; failures are returned as
//! [`wio_domain::Error`] without retries.
//!
//! ```rust,no_run
//! use wio_client::{NodeApi, NodeRegistry};
//! use wio_domain::Config;
//!
//! # async fn example() -> wio_domain::Result<()> {
//! let cfg = Config {
//!     host: "https://us.wio.seeed.io".into(),
//!     token: "secret".into(),
//!     ..Config::default()
//! };
//! for node in NodeRegistry::new(&cfg)?.list().await? {
//!     println!("{} ({})", node.name, node.node_serial);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
mod http;
pub mod provisioner;
pub mod registry;
pub mod types;

pub use api::NodeApi;
pub use auth::AuthClient;
pub use http::from_reqwest;
pub use provisioner::{NodeProvisioner, RECV_BUFFER_LEN};
pub use registry::NodeRegistry;
