//! The `NodeApi` trait is the interface commands use to manage nodes, so
//! flows like `nodes register` can run against a test double.

use async_trait::async_trait;
use wio_domain::error::Result;
use wio_domain::types::{Board, CreatedNode, Node};

/// Node management surface of the Wio server.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Create a node (POST /v1/nodes/create).
    async fn create(&self, name: &str, board: Board) -> Result<CreatedNode>;

    /// List the account's nodes in server order (GET /v1/nodes/list).
    async fn list(&self) -> Result<Vec<Node>>;

    /// Delete a node by serial number (POST /v1/nodes/delete).
    async fn delete(&self, serial: &str) -> Result<()>;
}
