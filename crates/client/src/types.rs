//! Response envelopes and form bodies for the `/v1/nodes/*` endpoints.
//!
//! Only the fields the client relies on are declared, and none of them
//! carry serde defaults: a response missing one fails to decode.

use serde::{Deserialize, Serialize};
use wio_domain::types::Node;

/// GET /v1/nodes/list — response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeListResponse {
    pub nodes: Vec<Node>,
}

/// POST /v1/nodes/delete — response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub result: String,
}

/// POST /v1/nodes/create — form body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateNodeForm<'a> {
    pub name: &'a str,
    pub board: &'a str,
}

/// POST /v1/nodes/delete — form body.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteNodeForm<'a> {
    pub node_sn: &'a str,
}
