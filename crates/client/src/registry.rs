//! Authenticated node CRUD against `/v1/nodes/*`.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use wio_domain::config::Config;
use wio_domain::error::{Error, Result};
use wio_domain::types::{Board, CreatedNode, Node};

use crate::api::NodeApi;
use crate::http::{self, Reply};
use crate::types::{CreateNodeForm, DeleteNodeForm, DeleteResponse, NodeListResponse};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// REST client for the node endpoints.
///
/// Holds its own copy of the token; construction fails if either the
/// token or the host is unusable, so no request is ever sent without
/// credentials.
#[derive(Clone)]
pub struct NodeRegistry {
    http: Client,
    base_url: Url,
    token: String,
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl NodeRegistry {
    pub fn new(cfg: &Config) -> Result<Self> {
        let base_url = cfg.base_url()?;
        let token = cfg.require_token()?.to_owned();
        Ok(Self {
            http: http::build_client(cfg.http_timeout())?,
            base_url,
            token,
        })
    }

    /// Attach the auth and accept headers every node call carries.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/json")
    }

    fn url(&self, path: &str) -> Url {
        http::endpoint(&self.base_url, path)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl NodeApi for NodeRegistry {
    async fn create(&self, name: &str, board: Board) -> Result<CreatedNode> {
        const LABEL: &str = "POST /v1/nodes/create";
        let form = CreateNodeForm {
            name,
            board: board.server_name(),
        };
        let rb = self.decorate(self.http.post(self.url("/v1/nodes/create")).form(&form));

        let reply = http::send(LABEL, rb).await?;
        if !reply.status.is_success() {
            return Err(api_error(&reply));
        }

        let created: CreatedNode = http::decode(LABEL, &reply.body)?;
        tracing::info!(name, %board, node_sn = %created.node_serial, "node created");
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Node>> {
        const LABEL: &str = "GET /v1/nodes/list";
        let rb = self.decorate(self.http.get(self.url("/v1/nodes/list")));

        let reply = http::send(LABEL, rb).await?;
        if reply.status != StatusCode::OK {
            return Err(api_error(&reply));
        }

        let envelope: NodeListResponse = http::decode(LABEL, &reply.body)?;
        tracing::debug!(count = envelope.nodes.len(), "nodes listed");
        Ok(envelope.nodes)
    }

    async fn delete(&self, serial: &str) -> Result<()> {
        const LABEL: &str = "POST /v1/nodes/delete";
        let form = DeleteNodeForm { node_sn: serial };
        let rb = self.decorate(self.http.post(self.url("/v1/nodes/delete")).form(&form));

        let reply = http::send(LABEL, rb).await?;
        if !reply.status.is_success() {
            return Err(api_error(&reply));
        }

        let outcome: DeleteResponse = http::decode(LABEL, &reply.body)?;
        if outcome.result != "ok" {
            return Err(Error::Api {
                status: reply.status.as_u16(),
                body: format!("delete rejected: {}", outcome.result),
            });
        }

        tracing::info!(node_sn = serial, "node deleted");
        Ok(())
    }
}

fn api_error(reply: &Reply) -> Error {
    Error::Api {
        status: reply.status.as_u16(),
        body: http::snippet(&reply.body),
    }
}
