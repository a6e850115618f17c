//! User account calls: `/v1/user/create` and `/v1/user/login`.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use wio_domain::config::Config;
use wio_domain::error::{Error, Result};
use wio_domain::types::{Credentials, SessionToken};

use crate::http::{self, Reply};

/// Exchanges user credentials for a [`SessionToken`].
///
/// The client never touches the config it was built from: storing the
/// returned token is the caller's job.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    base_url: Url,
}

impl AuthClient {
    /// Build a client against `cfg.host`. Fails with `Error::Config` when
    /// the host is missing or not an absolute URL.
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            http: http::build_client(cfg.http_timeout())?,
            base_url: cfg.base_url()?,
        })
    }

    /// Register a new account (POST /v1/user/create).
    pub async fn create_user(&self, email: &str, password: &str) -> Result<SessionToken> {
        const LABEL: &str = "POST /v1/user/create";
        tracing::debug!(email, "creating user");

        let reply = self
            .post_credentials(LABEL, "/v1/user/create", email, password)
            .await?;
        if !reply.status.is_success() {
            return Err(auth_error(&reply));
        }

        let token: SessionToken = http::decode(LABEL, &reply.body)?;
        tracing::info!("user created");
        Ok(token)
    }

    /// Authenticate an existing account (POST /v1/user/login).
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionToken> {
        const LABEL: &str = "POST /v1/user/login";
        tracing::debug!(email, "logging in");

        let reply = self
            .post_credentials(LABEL, "/v1/user/login", email, password)
            .await?;
        if reply.status != StatusCode::OK {
            return Err(auth_error(&reply));
        }

        let token: SessionToken = http::decode(LABEL, &reply.body)?;
        tracing::info!(user_id = %token.user_id, "login successful");
        Ok(token)
    }

    async fn post_credentials(
        &self,
        label: &str,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<Reply> {
        let url = http::endpoint(&self.base_url, path);
        let creds = Credentials::new(email, password);
        let rb = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(&creds);
        http::send(label, rb).await
    }
}

fn auth_error(reply: &Reply) -> Error {
    Error::Auth {
        status: reply.status.as_u16(),
        body: http::snippet(&reply.body),
    }
}
