//! `wio user create|login|configure`.

use anyhow::Context;
use wio_client::AuthClient;
use wio_domain::config::{ConfigKey, ConfigStore};
use wio_domain::types::SessionToken;

use super::prompt::{prompt, prompt_password};

/// Create a new account. The returned token is not stored; run
/// `wio user login` afterwards.
pub async fn create(store: &dyn ConfigStore, email: Option<String>) -> anyhow::Result<()> {
    let email = resolve_email(store, email);
    let password = prompt_password("Enter Password: ")?;

    let client = AuthClient::new(store.config())?;
    client
        .create_user(&email, &password)
        .await
        .context("creating user")?;

    println!("Success!");
    Ok(())
}

/// Log in, store the token and email, and write the config file.
pub async fn login(store: &mut dyn ConfigStore, email: Option<String>) -> anyhow::Result<()> {
    let email = resolve_email(store, email);
    let password = prompt_password("Enter Password: ")?;

    let client = AuthClient::new(store.config())?;
    let session = client
        .login(&email, &password)
        .await
        .context("logging in")?;

    apply_session(store, &email, &session)?;
    eprintln!("Login successful. Token saved.");
    Ok(())
}

/// Prompt for email, server address and server IP, then log in.
///
/// A blank server IP triggers a DNS lookup of the server host; when that
/// fails the IP is left empty and the device resolves the host itself.
pub async fn configure(store: &mut dyn ConfigStore) -> anyhow::Result<()> {
    tracing::debug!("configure called");

    let email = prompt("Enter your email address:", store.get(ConfigKey::Email));
    store.set(ConfigKey::Email, email);

    let host = prompt(
        "Enter the server address (eg. https://us.wio.seeed.io):",
        store.get(ConfigKey::Host),
    );
    store.set(ConfigKey::Host, host);
    let base_url = store.config().base_url()?;

    let mut host_ip = prompt(
        "Enter the server IP address (leave blank to allow discovery):",
        "",
    );
    if host_ip.is_empty() {
        match discover_host_ip(&base_url).await {
            Some(ip) => host_ip = ip,
            None => eprintln!("Unknown host"),
        }
    }
    store.set(ConfigKey::HostIp, host_ip);

    login(store, None).await
}

/// Store a fresh session and persist. The token is only written here,
/// after the server accepted the credentials.
pub fn apply_session(
    store: &mut dyn ConfigStore,
    email: &str,
    session: &SessionToken,
) -> anyhow::Result<()> {
    store.set(ConfigKey::Token, session.token.clone());
    store.set(ConfigKey::Email, email.to_owned());
    store.persist().context("saving config")?;
    Ok(())
}

/// `--email` flag, then the configured email, then an interactive prompt.
fn resolve_email(store: &dyn ConfigStore, flag: Option<String>) -> String {
    match flag.filter(|e| !e.is_empty()) {
        Some(email) => email,
        None if !store.get(ConfigKey::Email).is_empty() => store.get(ConfigKey::Email).to_owned(),
        None => prompt("Email Address:", ""),
    }
}

/// First address the server host resolves to.
async fn discover_host_ip(base_url: &reqwest::Url) -> Option<String> {
    let host = base_url.host_str()?;
    let port = base_url.port_or_known_default().unwrap_or(443);
    match tokio::net::lookup_host((host, port)).await {
        Ok(mut addrs) => addrs.next().map(|a| a.ip().to_string()),
        Err(e) => {
            tracing::debug!(host, error = %e, "server IP discovery failed");
            None
        }
    }
}
