//! `wio nodes create|list|delete|register`.

use anyhow::Context;
use wio_client::types::NodeListResponse;
use wio_client::{NodeApi, NodeProvisioner, NodeRegistry};
use wio_domain::config::{Config, ConfigKey, ConfigStore};
use wio_domain::types::{Board, CreatedNode, ProvisioningRequest};

use super::prompt::{prompt, prompt_password, wait_for_enter};
use super::RegisterArgs;

pub async fn create(store: &mut dyn ConfigStore, name: &str, board: Board) -> anyhow::Result<()> {
    let registry = NodeRegistry::new(store.config())?;
    let created = create_and_record(store, &registry, name, board).await?;

    println!("{}", serde_json::to_string(&created)?);
    Ok(())
}

pub async fn list(store: &dyn ConfigStore) -> anyhow::Result<()> {
    let registry = NodeRegistry::new(store.config())?;
    let nodes = registry.list().await.context("listing nodes")?;

    let out = serde_json::to_string_pretty(&NodeListResponse { nodes })?;
    println!("{out}");
    Ok(())
}

pub async fn delete(store: &dyn ConfigStore, serial: &str) -> anyhow::Result<()> {
    let registry = NodeRegistry::new(store.config())?;
    registry
        .delete(serial)
        .await
        .with_context(|| format!("deleting node {serial}"))?;

    println!("Successfully deleted node: {serial}");
    Ok(())
}

/// Optionally create a node, then hand WiFi and server settings to the
/// device over its AP-mode UDP listener.
pub async fn register(store: &mut dyn ConfigStore, args: RegisterArgs) -> anyhow::Result<()> {
    // Fail on a bad device address before anything is created server-side.
    let provisioner = NodeProvisioner::new(store.config())?;

    if args.create {
        let name = match args.name.as_deref() {
            Some(n) if !n.is_empty() => n.to_owned(),
            _ => prompt("Enter a name for your node:", ""),
        };
        let board = match args.board {
            Some(b) => b.into(),
            None => prompt("Enter the board type (node or link):", "link").parse()?,
        };

        let registry = NodeRegistry::new(store.config())?;
        let created = create_and_record(store, &registry, &name, board).await?;
        eprintln!("Node created:\n{created}");
    }

    // Nothing to send without a key and serial; fail before any prompting.
    resolve_node(store.config(), args.key.as_deref(), args.serial.as_deref())?;

    eprintln!("Registering node...");
    eprintln!(
        "To enter AP mode on the device: hold the `func` button for 5 seconds, \
         then connect to the device AP from your WiFi network list."
    );
    wait_for_enter("Connect to the device, then hit RETURN");

    let ssid = prompt("Enter the name of the SSID you want to connect to:", "");
    let wifi_password = prompt_password("Enter the password for the SSID: ")?;

    let request = build_request(
        store.config(),
        args.key.as_deref(),
        args.serial.as_deref(),
        ssid,
        wifi_password,
    )?;

    let ack = provisioner
        .provision(&request)
        .await
        .with_context(|| format!("provisioning device at {}", provisioner.device_addr()))?;

    println!("{ack}");
    Ok(())
}

/// Create a node and remember its key and serial for a later
/// `nodes register`.
pub async fn create_and_record(
    store: &mut dyn ConfigStore,
    api: &dyn NodeApi,
    name: &str,
    board: Board,
) -> anyhow::Result<CreatedNode> {
    let created = api
        .create(name, board)
        .await
        .with_context(|| format!("creating node {name:?}"))?;

    store.set(ConfigKey::NodeKey, created.node_key.clone());
    store.set(ConfigKey::NodeSerial, created.node_serial.clone());
    store.persist().context("saving config")?;
    Ok(created)
}

/// Assemble the provisioning payload. Flag values override the key and
/// serial remembered from the last `nodes create`.
pub fn build_request(
    cfg: &Config,
    key: Option<&str>,
    serial: Option<&str>,
    ssid: String,
    wifi_password: String,
) -> anyhow::Result<ProvisioningRequest> {
    let (device_key, device_serial) = resolve_node(cfg, key, serial)?;
    if ssid.is_empty() {
        anyhow::bail!("an SSID is required");
    }

    Ok(ProvisioningRequest {
        ssid,
        wifi_password,
        device_key,
        device_serial,
        server_host: cfg.host.clone(),
        server_ip: cfg.host_ip.clone(),
    })
}

/// Key and serial to provision: flags first, then the last created node.
pub fn resolve_node(
    cfg: &Config,
    key: Option<&str>,
    serial: Option<&str>,
) -> anyhow::Result<(String, String)> {
    let device_key = pick(key, &cfg.node_key);
    let device_serial = pick(serial, &cfg.node_serial);

    if device_key.is_empty() || device_serial.is_empty() {
        anyhow::bail!(
            "node key and serial number are required: pass --key/--sn or use --create"
        );
    }
    Ok((device_key, device_serial))
}

fn pick(flag: Option<&str>, stored: &str) -> String {
    flag.filter(|v| !v.is_empty()).unwrap_or(stored).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use wio_domain::config::MemoryConfigStore;
    use wio_domain::error::{Error, Result};
    use wio_domain::types::Node;

    #[derive(Default)]
    struct FakeApi {
        fail: bool,
        calls: Mutex<Vec<(String, Board)>>,
    }

    #[async_trait]
    impl NodeApi for FakeApi {
        async fn create(&self, name: &str, board: Board) -> Result<CreatedNode> {
            self.calls.lock().push((name.to_owned(), board));
            if self.fail {
                return Err(Error::Api {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(CreatedNode {
                node_key: "k1".into(),
                node_serial: "s1".into(),
            })
        }

        async fn list(&self) -> Result<Vec<Node>> {
            Ok(Vec::new())
        }

        async fn delete(&self, _serial: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn create_and_record_stores_key_and_serial() {
        let mut store = MemoryConfigStore::new(Config::default());
        let api = FakeApi::default();

        let created = create_and_record(&mut store, &api, "bulb1", Board::Link)
            .await
            .unwrap();

        assert_eq!(created.node_serial, "s1");
        assert_eq!(store.get(ConfigKey::NodeKey), "k1");
        assert_eq!(store.get(ConfigKey::NodeSerial), "s1");
        assert_eq!(store.persist_count(), 1);
        assert_eq!(api.calls.lock().as_slice(), &[("bulb1".to_owned(), Board::Link)]);
    }

    #[tokio::test]
    async fn failed_create_leaves_store_untouched() {
        let mut store = MemoryConfigStore::new(Config {
            node_key: "old".into(),
            ..Config::default()
        });
        let api = FakeApi {
            fail: true,
            ..FakeApi::default()
        };

        assert!(create_and_record(&mut store, &api, "x", Board::Node).await.is_err());
        assert_eq!(store.get(ConfigKey::NodeKey), "old");
        assert_eq!(store.persist_count(), 0);
    }

    fn config() -> Config {
        Config {
            host: "https://wio.example.com".into(),
            host_ip: "10.0.0.5".into(),
            node_key: "stored-key".into(),
            node_serial: "stored-sn".into(),
            ..Config::default()
        }
    }

    #[test]
    fn build_request_uses_stored_node() {
        let req = build_request(&config(), None, None, "home".into(), "pw".into()).unwrap();
        assert_eq!(req.device_key, "stored-key");
        assert_eq!(req.device_serial, "stored-sn");
        assert_eq!(req.server_host, "https://wio.example.com");
        assert_eq!(req.server_ip, "10.0.0.5");
    }

    #[test]
    fn build_request_flags_override_stored_node() {
        let req = build_request(
            &config(),
            Some("flag-key"),
            Some("flag-sn"),
            "home".into(),
            "pw".into(),
        )
        .unwrap();
        assert_eq!(req.device_key, "flag-key");
        assert_eq!(req.device_serial, "flag-sn");
    }

    #[tokio::test]
    async fn register_without_node_fails_before_prompting() {
        // Stdin is never read: the missing key/serial is reported first.
        let mut store = MemoryConfigStore::new(Config {
            host: "https://wio.example.com".into(),
            ..Config::default()
        });

        let err = register(&mut store, RegisterArgs::default()).await.unwrap_err();
        assert!(err.to_string().contains("--key/--sn"), "got {err:#}");
        assert_eq!(store.persist_count(), 0);
    }

    #[test]
    fn resolve_node_mixes_flag_and_stored_values() {
        let partial = Config {
            node_serial: "stored-sn".into(),
            ..Config::default()
        };
        assert!(resolve_node(&partial, None, None).is_err());
        assert_eq!(
            resolve_node(&partial, Some("flag-key"), None).unwrap(),
            ("flag-key".to_owned(), "stored-sn".to_owned())
        );
    }

    #[test]
    fn build_request_requires_key_serial_and_ssid() {
        let empty = Config::default();
        assert!(build_request(&empty, None, None, "home".into(), "pw".into()).is_err());
        assert!(build_request(&config(), None, None, String::new(), "pw".into()).is_err());
    }
}
