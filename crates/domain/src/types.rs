//! Data model shared by the API client, the provisioner and the CLI.
//!
//! Wire names follow the management server (`snake_case` JSON, board
//! names such as `"Wio Link v1.0"`); Rust names describe the meaning.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Board
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Hardware variant of a node, as recognized by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Board {
    #[serde(rename = "Wio Node v1.0")]
    Node,
    #[serde(rename = "Wio Link v1.0")]
    Link,
}

impl Board {
    /// Name the server expects in the `board` form field.
    pub fn server_name(self) -> &'static str {
        match self {
            Board::Node => "Wio Node v1.0",
            Board::Link => "Wio Link v1.0",
        }
    }

    /// Short name accepted on the command line.
    pub fn short_name(self) -> &'static str {
        match self {
            Board::Node => "node",
            Board::Link => "link",
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Board {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "node" | "wio node v1.0" => Ok(Board::Node),
            "link" | "wio link v1.0" => Ok(Board::Link),
            other => Err(Error::Config(format!(
                "unknown board {other:?}: must be one of \"node\", \"link\""
            ))),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Users
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Request body for `/v1/user/create` and `/v1/user/login`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token returned by a successful login or user creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
    /// Absent from `/v1/user/create` responses.
    #[serde(default)]
    pub user_id: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Nodes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A device registered with the management server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub node_key: String,
    #[serde(rename = "node_sn")]
    pub node_serial: String,
    /// Data-exchange server assigned by the platform. Untyped and
    /// server-controlled; `Value::Null` when the server sends null or
    /// omits it.
    #[serde(rename = "dataxserver", default)]
    pub server_assignment: serde_json::Value,
    pub board: Board,
    pub online: bool,
}

/// Key and serial of a freshly created node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedNode {
    pub node_key: String,
    #[serde(rename = "node_sn")]
    pub node_serial: String,
}

impl fmt::Display for CreatedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key: {}\nserial number: {}", self.node_key, self.node_serial)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Provisioning
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything a device in AP mode needs to join the network and find
/// the management server.
#[derive(Clone, PartialEq, Eq)]
pub struct ProvisioningRequest {
    pub ssid: String,
    pub wifi_password: String,
    pub device_key: String,
    pub device_serial: String,
    pub server_host: String,
    pub server_ip: String,
}

impl ProvisioningRequest {
    /// Render the single `APCFG:` line sent to the device.
    ///
    /// Fields are tab-separated, so a field containing a tab or line
    /// break is rejected instead of producing a garbled command.
    pub fn encode(&self) -> Result<String> {
        let fields = [
            ("ssid", &self.ssid),
            ("wifi password", &self.wifi_password),
            ("device key", &self.device_key),
            ("device serial", &self.device_serial),
            ("server host", &self.server_host),
            ("server ip", &self.server_ip),
        ];
        if let Some((name, _)) = fields
            .iter()
            .find(|(_, v)| v.contains(['\t', '\r', '\n']))
        {
            return Err(Error::Config(format!(
                "{name} must not contain tabs or line breaks"
            )));
        }

        let mut line = String::from("APCFG: ");
        for (_, value) in fields {
            line.push_str(value);
            line.push('\t');
        }
        line.push_str("\r\n");
        Ok(line)
    }
}

impl fmt::Debug for ProvisioningRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisioningRequest")
            .field("ssid", &self.ssid)
            .field("wifi_password", &"<redacted>")
            .field("device_key", &"<redacted>")
            .field("device_serial", &self.device_serial)
            .field("server_host", &self.server_host)
            .field("server_ip", &self.server_ip)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> ProvisioningRequest {
        ProvisioningRequest {
            ssid: "home".into(),
            wifi_password: "hunter2".into(),
            device_key: "k1".into(),
            device_serial: "s1".into(),
            server_host: "https://wio.example.com".into(),
            server_ip: "10.0.0.5".into(),
        }
    }

    #[test]
    fn encode_matches_device_line_format() {
        assert_eq!(
            request().encode().unwrap(),
            "APCFG: home\thunter2\tk1\ts1\thttps://wio.example.com\t10.0.0.5\t\r\n"
        );
    }

    #[test]
    fn encode_keeps_empty_fields_positional() {
        let req = ProvisioningRequest {
            server_ip: String::new(),
            ..request()
        };
        assert!(req.encode().unwrap().ends_with("https://wio.example.com\t\t\r\n"));
    }

    #[test]
    fn encode_rejects_embedded_separators() {
        let req = ProvisioningRequest {
            ssid: "bad\tssid".into(),
            ..request()
        };
        assert!(matches!(req.encode(), Err(Error::Config(_))));
    }

    #[test]
    fn debug_redacts_secrets() {
        let out = format!("{:?}", request());
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("k1"));

        let creds = format!("{:?}", Credentials::new("a@b.c", "pw"));
        assert!(creds.contains("a@b.c"));
        assert!(!creds.contains("\"pw\""));
    }

    #[test]
    fn board_parses_short_and_server_names() {
        assert_eq!("node".parse::<Board>().unwrap(), Board::Node);
        assert_eq!("LINK".parse::<Board>().unwrap(), Board::Link);
        assert_eq!("Wio Link v1.0".parse::<Board>().unwrap(), Board::Link);
        assert!("mega".parse::<Board>().is_err());
        assert_eq!(json!(Board::Node), json!("Wio Node v1.0"));
    }

    #[test]
    fn node_round_trips_with_and_without_assignment() {
        let cases = [
            Node {
                name: "a".into(),
                node_key: "k".into(),
                node_serial: "s".into(),
                server_assignment: serde_json::Value::Null,
                board: Board::Node,
                online: false,
            },
            Node {
                name: "b".into(),
                node_key: "k2".into(),
                node_serial: "s2".into(),
                server_assignment: json!({"ip": "10.0.0.5", "port": 8080}),
                board: Board::Link,
                online: true,
            },
            Node {
                name: "c".into(),
                node_key: "k3".into(),
                node_serial: "s3".into(),
                server_assignment: json!("54.1.2.3"),
                board: Board::Node,
                online: true,
            },
        ];
        for node in cases {
            let wire = serde_json::to_string(&node).unwrap();
            let back: Node = serde_json::from_str(&wire).unwrap();
            assert_eq!(back, node);
        }
    }

    #[test]
    fn node_accepts_absent_or_null_assignment() {
        let absent: Node = serde_json::from_value(json!({
            "name": "a", "node_key": "k", "node_sn": "s",
            "board": "Wio Link v1.0", "online": false
        }))
        .unwrap();
        let null: Node = serde_json::from_value(json!({
            "name": "a", "node_key": "k", "node_sn": "s", "dataxserver": null,
            "board": "Wio Link v1.0", "online": false
        }))
        .unwrap();
        assert_eq!(absent, null);
        assert!(absent.server_assignment.is_null());
    }

    #[test]
    fn node_rejects_unknown_board() {
        let res: std::result::Result<Node, _> = serde_json::from_value(json!({
            "name": "a", "node_key": "k", "node_sn": "s",
            "board": "Wio Mega", "online": true
        }));
        assert!(res.is_err());
    }

    #[test]
    fn session_token_user_id_is_optional() {
        let tok: SessionToken = serde_json::from_str(r#"{"token":"T"}"#).unwrap();
        assert_eq!(tok.token, "T");
        assert_eq!(tok.user_id, "");
    }
}
