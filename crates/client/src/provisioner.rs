//! One-shot UDP handshake with a device in AP mode.
//!
//! The device listens on a fixed UDP port while it runs its own access
//! point. The host sends one `APCFG:` line and reads one reply. There is
//! no sequencing and no retransmission; a lost datagram surfaces as a
//! timeout and the operator simply runs the command again.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;
use wio_domain::config::Config;
use wio_domain::error::{Error, Result};
use wio_domain::types::ProvisioningRequest;

/// Receive buffer size. Longer replies are truncated.
pub const RECV_BUFFER_LEN: usize = 2048;

#[derive(Debug, Clone)]
pub struct NodeProvisioner {
    device_addr: SocketAddr,
    read_timeout: Duration,
}

impl NodeProvisioner {
    /// Target `cfg.device_addr` with `cfg.provision_timeout()` as the
    /// read deadline.
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self::with_target(cfg.device_addr()?, cfg.provision_timeout()))
    }

    pub fn with_target(device_addr: SocketAddr, read_timeout: Duration) -> Self {
        Self {
            device_addr,
            read_timeout,
        }
    }

    pub fn device_addr(&self) -> SocketAddr {
        self.device_addr
    }

    /// Send `req` to the device and return its reply verbatim.
    ///
    /// The socket lives only for this call and is closed on every path.
    pub async fn provision(&self, req: &ProvisioningRequest) -> Result<String> {
        let line = req.encode()?;

        let local: SocketAddr = if self.device_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| transport("bind", e))?;
        socket
            .connect(self.device_addr)
            .await
            .map_err(|e| transport("connect", e))?;

        let sent = socket
            .send(line.as_bytes())
            .await
            .map_err(|e| transport("send", e))?;
        tracing::debug!(
            device = %self.device_addr,
            bytes = sent,
            serial = %req.device_serial,
            "provisioning datagram sent"
        );

        let mut buf = [0u8; RECV_BUFFER_LEN];
        let received = match tokio::time::timeout(self.read_timeout, socket.recv(&mut buf)).await
        {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(transport("receive", e)),
            Err(_) => {
                tracing::warn!(
                    device = %self.device_addr,
                    timeout_ms = self.read_timeout.as_millis() as u64,
                    "device did not answer"
                );
                return Err(Error::Timeout(format!(
                    "no reply from device at {} within {:?}",
                    self.device_addr, self.read_timeout
                )));
            }
        };

        tracing::debug!(device = %self.device_addr, bytes = received, "device replied");
        Ok(String::from_utf8_lossy(&buf[..received]).into_owned())
    }
}

fn transport(op: &str, e: std::io::Error) -> Error {
    Error::Transport(format!("UDP {op} failed: {e}"))
}
