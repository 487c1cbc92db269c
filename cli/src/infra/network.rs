//! Network infrastructure: implements `ReachabilityProbe` with a bounded
//! tokio connect.

use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::application::ports::ReachabilityProbe;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Production probe. A failed lookup, refused connection, or slow handshake
/// all mean "not reachable yet".
pub struct TokioNetworkProbe;

impl ReachabilityProbe for TokioNetworkProbe {
    async fn check_tcp_connectivity(&self, host: &str, port: u16) -> Result<bool> {
        match timeout(CONNECT_TIMEOUT, TcpStream::connect((host, port))).await {
            Ok(Ok(_)) => Ok(true),
            Ok(Err(e)) => {
                debug!(%host, port, error = %e, "not reachable");
                Ok(false)
            }
            Err(_) => {
                debug!(%host, port, "connect timed out");
                Ok(false)
            }
        }
    }
}
