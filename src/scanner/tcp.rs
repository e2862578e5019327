//! TCP Connect prober.
//!
//! Completes the full TCP handshake through the operating system's socket
//! API, then closes the connection without sending or reading anything.

use crate::scanner::traits::{Prober, ScanOutcome};
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// TCP Connect prober.
///
/// Does not require elevated privileges. The host may be an IP literal or a
/// name; names are resolved on every attempt and a resolution failure is
/// just another closed port.
pub struct TcpConnectProber {
    host: String,
    timeout: Option<Duration>,
}

impl TcpConnectProber {
    /// Create a new TCP connect prober.
    ///
    /// # Arguments
    /// * `host` - Target host name or IP address
    /// * `timeout` - Per-attempt deadline; `None` waits for the OS to give up
    pub fn new(host: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            host: host.into(),
            timeout,
        }
    }

    /// Attempt to connect to the target port.
    async fn attempt_connect(&self, port: u16) -> io::Result<TcpStream> {
        let connect = TcpStream::connect((self.host.as_str(), port));
        match self.timeout {
            Some(limit) => timeout(limit, connect)
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))?,
            None => connect.await,
        }
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn probe(&self, port: Port) -> ScanOutcome {
        match self.attempt_connect(port.as_u16()).await {
            Ok(stream) => {
                drop(stream);
                ScanOutcome::open(port)
            }
            Err(e) => {
                trace!(%port, error = %e, "probe failed");
                ScanOutcome::closed(port)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_listening_port_is_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let prober = TcpConnectProber::new("127.0.0.1", Some(Duration::from_secs(2)));
        assert_eq!(prober.probe(port).await, ScanOutcome::open(port));
    }

    #[tokio::test]
    async fn test_released_port_is_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
        drop(listener);

        let prober = TcpConnectProber::new("127.0.0.1", None);
        assert!(!prober.probe(port).await.open);
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_closed() {
        let prober = TcpConnectProber::new("no-such-host.invalid", Some(Duration::from_secs(2)));
        assert!(!prober.probe(Port::new(80).unwrap()).await.open);
    }

    #[tokio::test]
    async fn test_timeout_bounds_unresponsive_host() {
        // TEST-NET-1 is never routed; the attempt either times out or fails fast.
        let prober = TcpConnectProber::new("192.0.2.1", Some(Duration::from_millis(50)));

        let start = Instant::now();
        let outcome = prober.probe(Port::new(81).unwrap()).await;

        assert!(!outcome.open);
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
