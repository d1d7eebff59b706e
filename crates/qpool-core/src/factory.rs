//! Connection factories used by the pool to mint new connections

use std::io;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::Connection;

/// Factory trait for creating new connections
///
/// Called once per warm-up slot when a pool is built, and again whenever
/// an acquire finds the pool empty. Implementations must tolerate being
/// called from several threads at once.
pub trait ConnectionFactory<C: Connection>: Send + Sync + 'static {
    /// Create a new connection
    fn create(&self) -> io::Result<C>;
}

impl<C, F> ConnectionFactory<C> for F
where
    C: Connection,
    F: Fn() -> io::Result<C> + Send + Sync + 'static,
{
    fn create(&self) -> io::Result<C> {
        self()
    }
}

/// Factory that dials a fixed TCP address
///
/// The pool itself never times out; a connect timeout set here is the only
/// bound on how long an acquire can spend constructing a connection.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: SocketAddr,
    connect_timeout: Option<Duration>,
}

impl TcpConnector {
    /// Create a connector for the given address with no connect timeout
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connect_timeout: None,
        }
    }

    /// Bound each dial by the given timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

impl ConnectionFactory<TcpStream> for TcpConnector {
    fn create(&self) -> io::Result<TcpStream> {
        let stream = match self.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&self.addr, timeout)?,
            None => TcpStream::connect(self.addr)?,
        };
        tracing::trace!(peer = %self.addr, "dialed new tcp connection");
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_is_a_factory() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let factory = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            TcpStream::connect(addr)
        };

        let stream: TcpStream = ConnectionFactory::create(&factory).unwrap();
        assert_eq!(stream.peer_addr().unwrap(), addr);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_tcp_connector_with_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let connector = TcpConnector::new(addr).with_connect_timeout(Duration::from_secs(2));

        let stream = connector.create().unwrap();
        assert_eq!(stream.peer_addr().unwrap(), addr);
    }

    #[test]
    fn test_tcp_connector_refused() {
        // Bind then drop to get a port nobody listens on
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let connector = TcpConnector::new(addr);
        assert!(connector.create().is_err());
    }
}
