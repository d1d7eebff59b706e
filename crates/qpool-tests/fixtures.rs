//! Shared fixtures for socket-level pool tests.
//!
//! [`EchoServer`] listens on an ephemeral loopback port (or a Unix socket in
//! a temporary directory), echoes every byte back, and keeps two counters:
//! connections accepted and connections whose peer closed. Tests use the
//! first to prove reuse (no new dial) and the second to prove a physical
//! close happened.
//!
//! # Usage
//!
//! ```rust,ignore
//! use qpool_tests::fixtures::{echo_server, EchoServer};
//! use rstest::rstest;
//!
//! #[rstest]
//! fn test_round_trip(echo_server: EchoServer) {
//!     let pool = echo_server.pool(1, 4).unwrap();
//!     let mut conn = pool.acquire().unwrap();
//!     round_trip(&mut conn, b"ping").unwrap();
//! }
//! ```

use anyhow::{Context, Result, bail};
use qpool::{QueuePool, TcpConnector};
use rstest::fixture;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// How long [`wait_for`] polls before giving up
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Loopback echo server counting accepted and closed connections
pub struct EchoServer {
    addr: SocketAddr,
    stats: Arc<ServerStats>,
}

#[derive(Default)]
struct ServerStats {
    accepted: AtomicUsize,
    disconnected: AtomicUsize,
}

impl EchoServer {
    /// Bind an ephemeral loopback port and start serving
    pub fn start() -> Result<Self> {
        initialize_logging();

        let listener = TcpListener::bind("127.0.0.1:0").context("binding echo server")?;
        let addr = listener.local_addr()?;
        let stats = Arc::new(ServerStats::default());

        let server_stats = stats.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                server_stats.accepted.fetch_add(1, Ordering::SeqCst);
                let stats = server_stats.clone();
                thread::spawn(move || {
                    let _ = echo(stream);
                    stats.disconnected.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        tracing::debug!(%addr, "echo server listening");
        Ok(Self { addr, stats })
    }

    /// Address the server listens on
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// A connector dialing this server
    pub fn connector(&self) -> TcpConnector {
        TcpConnector::new(self.addr).with_connect_timeout(Duration::from_secs(2))
    }

    /// Build a pool against this server, failing on any warm-up error
    pub fn pool(&self, init: i64, max: i64) -> Result<Arc<QueuePool<TcpStream>>> {
        let (pool, errors) = QueuePool::builder()
            .init_conns(init)
            .max_conns(max)
            .factory(self.connector())
            .build()?;
        if let Some(errors) = errors {
            bail!("warm-up failed: {}", errors);
        }
        Ok(Arc::new(pool))
    }

    /// Connections the server has accepted so far
    pub fn accepted(&self) -> usize {
        self.stats.accepted.load(Ordering::SeqCst)
    }

    /// Connections whose client side has been closed
    pub fn disconnected(&self) -> usize {
        self.stats.disconnected.load(Ordering::SeqCst)
    }

    /// Wait until the server has accepted `n` connections
    pub fn wait_accepted(&self, n: usize) -> Result<()> {
        wait_for(|| self.accepted() >= n)
            .with_context(|| format!("expected {} accepted, saw {}", n, self.accepted()))
    }

    /// Wait until the server has seen `n` connections close
    pub fn wait_disconnected(&self, n: usize) -> Result<()> {
        wait_for(|| self.disconnected() >= n)
            .with_context(|| format!("expected {} disconnected, saw {}", n, self.disconnected()))
    }
}

/// Fresh echo server per test
#[fixture]
pub fn echo_server() -> EchoServer {
    EchoServer::start().expect("echo server should start")
}

fn echo(mut stream: TcpStream) -> io::Result<()> {
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        stream.write_all(&buf[..n])?;
    }
}

/// Write `payload` and read the same number of bytes back
pub fn round_trip<S: Read + Write>(stream: &mut S, payload: &[u8]) -> Result<Vec<u8>> {
    stream.write_all(payload)?;
    stream.flush()?;
    let mut echoed = vec![0u8; payload.len()];
    stream.read_exact(&mut echoed).context("reading echo")?;
    Ok(echoed)
}

/// Poll `cond` until it holds or [`WAIT_TIMEOUT`] passes
pub fn wait_for(mut cond: impl FnMut() -> bool) -> Result<()> {
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while !cond() {
        if Instant::now() >= deadline {
            bail!("condition not met within {:?}", WAIT_TIMEOUT);
        }
        thread::sleep(Duration::from_millis(10));
    }
    Ok(())
}

/// An address nothing listens on
pub fn dead_addr() -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?)
}

/// Initialize logging for tests if not already initialized
///
/// This sets up tracing with appropriate filters for test output.
pub fn initialize_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("qpool=debug,qpool_tests=debug"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_server_round_trip() {
        let server = EchoServer::start().unwrap();
        let mut stream = TcpStream::connect(server.addr()).unwrap();

        assert_eq!(round_trip(&mut stream, b"hello").unwrap(), b"hello");
        server.wait_accepted(1).unwrap();

        drop(stream);
        server.wait_disconnected(1).unwrap();
    }

    #[test]
    fn test_wait_for_times_out() {
        assert!(wait_for(|| false).is_err());
    }
}
