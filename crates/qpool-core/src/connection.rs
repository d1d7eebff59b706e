//! Connection trait and its implementations for std sockets

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

/// A byte-stream connection that can be pooled
///
/// The pool never reads or writes through a connection; it only stores it,
/// hands it out and eventually calls [`Connection::close`]. Reading and
/// writing are left to the borrower through the `Read`/`Write` supertraits.
pub trait Connection: Read + Write + Send + 'static {
    /// Physically close the connection.
    ///
    /// Consumes the connection so it cannot be used (or pooled) afterwards.
    fn close(self) -> io::Result<()>
    where
        Self: Sized;
}

impl Connection for TcpStream {
    fn close(self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // Peer already tore the socket down; dropping releases the fd.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(unix)]
impl Connection for std::os::unix::net::UnixStream {
    fn close(self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_tcp_close_after_peer_dropped() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        drop(server);

        assert!(Connection::close(client).is_ok());
    }

    #[test]
    fn test_tcp_close_signals_eof_to_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (mut server, _) = listener.accept().unwrap();

        Connection::close(client).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(server.read(&mut buf).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_stream_close() {
        use std::os::unix::net::UnixStream;

        let (a, mut b) = UnixStream::pair().unwrap();
        Connection::close(a).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(b.read(&mut buf).unwrap(), 0);
    }
}
