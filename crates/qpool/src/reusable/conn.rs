//! Reusable connection wrapper

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;

use parking_lot::RwLock;
use qpool_core::{Connection, PoolError, Result};

use crate::pool::QueuePool;

/// A connection whose close hands it back to its pool
///
/// Reads and writes go straight to the wrapped connection. Closing either
/// releases the connection into the pool (when marked usable) or closes it
/// for real (the default), never both. Dropping the wrapper without
/// closing it does the same thing as closing it.
pub struct ReusableConn<C: Connection> {
    /// The wrapped connection, taken out exactly once on close
    conn: Option<C>,
    /// Pool the connection goes back to
    pool: Arc<QueuePool<C>>,
    /// Whether close may recycle the connection
    usable: RwLock<bool>,
}

impl<C: Connection> ReusableConn<C> {
    /// Wrap a connection taken from `pool`
    ///
    /// The wrapper starts unusable: closing it before calling
    /// [`ReusableConn::set_usable`] closes the connection.
    pub fn new(conn: C, pool: Arc<QueuePool<C>>) -> Self {
        Self {
            conn: Some(conn),
            pool,
            usable: RwLock::new(false),
        }
    }

    /// Allow close to return the connection to the pool
    pub fn set_usable(&self) {
        *self.usable.write() = true;
    }

    /// Make close terminate the connection instead of recycling it
    pub fn set_unusable(&self) {
        *self.usable.write() = false;
    }

    pub fn is_usable(&self) -> bool {
        *self.usable.read()
    }

    /// Get the pool this connection belongs to
    pub fn pool(&self) -> &Arc<QueuePool<C>> {
        &self.pool
    }

    /// Get a reference to the wrapped connection
    pub fn get_ref(&self) -> Option<&C> {
        self.conn.as_ref()
    }

    /// Get a mutable reference to the wrapped connection
    pub fn get_mut(&mut self) -> Option<&mut C> {
        self.conn.as_mut()
    }

    /// Release the connection to the pool if usable, otherwise close it
    pub fn close(mut self) -> Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        let usable = self.usable.read();
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        if *usable {
            self.pool.release(conn)
        } else {
            Ok(conn.close()?)
        }
    }

    fn conn_mut(&mut self) -> io::Result<&mut C> {
        self.conn
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "connection already closed"))
    }
}

impl<C: Connection> Read for ReusableConn<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.conn_mut()?.read(buf)
    }
}

impl<C: Connection> Write for ReusableConn<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.conn_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.conn_mut()?.flush()
    }
}

impl<C: Connection> Connection for ReusableConn<C> {
    fn close(mut self) -> io::Result<()> {
        self.finish().map_err(|e| match e {
            PoolError::Io(e) => e,
            other => io::Error::other(other),
        })
    }
}

impl<C: Connection> Drop for ReusableConn<C> {
    fn drop(&mut self) {
        if self.conn.is_none() {
            return;
        }
        if let Err(e) = self.finish() {
            tracing::warn!(error = %e, "failed to close dropped reusable connection");
        }
    }
}

impl<C: Connection> fmt::Debug for ReusableConn<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReusableConn")
            .field("open", &self.conn.is_some())
            .field("usable", &self.is_usable())
            .finish_non_exhaustive()
    }
}
