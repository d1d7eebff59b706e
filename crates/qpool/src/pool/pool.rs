//! Connection queue pool implementation

use std::fmt;
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use parking_lot::RwLock;
use qpool_core::{BatchOp, Connection, ConnectionFactory, ErrorList, PoolError, Result};

use super::config::PoolConfig;
use crate::reusable::ReusableConn;

/// A bounded FIFO pool of reusable connections
///
/// The queue is held behind a read/write lock that only guards whether the
/// pool is still open: acquire and release take the shared side and rely
/// on the lock-free queue for the actual push/pop, while close takes the
/// exclusive side for its whole drain so no connection slips in or out
/// halfway through.
pub struct QueuePool<C: Connection> {
    /// Queued idle connections, `None` once the pool is closed
    queue: RwLock<Option<ArrayQueue<C>>>,
    /// Factory for warm-up and on-demand connections
    factory: Arc<dyn ConnectionFactory<C>>,
    /// Pool configuration
    config: PoolConfig,
}

impl<C: Connection> QueuePool<C> {
    /// Create a new pool and warm it up with `config.init_conns()` connections
    ///
    /// Warm-up is best effort: connections the factory fails to build are
    /// skipped and their errors returned next to the pool, which is usable
    /// either way.
    pub fn new<F: ConnectionFactory<C>>(
        config: PoolConfig,
        factory: F,
    ) -> (Self, Option<ErrorList>) {
        Self::with_factory(config, Arc::new(factory))
    }

    /// Start building a pool
    pub fn builder() -> QueuePoolBuilder<C> {
        QueuePoolBuilder::new()
    }

    fn with_factory(
        config: PoolConfig,
        factory: Arc<dyn ConnectionFactory<C>>,
    ) -> (Self, Option<ErrorList>) {
        if config.is_init_clamped() {
            tracing::warn!(
                init_conns = config.init_conns(),
                max_conns = config.max_conns(),
                "initial population exceeds capacity, clamping"
            );
        }

        let pool = Self {
            queue: RwLock::new(Some(ArrayQueue::new(config.max_conns()))),
            factory,
            config,
        };
        let errors = pool.warm_up(pool.config.init_conns());
        (pool, errors.into_result().err())
    }

    #[tracing::instrument(skip(self))]
    fn warm_up(&self, count: usize) -> ErrorList {
        let mut errors = ErrorList::new(BatchOp::Construct);
        let guard = self.queue.read();
        let Some(queue) = guard.as_ref() else {
            return errors;
        };

        for _ in 0..count {
            let Some(conn) = errors.collect(self.factory.create()) else {
                continue;
            };
            if let Err(conn) = queue.push(conn) {
                // init_conns is clamped to capacity, so the queue has room
                errors.collect(conn.close());
            }
        }

        if errors.is_empty() {
            tracing::debug!(idle = queue.len(), "pool warmed up");
        } else {
            tracing::warn!(
                idle = queue.len(),
                failed = errors.len(),
                "pool partially warmed up"
            );
        }
        errors
    }

    /// Take a connection from the pool
    ///
    /// Returns the oldest queued connection, or builds a new one right away
    /// if the queue is empty. Never waits for another caller to release.
    ///
    /// The pool lock is dropped before the factory runs, so an acquire racing
    /// with [`QueuePool::close`] may still hand out a connection built after
    /// the pool closed. Releasing that connection closes it.
    pub fn acquire(&self) -> Result<C> {
        {
            let guard = self.queue.read();
            let queue = guard.as_ref().ok_or(PoolError::PoolClosed)?;
            if let Some(conn) = queue.pop() {
                tracing::trace!(idle = queue.len(), "reusing queued connection");
                return Ok(conn);
            }
        }

        let conn = self.factory.create().map_err(|e| {
            tracing::warn!(error = %e, "failed to create connection on demand");
            PoolError::ConstructFail(e)
        })?;
        tracing::debug!("queue empty, created new connection");
        Ok(conn)
    }

    /// Take a connection wrapped so that closing it returns it here
    pub fn acquire_reusable(self: &Arc<Self>) -> Result<ReusableConn<C>> {
        let conn = self.acquire()?;
        Ok(ReusableConn::new(conn, Arc::clone(self)))
    }

    /// Return a connection to the pool
    ///
    /// If the queue is full or the pool is closed the connection is closed
    /// instead, and any error from that close is returned.
    pub fn release(&self, conn: C) -> Result<()> {
        self.put(Some(conn))
    }

    /// Return a possibly absent connection to the pool
    ///
    /// Same as [`QueuePool::release`] but rejects `None` with
    /// [`PoolError::NilConnection`].
    pub fn put(&self, conn: Option<C>) -> Result<()> {
        let conn = conn.ok_or(PoolError::NilConnection)?;

        let guard = self.queue.read();
        let Some(queue) = guard.as_ref() else {
            tracing::debug!("pool closed, closing released connection");
            return Ok(conn.close()?);
        };

        match queue.push(conn) {
            Ok(()) => Ok(()),
            Err(conn) => {
                tracing::debug!(
                    capacity = queue.capacity(),
                    "pool full, closing released connection"
                );
                Ok(conn.close()?)
            }
        }
    }

    /// Close every queued connection and shut the pool
    ///
    /// Failures to close individual connections are collected, not fatal.
    /// Once closed, acquire fails with [`PoolError::PoolClosed`] and release
    /// closes its argument. Closing an already closed pool is a no-op.
    #[tracing::instrument(skip(self))]
    pub fn close(&self) -> std::result::Result<(), ErrorList> {
        let mut guard = self.queue.write();
        let Some(queue) = guard.take() else {
            tracing::debug!("pool already closed");
            return Ok(());
        };

        let mut errors = ErrorList::new(BatchOp::Close);
        let mut closed = 0usize;
        while let Some(conn) = queue.pop() {
            errors.collect(conn.close());
            closed += 1;
        }

        if errors.is_empty() {
            tracing::info!(closed, "connection pool closed");
        } else {
            tracing::warn!(closed, failed = errors.len(), "connection pool closed with errors");
        }
        errors.into_result()
    }

    /// Number of connections waiting in the queue
    ///
    /// Connections currently on loan are not counted.
    pub fn count(&self) -> usize {
        self.queue.read().as_ref().map_or(0, ArrayQueue::len)
    }

    pub fn is_closed(&self) -> bool {
        self.queue.read().is_none()
    }

    /// Maximum number of connections the queue holds
    pub fn capacity(&self) -> usize {
        self.config.max_conns()
    }
}

impl<C: Connection> fmt::Debug for QueuePool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuePool")
            .field("idle", &self.count())
            .field("capacity", &self.capacity())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Builder for [`QueuePool`]
///
/// Unlike [`QueuePool::new`], the factory is optional here and a missing
/// one is reported as [`PoolError::BadConstructor`] by `build`.
pub struct QueuePoolBuilder<C: Connection> {
    config: PoolConfig,
    factory: Option<Arc<dyn ConnectionFactory<C>>>,
}

impl<C: Connection> QueuePoolBuilder<C> {
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
            factory: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the initial population (negative means the default)
    pub fn init_conns(mut self, init_conns: i64) -> Self {
        self.config = self.config.with_init_conns(init_conns);
        self
    }

    /// Set the queue capacity (below one means the default)
    pub fn max_conns(mut self, max_conns: i64) -> Self {
        self.config = self.config.with_max_conns(max_conns);
        self
    }

    /// Set the connection factory
    pub fn factory<F: ConnectionFactory<C>>(mut self, factory: F) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Build and warm up the pool
    ///
    /// Fails only when no factory was supplied. Warm-up failures come back
    /// next to the pool.
    pub fn build(self) -> Result<(QueuePool<C>, Option<ErrorList>)> {
        let factory = self.factory.ok_or(PoolError::BadConstructor)?;
        Ok(QueuePool::with_factory(self.config, factory))
    }
}

impl<C: Connection> Default for QueuePoolBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
