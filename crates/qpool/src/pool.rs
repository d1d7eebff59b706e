//! Connection queue pool
//!
//! A bounded FIFO of live connections plus a factory for minting new ones.
//! Acquire never waits for capacity: an empty queue means a fresh
//! connection is built on the spot. Release never grows the queue: a full
//! queue means the returned connection is closed.
//!
//! # Example
//!
//! ```ignore
//! use qpool::pool::{PoolConfig, QueuePool};
//!
//! let config = PoolConfig::new(5, 20);
//! let (pool, errors) = QueuePool::new(config, connector);
//! if let Some(errors) = errors {
//!     tracing::warn!(%errors, "pool only partially warmed");
//! }
//! let conn = pool.acquire()?;
//! // Use connection...
//! pool.release(conn)?;
//! ```

mod config;
mod pool;


pub use config::{DEFAULT_INIT_CONNS, DEFAULT_MAX_CONNS, PoolConfig};
pub use pool::{QueuePool, QueuePoolBuilder};
