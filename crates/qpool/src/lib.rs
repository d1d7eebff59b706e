//! QPool - Bounded queue pool of reusable network connections
//!
//! This crate recycles byte-stream connections instead of closing and
//! re-dialing them.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qpool::{QueuePool, TcpConnector};
//!
//! let (pool, warmup_errors) = QueuePool::builder()
//!     .init_conns(5)
//!     .max_conns(20)
//!     .factory(TcpConnector::new(addr))
//!     .build()?;
//! let pool = Arc::new(pool);
//!
//! let conn = pool.acquire_reusable()?;
//! conn.set_usable();
//! // Read/write through `conn`...
//! conn.close()?; // back into the pool
//! ```

pub mod pool;
pub mod reusable;

pub use pool::{PoolConfig, QueuePool, QueuePoolBuilder};
pub use qpool_core::{
    BatchOp, Connection, ConnectionFactory, ErrorList, PoolError, Result, TcpConnector,
};
pub use reusable::ReusableConn;
