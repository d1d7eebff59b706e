//! Connections that return to their pool when closed
//!
//! A [`ReusableConn`] lets code written against plain "use, then close"
//! connections recycle sockets without knowing about the pool. The holder
//! decides whether the connection is fit for reuse: a wrapper starts out
//! unusable and only goes back to the pool after [`ReusableConn::set_usable`].
//!
//! # Example
//!
//! ```ignore
//! let mut conn = pool.acquire_reusable()?;
//! conn.set_usable();
//! if let Err(e) = conn.write_all(request) {
//!     // Don't hand a broken stream to the next caller
//!     conn.set_unusable();
//! }
//! conn.close()?;
//! ```

mod conn;


pub use conn::ReusableConn;
