//! Error types for QPool

use std::fmt;
use std::io;

use thiserror::Error;

/// Error returned by single pool operations (acquire, release, wrapper close)
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("constructor cannot be absent")]
    BadConstructor,

    #[error("connection pool is already closed")]
    PoolClosed,

    #[error("failed to create new connection in the constructor: {0}")]
    ConstructFail(#[source] io::Error),

    #[error("cannot put an absent connection into the pool")]
    NilConnection,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// The batch operation an [`ErrorList`] was collected from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOp {
    /// Warm-up construction when a pool is built
    Construct,
    /// Draining and closing every queued connection
    Close,
}

/// Errors collected from a batch operation
///
/// Per-connection failures never abort a batch; they are collected here in
/// the order they occurred and handed back alongside whatever the batch did
/// manage to produce. An empty list means the batch succeeded.
#[derive(Debug)]
pub struct ErrorList {
    op: BatchOp,
    errors: Vec<io::Error>,
}

impl ErrorList {
    /// Create an empty list for the given batch operation
    pub fn new(op: BatchOp) -> Self {
        Self {
            op,
            errors: Vec::new(),
        }
    }

    /// Collect the error of a fallible step, passing its value through.
    ///
    /// `Ok` results are a no-op for the list.
    pub fn collect<T>(&mut self, result: io::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    /// Append an error to the list
    pub fn push(&mut self, err: io::Error) {
        self.errors.push(err);
    }

    /// Number of collected errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The batch operation these errors came from
    pub fn op(&self) -> BatchOp {
        self.op
    }

    pub fn iter(&self) -> std::slice::Iter<'_, io::Error> {
        self.errors.iter()
    }

    /// `Ok(())` when nothing was collected, otherwise the list itself
    pub fn into_result(self) -> std::result::Result<(), ErrorList> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            BatchOp::Construct => "pool construction",
            BatchOp::Close => "pool close",
        };
        writeln!(f, "errors occurred during {}:", op)?;
        for err in &self.errors {
            writeln!(f, "\t- error: {}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

impl IntoIterator for ErrorList {
    type Item = io::Error;
    type IntoIter = std::vec::IntoIter<io::Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a io::Error;
    type IntoIter = std::slice::Iter<'a, io::Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
