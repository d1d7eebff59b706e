//! Pool configuration types

use serde::{Deserialize, Serialize};

/// Initial population used when the configured value is negative
pub const DEFAULT_INIT_CONNS: usize = 30;
/// Queue capacity used when the configured value is below one
pub const DEFAULT_MAX_CONNS: usize = 100;

/// Configuration for a connection queue pool
///
/// The raw values are kept as given so that a config read from disk can be
/// inspected; the getters return the normalized values the pool runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of connections built when the pool is created
    init_conns: i64,
    /// Maximum number of connections kept in the queue
    max_conns: i64,
}

impl PoolConfig {
    /// Create a new pool configuration
    ///
    /// Out-of-range values are not rejected; a negative `init_conns` or a
    /// `max_conns` below one falls back to the defaults.
    pub fn new(init_conns: i64, max_conns: i64) -> Self {
        Self {
            init_conns,
            max_conns,
        }
    }

    /// Set the initial population
    pub fn with_init_conns(mut self, init_conns: i64) -> Self {
        self.init_conns = init_conns;
        self
    }

    /// Set the queue capacity
    pub fn with_max_conns(mut self, max_conns: i64) -> Self {
        self.max_conns = max_conns;
        self
    }

    /// Get the queue capacity
    ///
    /// The queue's slots are allocated up front, so a very large value fails
    /// to allocate when the pool is built.
    pub fn max_conns(&self) -> usize {
        if self.max_conns < 1 {
            DEFAULT_MAX_CONNS
        } else {
            usize::try_from(self.max_conns).unwrap_or(usize::MAX)
        }
    }

    /// Get the initial population, never more than the queue capacity
    pub fn init_conns(&self) -> usize {
        self.requested_init_conns().min(self.max_conns())
    }

    /// Whether the requested initial population had to be cut to fit
    pub fn is_init_clamped(&self) -> bool {
        self.requested_init_conns() > self.max_conns()
    }

    fn requested_init_conns(&self) -> usize {
        if self.init_conns < 0 {
            DEFAULT_INIT_CONNS
        } else {
            usize::try_from(self.init_conns).unwrap_or(usize::MAX)
        }
    }
}

impl Default for PoolConfig {
    /// Create a default pool configuration
    ///
    /// Defaults:
    /// - init_conns: 30
    /// - max_conns: 100
    fn default() -> Self {
        Self::new(DEFAULT_INIT_CONNS as i64, DEFAULT_MAX_CONNS as i64)
    }
}
