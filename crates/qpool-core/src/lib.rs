//! QPool Core - Core abstractions for the connection queue pool
//!
//! This crate provides the traits and types the pool crate builds on:
//!
//! - `Connection` - Trait for byte-stream connections the pool can hold
//! - `ConnectionFactory` - Trait for constructors that mint new connections
//! - `TcpConnector` - Ready-made factory dialing a TCP address
//! - `PoolError` / `ErrorList` - Single-operation and batch error types

mod connection;
mod error;
mod factory;

pub use connection::*;
pub use error::{BatchOp, ErrorList, PoolError, Result};
pub use factory::{ConnectionFactory, TcpConnector};
