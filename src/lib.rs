//! Client for a fleet host lifecycle API.
//!
//! `hostcycle` asks an external fleet-management service to replace or
//! terminate cluster hosts, and reads each host's status history to confirm
//! that a requested removal is pending or complete.
//!
//! Operations never fail on transport or protocol errors. Those are logged
//! through `tracing` and reported as `false` (or `None`), or as
//! [`lifecycle::Confirmation::Unknown`] by the tri-state checks. The only
//! errors a lifecycle operation returns are a missing API token or an empty
//! host identifier, both detected before any request is sent.
//!
//! # Modules
//!
//! - [`config`]: Configuration system with layered precedence (env > file > defaults)
//! - [`error`]: Semantic error types for the library
//! - [`lifecycle`]: Async and blocking lifecycle clients
//! - [`watch`]: Polling with backoff until a host condition is confirmed

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod watch;
