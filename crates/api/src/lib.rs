//! Relay API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, the
//! peer channel, and the completion watch) so integration tests and the
//! binary entrypoint can both access them.

pub mod artifact;
pub mod config;
pub mod error;
pub mod handlers;
pub mod poller;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
