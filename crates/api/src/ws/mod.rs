//! Duplex peer channel: connection lifecycle, registry, and keepalive.

mod handler;
mod heartbeat;
pub mod manager;
pub mod messages;

pub use handler::{ws_handler, LIVENESS_GREETING};
pub use heartbeat::start_heartbeat;
pub use manager::PeerRegistry;
