//! Flat-file persistence for the relay.
//!
//! The system's only durable state is one append-only text log. Peers
//! append artifact locators to it, the completion watch consumes them, and
//! record-mode submissions store whole job entries for later listing. All
//! file access goes through [`CompletionLog`]; no raw handles escape it, so
//! the documented read-then-mark race between concurrent requests stays
//! contained in one place.

mod error;
mod log;

pub use error::StoreError;
pub use log::{CompletionLog, CONSUMED_PREFIX};
