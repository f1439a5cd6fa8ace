//! Domain types and pure logic for the relay: generation jobs, content
//! fingerprinting, and the prompt rewrite rule.
//!
//! Nothing in this crate performs I/O; everything is deterministic and
//! synchronous so the storage and API layers can test against it directly.

pub mod dedup;
pub mod job;
pub mod prompt;

pub use job::Job;
