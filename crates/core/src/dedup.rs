//! Content fingerprinting for duplicate detection.
//!
//! A job's identity is the SHA-256 digest of its canonical JSON form. The
//! log stores the digest behind a `hash: ` tag, and duplicate detection is
//! a substring test of that tag against the whole log text rather than a
//! structured lookup.

use sha2::{Digest, Sha256};

use crate::job::Job;

/// Tag prefix recorded ahead of each digest in the log.
pub const HASH_TAG_PREFIX: &str = "hash: ";

/// SHA-256 hex fingerprint of the job's canonical JSON form.
///
/// Two jobs with the same fields produce the same fingerprint no matter
/// what order the caller listed them in.
pub fn fingerprint(job: &Job) -> String {
    let digest = Sha256::digest(job.canonical_json().as_bytes());
    format!("{digest:x}")
}

/// The log tag for a job: `hash: <fingerprint>`.
pub fn fingerprint_tag(job: &Job) -> String {
    format!("{HASH_TAG_PREFIX}{}", fingerprint(job))
}

/// Whether `corpus` already contains this job's fingerprint tag.
///
/// `corpus` is the full log text; the check is a verbatim substring match.
pub fn is_duplicate(job: &Job, corpus: &str) -> bool {
    corpus.contains(&fingerprint_tag(job))
}
