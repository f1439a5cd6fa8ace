//! The fixed prompt rewrite applied before a job is broadcast.

use crate::job::Job;

/// Attention-weight annotation stripped from positive prompts.
pub const WEIGHT_ANNOTATION: &str = ":1.1";

/// Strip every `:1.1` weight annotation from the positive prompt, but only
/// when the job carries a non-empty `negative_prompt`.
///
/// Jobs without a negative prompt pass through untouched.
pub fn apply_rewrites(job: &mut Job) {
    if !job.has_negative_prompt() {
        return;
    }
    if let Some(prompt) = job.prompt() {
        if prompt.contains(WEIGHT_ANNOTATION) {
            let stripped = prompt.replace(WEIGHT_ANNOTATION, "");
            job.set_prompt(stripped);
        }
    }
}
