//! Append-only completion log.
//!
//! One flat text file stands in for a queue. Peers report finished
//! artifacts as bare locator lines, the completion watch consumes the
//! newest one by prefixing it with `READ `, and record-mode entries are a
//! `hash: <digest>` line followed by the job's JSON. Append is the only
//! write that is safe under concurrency; last-line reads are best-effort
//! by design.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use sdrelay_core::dedup;
use sdrelay_core::Job;

use crate::error::StoreError;

/// Prefix marking a completion line as consumed.
pub const CONSUMED_PREFIX: &str = "READ ";

/// Handle to the append-only log file.
///
/// Mutating operations serialize on an internal lock so two writers cannot
/// interleave a read-modify-write. Readers do not take the lock; the
/// cross-request race (two pollers reading the same unconsumed line before
/// either marks it) is accepted, since the deployment assumption is one
/// outstanding generation at a time.
pub struct CompletionLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CompletionLog {
    /// Create a handle for the log at `path`. The file itself is created
    /// lazily on the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole log. A missing file reads as empty.
    pub async fn read_all(&self) -> Result<String, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(StoreError::Read(e)),
        }
    }

    /// Append one entry, keeping the file newline-terminated.
    ///
    /// If the file is non-empty but does not already end with a newline
    /// (content written by an earlier tool, for example), a separator
    /// newline goes in first so this entry cannot merge with the previous
    /// line.
    pub async fn append(&self, line: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let existing = self.read_all().await?;
        let mut chunk = String::new();
        if !existing.is_empty() && !existing.ends_with('\n') {
            chunk.push('\n');
        }
        chunk.push_str(line);
        chunk.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(StoreError::Write)?;
        file.write_all(chunk.as_bytes())
            .await
            .map_err(StoreError::Write)?;
        // write_all only hands the bytes to tokio's writer buffer; the line
        // must be on disk before the append is reported done, or a reader
        // polling right after us sees a stale file.
        file.flush().await.map_err(StoreError::Write)?;

        tracing::debug!(path = %self.path.display(), line, "Appended to log");
        Ok(())
    }

    /// The final log line, unless it is already consumed.
    ///
    /// Returns `None` when the log is absent, empty, or its final line
    /// carries the `READ ` prefix.
    pub async fn read_last_unconsumed(&self) -> Result<Option<String>, StoreError> {
        let text = self.read_all().await?;
        let trimmed = text.trim();
        let Some(last) = trimmed.lines().next_back() else {
            return Ok(None);
        };
        if last.starts_with(CONSUMED_PREFIX) {
            return Ok(None);
        }
        Ok(Some(last.to_string()))
    }

    /// Rewrite the final line with the `READ ` prefix, leaving every other
    /// line untouched.
    ///
    /// Idempotent: an already-consumed final line is not prefixed twice.
    /// Call only after the artifact behind the line has been retrieved;
    /// the line is the only reference to it.
    pub async fn mark_last_consumed(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let text = self.read_all().await?;
        let body = text.trim_end();
        if body.is_empty() {
            return Ok(());
        }

        let (head, last) = match body.rfind('\n') {
            Some(idx) => body.split_at(idx + 1),
            None => ("", body),
        };
        if last.starts_with(CONSUMED_PREFIX) {
            return Ok(());
        }

        let updated = format!("{head}{CONSUMED_PREFIX}{last}\n");
        tokio::fs::write(&self.path, updated)
            .await
            .map_err(StoreError::Write)
    }

    /// Parse every `hash:`-delimited job entry, in log order.
    ///
    /// Each segment after a `hash: ` delimiter loses its first (digest)
    /// line; the remainder is parsed as a job. Segments that fail to parse
    /// are skipped, never fatal.
    pub async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let text = self.read_all().await?;
        let mut jobs = Vec::new();
        for segment in text.split(dedup::HASH_TAG_PREFIX).skip(1) {
            let Some((_digest, body)) = segment.split_once('\n') else {
                continue;
            };
            match Job::parse(body.trim()) {
                Ok(job) => jobs.push(job),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unparseable log entry");
                }
            }
        }
        Ok(jobs)
    }

    /// Remove every line containing `tag` and rewrite the file in one
    /// pass, preserving the relative order of kept lines.
    ///
    /// Returns how many lines were removed.
    pub async fn delete_by_tag(&self, tag: &str) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;

        let text = self.read_all().await?;
        let lines: Vec<&str> = text.split('\n').collect();
        let total = lines.len();
        let kept: Vec<&str> = lines.into_iter().filter(|line| !line.contains(tag)).collect();
        let removed = total - kept.len();
        if removed == 0 {
            return Ok(0);
        }

        tokio::fs::write(&self.path, kept.join("\n"))
            .await
            .map_err(StoreError::Write)?;
        Ok(removed)
    }

    /// Append a listing entry for `job`: its fingerprint tag, then its
    /// canonical JSON on the following line.
    pub async fn record_job(&self, job: &Job) -> Result<(), StoreError> {
        let entry = format!("{}\n{}", dedup::fingerprint_tag(job), job.canonical_json());
        self.append(&entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn temp_log(dir: &TempDir) -> CompletionLog {
        CompletionLog::new(dir.path().join("requests.log"))
    }

    fn job(value: serde_json::Value) -> Job {
        serde_json::from_value(value).expect("valid job object")
    }

    // -----------------------------------------------------------------------
    // append
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn append_creates_file_and_terminates_line() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        log.append("http://host/a.png").await.unwrap();

        let text = log.read_all().await.unwrap();
        assert_eq!(text, "http://host/a.png\n");
    }

    #[tokio::test]
    async fn append_keeps_lines_separate() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        log.append("first").await.unwrap();
        log.append("second").await.unwrap();

        assert_eq!(log.read_all().await.unwrap(), "first\nsecond\n");
    }

    #[tokio::test]
    async fn append_bridges_unterminated_content() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);
        std::fs::write(log.path(), "legacy").unwrap();

        log.append("next").await.unwrap();

        assert_eq!(log.read_all().await.unwrap(), "legacy\nnext\n");
    }

    #[tokio::test]
    async fn append_is_visible_to_other_readers_once_it_returns() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        // Read through std::fs rather than the handle, so the line cannot
        // be served out of a writer buffer that never reached the file.
        for i in 0..32 {
            let line = format!("http://host/{i}.png");
            log.append(&line).await.unwrap();

            let on_disk = std::fs::read_to_string(log.path()).unwrap();
            assert!(
                on_disk.ends_with(&format!("{line}\n")),
                "Append returned but the line is not in the file: {on_disk:?}"
            );
        }
    }

    // -----------------------------------------------------------------------
    // read_all / read_last_unconsumed
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn read_all_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        assert_eq!(log.read_all().await.unwrap(), "");
    }

    #[tokio::test]
    async fn read_last_unconsumed_none_when_missing_or_empty() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        assert_eq!(log.read_last_unconsumed().await.unwrap(), None);

        std::fs::write(log.path(), "\n\n").unwrap();
        assert_eq!(log.read_last_unconsumed().await.unwrap(), None);
    }

    #[tokio::test]
    async fn read_last_unconsumed_returns_latest_line() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        log.append("http://host/a.png").await.unwrap();
        log.append("http://host/b.png").await.unwrap();
        log.append("http://host/c.png").await.unwrap();

        assert_eq!(
            log.read_last_unconsumed().await.unwrap().as_deref(),
            Some("http://host/c.png")
        );
    }

    #[tokio::test]
    async fn read_last_unconsumed_none_when_consumed() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        log.append("http://host/a.png").await.unwrap();
        log.mark_last_consumed().await.unwrap();

        assert_eq!(log.read_last_unconsumed().await.unwrap(), None);
    }

    // -----------------------------------------------------------------------
    // mark_last_consumed
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn mark_last_consumed_prefixes_final_line_only() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        log.append("http://host/a.png").await.unwrap();
        log.append("http://host/b.png").await.unwrap();
        log.mark_last_consumed().await.unwrap();

        assert_eq!(
            log.read_all().await.unwrap(),
            "http://host/a.png\nREAD http://host/b.png\n"
        );
    }

    #[tokio::test]
    async fn mark_last_consumed_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        log.append("http://host/a.png").await.unwrap();
        log.mark_last_consumed().await.unwrap();
        let after_first = log.read_all().await.unwrap();

        log.mark_last_consumed().await.unwrap();
        let after_second = log.read_all().await.unwrap();

        assert_eq!(after_first, after_second);
        assert_eq!(after_second, "READ http://host/a.png\n");
    }

    #[tokio::test]
    async fn mark_last_consumed_on_empty_log_is_noop() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        log.mark_last_consumed().await.unwrap();
        assert_eq!(log.read_all().await.unwrap(), "");
    }

    // -----------------------------------------------------------------------
    // list_jobs
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn list_jobs_returns_entries_in_order() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        let first = job(json!({ "prompt": "castle", "seed": 1 }));
        let second = job(json!({ "prompt": "forest", "seed": 2 }));
        log.record_job(&first).await.unwrap();
        log.record_job(&second).await.unwrap();

        let jobs = log.list_jobs().await.unwrap();
        assert_eq!(jobs, vec![first, second]);
    }

    #[tokio::test]
    async fn list_jobs_skips_unparseable_entries() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        log.append("hash: 0000\n{not valid json").await.unwrap();
        let good = job(json!({ "prompt": "castle" }));
        log.record_job(&good).await.unwrap();

        assert_eq!(log.list_jobs().await.unwrap(), vec![good]);
    }

    #[tokio::test]
    async fn list_jobs_ignores_bare_locator_lines() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        log.append("http://host/a.png").await.unwrap();
        log.append("READ http://host/b.png").await.unwrap();

        assert!(log.list_jobs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_jobs_empty_when_file_missing() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        assert!(log.list_jobs().await.unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // delete_by_tag
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn delete_by_tag_removes_matching_lines_preserving_order() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        let target = job(json!({ "prompt": "castle" }));
        let tag = dedup::fingerprint_tag(&target);

        log.append("http://host/a.png").await.unwrap();
        log.record_job(&target).await.unwrap();
        log.append("http://host/b.png").await.unwrap();

        let removed = log.delete_by_tag(&tag).await.unwrap();
        assert_eq!(removed, 1);

        let text = log.read_all().await.unwrap();
        assert!(!text.contains(&tag));
        // Unmatched lines keep their relative order; the entry body line
        // (which does not contain the tag) survives.
        let lines: Vec<&str> = text.trim().split('\n').collect();
        assert_eq!(lines[0], "http://host/a.png");
        assert_eq!(*lines.last().unwrap(), "http://host/b.png");
    }

    #[tokio::test]
    async fn delete_by_tag_without_match_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        log.append("http://host/a.png").await.unwrap();
        let before = log.read_all().await.unwrap();

        let removed = log.delete_by_tag("hash: no-such-digest").await.unwrap();
        assert_eq!(removed, 0);
        assert_eq!(log.read_all().await.unwrap(), before);
    }

    // -----------------------------------------------------------------------
    // record_job
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn record_job_writes_tag_then_body() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        let j = job(json!({ "prompt": "castle", "seed": 9 }));
        log.record_job(&j).await.unwrap();

        let text = log.read_all().await.unwrap();
        let expected = format!("{}\n{}\n", dedup::fingerprint_tag(&j), j.canonical_json());
        assert_eq!(text, expected);
        assert!(dedup::is_duplicate(&j, &text));
    }

    #[tokio::test]
    async fn locator_after_record_is_still_the_last_unconsumed() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        log.record_job(&job(json!({ "prompt": "castle" })))
            .await
            .unwrap();
        log.append("http://host/out.png").await.unwrap();

        assert_eq!(
            log.read_last_unconsumed().await.unwrap().as_deref(),
            Some("http://host/out.png")
        );
    }
}
