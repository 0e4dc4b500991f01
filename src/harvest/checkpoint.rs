//! Resumable progress on disk.
//!
//! Two files are kept while a run is in flight: the partial record list
//! (what resumption reads back) and a small `{ completedCount, totalCount }`
//! marker for anyone watching progress. Both are replaced atomically and
//! removed once the final output exists.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::model::{HarvestRecord, ProgressMarker, Target};
use crate::traits::CheckpointError;

/// Either form a checkpoint file may hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Checkpoint {
    Progress(ProgressMarker),
    Partial(Vec<HarvestRecord>),
}

impl Checkpoint {
    /// Records available for resumption. A bare progress marker has none.
    pub fn into_records(self) -> Vec<HarvestRecord> {
        match self {
            Checkpoint::Progress(_) => Vec::new(),
            Checkpoint::Partial(records) => records,
        }
    }
}

/// Targets that still need a record, given the records of a prior partial run.
///
/// Resumption is positional: the first `prior.len()` targets are considered
/// done. A URL mismatch at the same position means the index changed between
/// runs; it is reported but does not stop the resume.
pub fn resume<'a>(prior: &[HarvestRecord], targets: &'a [Target]) -> &'a [Target] {
    let done = prior.len().min(targets.len());

    let drifted = prior
        .iter()
        .zip(targets)
        .filter(|(record, target)| record.target.url != target.url)
        .count();
    if drifted > 0 {
        warn!(
            drifted,
            done, "Prior records do not line up with the current index"
        );
    }

    &targets[done..]
}

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    partial_path: PathBuf,
    progress_path: PathBuf,
}

impl CheckpointStore {
    pub fn new(partial_path: impl Into<PathBuf>, progress_path: impl Into<PathBuf>) -> Self {
        Self {
            partial_path: partial_path.into(),
            progress_path: progress_path.into(),
        }
    }

    pub fn partial_path(&self) -> &Path {
        &self.partial_path
    }

    pub fn progress_path(&self) -> &Path {
        &self.progress_path
    }

    /// Loads prior records, or `None` when no partial file exists.
    pub async fn load(&self) -> Result<Option<Vec<HarvestRecord>>, CheckpointError> {
        let raw = match tokio::fs::read_to_string(&self.partial_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(io_error(&self.partial_path, source)),
        };

        let checkpoint: Checkpoint =
            serde_json::from_str(&raw).map_err(|source| CheckpointError::Json {
                path: self.partial_path.display().to_string(),
                source,
            })?;
        let records = checkpoint.into_records();

        info!(
            records = records.len(),
            path = %self.partial_path.display(),
            "Loaded checkpoint"
        );
        Ok(Some(records))
    }

    /// Writes the partial record list and the progress marker.
    ///
    /// `segments` are written back to back as one array, so prior and new
    /// records can be saved without first joining them.
    pub async fn save(
        &self,
        segments: &[&[HarvestRecord]],
        marker: ProgressMarker,
    ) -> Result<(), CheckpointError> {
        write_json(&self.partial_path, &Segments(segments)).await?;
        write_json(&self.progress_path, &marker).await
    }

    /// Removes both files; missing files are fine.
    pub async fn clear(&self) -> Result<(), CheckpointError> {
        for path in [&self.partial_path, &self.progress_path] {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(io_error(path, source)),
            }
        }
        Ok(())
    }
}

struct Segments<'a>(&'a [&'a [HarvestRecord]]);

impl Serialize for Segments<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().flat_map(|segment| segment.iter()))
    }
}

/// Serializes to a sibling temp file then renames over `path`.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CheckpointError> {
    let body = serde_json::to_vec(value).map_err(|source| CheckpointError::Json {
        path: path.display().to_string(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| io_error(parent, source))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, body)
        .await
        .map_err(|source| io_error(&tmp, source))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> CheckpointError {
    CheckpointError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageSignals;

    fn targets(n: usize) -> Vec<Target> {
        (0..n)
            .map(|i| Target::new(format!("Dev {i}"), format!("https://dev{i}.io"), ""))
            .collect()
    }

    fn store(dir: &tempfile::TempDir) -> CheckpointStore {
        CheckpointStore::new(
            dir.path().join("portfolios.json.partial"),
            dir.path().join(".progress.json"),
        )
    }

    #[test]
    fn test_resume_skips_completed_prefix() {
        let all = targets(5);
        let prior: Vec<_> = all[..2]
            .iter()
            .cloned()
            .map(|t| HarvestRecord::error(t, "timeout"))
            .collect();

        let remaining = resume(&prior, &all);

        assert_eq!(remaining, &all[2..]);
    }

    #[test]
    fn test_resume_without_prior_returns_everything() {
        let all = targets(3);
        assert_eq!(resume(&[], &all).len(), 3);
    }

    #[test]
    fn test_resume_with_more_records_than_targets() {
        let all = targets(2);
        let prior: Vec<_> = targets(4)
            .into_iter()
            .map(|t| HarvestRecord::ok(t, PageSignals::default()))
            .collect();

        assert!(resume(&prior, &all).is_empty());
    }

    #[test]
    fn test_progress_marker_checkpoint_has_no_records() {
        let checkpoint: Checkpoint =
            serde_json::from_str(r#"{"completedCount": 40, "totalCount": 90}"#).unwrap();
        assert_eq!(
            checkpoint,
            Checkpoint::Progress(ProgressMarker {
                completed_count: 40,
                total_count: 90
            })
        );
        assert!(checkpoint.into_records().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir).load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let records: Vec<_> = targets(2)
            .into_iter()
            .map(|t| HarvestRecord::error(t, "HTTP 500"))
            .collect();
        let marker = ProgressMarker {
            completed_count: 2,
            total_count: 10,
        };

        store.save(&[records.as_slice()], marker).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(records));
        let raw = std::fs::read_to_string(store.progress_path()).unwrap();
        let on_disk: ProgressMarker = serde_json::from_str(&raw).unwrap();
        assert_eq!(on_disk, marker);

        store.clear().await.unwrap();
        assert!(!store.partial_path().exists());
        assert!(!store.progress_path().exists());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        std::fs::write(store.partial_path(), "{not json").unwrap();

        assert!(matches!(
            store.load().await,
            Err(CheckpointError::Json { .. })
        ));
    }
}
