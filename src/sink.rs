//! Artifact sink
//!
//! Persists artifacts as plain UTF-8 text files, one per successfully
//! processed identifier, under a single target directory. Writes share no
//! state with each other; the only cross-write hazard is a file-name
//! collision, which the configured [`CollisionPolicy`] resolves.

use std::path::{Path, PathBuf};

use crate::config::CollisionPolicy;
use crate::error::{Result, WriteError};
use crate::types::Artifact;

/// Maximum number of rename attempts when disambiguating a collision
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Writes artifacts into a target directory
#[derive(Clone, Debug)]
pub struct FileSink {
    dir: PathBuf,
    collision: CollisionPolicy,
}

impl FileSink {
    /// Create a sink for `dir` with the given collision policy
    pub fn new(dir: impl Into<PathBuf>, collision: CollisionPolicy) -> Self {
        Self {
            dir: dir.into(),
            collision,
        }
    }

    /// The target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the target directory if it does not exist yet
    ///
    /// Idempotent; called once before a batch starts.
    pub async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Write one artifact and return the path it landed at
    ///
    /// Truncate-creates the file and writes the payload as UTF-8. Under
    /// [`CollisionPolicy::Overwrite`] a name collision means the last writer
    /// wins with no detection. [`CollisionPolicy::Disambiguate`] probes for a
    /// free `name (N).ext` instead; the existence check and the create are
    /// not atomic, so concurrent workers can still race on the same candidate.
    pub async fn write(&self, artifact: &Artifact) -> std::result::Result<PathBuf, WriteError> {
        let path = self.resolve_path(&artifact.file_name)?;

        tokio::fs::write(&path, artifact.payload.as_bytes())
            .await
            .map_err(|source| WriteError {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }

    fn resolve_path(&self, file_name: &str) -> std::result::Result<PathBuf, WriteError> {
        let path = self.dir.join(file_name);

        match self.collision {
            CollisionPolicy::Overwrite => Ok(path),
            CollisionPolicy::Disambiguate => {
                if !path.exists() {
                    return Ok(path);
                }

                // File names come from the extractor, so a stem is always
                // present; fall back to the raw name if not.
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
                let extension = path.extension().and_then(|e| e.to_str());

                for i in 1..=MAX_RENAME_ATTEMPTS {
                    let candidate = match extension {
                        Some(ext) => format!("{stem} ({i}).{ext}"),
                        None => format!("{stem} ({i})"),
                    };
                    let candidate_path = self.dir.join(candidate);
                    if !candidate_path.exists() {
                        return Ok(candidate_path);
                    }
                }

                Err(WriteError {
                    path,
                    source: std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        format!("no free file name after {MAX_RENAME_ATTEMPTS} attempts"),
                    ),
                })
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(file_name: &str, payload: &str) -> Artifact {
        Artifact {
            file_name: file_name.to_string(),
            payload: payload.to_string(),
        }
    }

    #[tokio::test]
    async fn write_persists_payload_as_utf8() {
        let temp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(temp.path(), CollisionPolicy::Overwrite);

        let path = sink
            .write(&artifact("Alpha.txt", "r1\nr2"))
            .await
            .expect("write must succeed");

        assert_eq!(path, temp.path().join("Alpha.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "r1\nr2");
    }

    #[tokio::test]
    async fn write_empty_payload_creates_empty_file() {
        let temp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(temp.path(), CollisionPolicy::Overwrite);

        let path = sink.write(&artifact("Gamma.txt", "")).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn overwrite_policy_truncates_existing_file() {
        let temp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(temp.path(), CollisionPolicy::Overwrite);

        sink.write(&artifact("Alpha.txt", "a much longer first payload"))
            .await
            .unwrap();
        let path = sink.write(&artifact("Alpha.txt", "short")).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "short",
            "second write must fully replace the first"
        );
    }

    #[tokio::test]
    async fn disambiguate_policy_keeps_both_files() {
        let temp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(temp.path(), CollisionPolicy::Disambiguate);

        let first = sink.write(&artifact("Alpha.txt", "first")).await.unwrap();
        let second = sink.write(&artifact("Alpha.txt", "second")).await.unwrap();

        assert_eq!(first, temp.path().join("Alpha.txt"));
        assert_eq!(second, temp.path().join("Alpha (1).txt"));
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "second");
    }

    #[tokio::test]
    async fn disambiguate_policy_skips_taken_suffixes() {
        let temp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(temp.path(), CollisionPolicy::Disambiguate);

        std::fs::write(temp.path().join("Alpha.txt"), "x").unwrap();
        std::fs::write(temp.path().join("Alpha (1).txt"), "y").unwrap();

        let path = sink.write(&artifact("Alpha.txt", "z")).await.unwrap();
        assert_eq!(path, temp.path().join("Alpha (2).txt"));
    }

    #[tokio::test]
    async fn write_into_missing_directory_fails_with_path() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("does-not-exist");
        let sink = FileSink::new(&missing, CollisionPolicy::Overwrite);

        let err = sink
            .write(&artifact("Alpha.txt", "payload"))
            .await
            .expect_err("write into a missing directory must fail");

        assert_eq!(err.path, missing.join("Alpha.txt"));
    }

    #[tokio::test]
    async fn prepare_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(temp.path().join("out"), CollisionPolicy::Overwrite);

        sink.prepare().await.expect("first prepare must succeed");
        sink.prepare().await.expect("second prepare must succeed");

        assert!(sink.dir().is_dir());
    }
}
