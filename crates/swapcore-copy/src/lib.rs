use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Component, Path, PathBuf};

use swapcore_config::FailurePolicy;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("{0} has no parent directory")]
    NoParentDirectory(PathBuf),
    #[error("\"{0}\" is not a plain file name")]
    InvalidFileName(String),
    #[error("failed to copy to {destination}: {source}")]
    Copy {
        destination: PathBuf,
        source: io::Error,
    },
    #[error("failed to preserve timestamps on {destination}: {source}")]
    Timestamps {
        destination: PathBuf,
        source: io::Error,
    },
    #[error("failed to copy permissions to {destination}: {source}")]
    Permissions {
        destination: PathBuf,
        source: io::Error,
    },
    #[error("failed to remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
}

pub trait FileCopier {
    /// Copies bytes and metadata, returning the number of bytes written.
    fn copy_file(&self, source: &Path, destination: &Path) -> Result<u64, CopyError>;
    fn remove_file(&self, path: &Path) -> Result<(), CopyError>;
    fn exists(&self, path: &Path) -> bool;
}

/// Copies through the local filesystem, keeping permission bits and access/modify times.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsCopier;

impl FileCopier for FsCopier {
    /// Permissions are applied last so a read-only source still gets its timestamps copied.
    fn copy_file(&self, source: &Path, destination: &Path) -> Result<u64, CopyError> {
        let copy = |source: io::Error| CopyError::Copy {
            destination: destination.to_path_buf(),
            source,
        };
        let mut reader = File::open(source).map_err(copy)?;
        let metadata = reader.metadata().map_err(copy)?;
        let mut writer = File::create(destination).map_err(copy)?;
        let bytes = io::copy(&mut reader, &mut writer).map_err(copy)?;

        let timestamps = |source: io::Error| CopyError::Timestamps {
            destination: destination.to_path_buf(),
            source,
        };
        let mut times = FileTimes::new().set_modified(metadata.modified().map_err(timestamps)?);
        if let Ok(accessed) = metadata.accessed() {
            times = times.set_accessed(accessed);
        }
        writer.set_times(times).map_err(timestamps)?;
        drop(writer);

        fs::set_permissions(destination, metadata.permissions()).map_err(|source| {
            CopyError::Permissions {
                destination: destination.to_path_buf(),
                source,
            }
        })?;

        Ok(bytes)
    }

    fn remove_file(&self, path: &Path) -> Result<(), CopyError> {
        fs::remove_file(path).map_err(|source| CopyError::Remove {
            path: path.to_path_buf(),
            source,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[derive(Debug)]
pub struct CopyFailure {
    pub index: usize,
    pub file_name: String,
    pub error: CopyError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub created: Vec<PathBuf>,
    pub failures: Vec<CopyFailure>,
    /// Files this batch wrote and then removed again, after a failure.
    pub rolled_back: Vec<PathBuf>,
    pub aborted: bool,
}

impl BatchReport {
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.aborted {
            format!(
                "Stopped after a failure; rolled back {} file(s).",
                self.rolled_back.len()
            )
        } else if self.failures.is_empty() {
            format!("Finished creating {} file(s)!", self.created.len())
        } else {
            format!(
                "Finished creating {} file(s)! {} failed.",
                self.created.len(),
                self.failures.len()
            )
        }
    }
}

/// Copies `source` once per entry of `file_names` into the source's directory, in order.
///
/// Only a missing parent directory is an `Err`; per-entry failures are recorded in the
/// report and handled according to `policy`.
pub fn run_batch<C: FileCopier>(
    copier: &C,
    source: &Path,
    file_names: &[String],
    policy: FailurePolicy,
) -> Result<BatchReport, CopyError> {
    let Some(directory) = source.parent() else {
        return Err(CopyError::NoParentDirectory(source.to_path_buf()));
    };

    let mut report = BatchReport::default();
    let mut fresh: Vec<PathBuf> = Vec::new();
    let mut overwritten: Vec<PathBuf> = Vec::new();

    for (index, file_name) in file_names.iter().enumerate() {
        if !is_plain_file_name(file_name) {
            let error = CopyError::InvalidFileName(file_name.clone());
            if record_failure(&mut report, index, file_name, error, policy) {
                roll_back(copier, &fresh, &overwritten, &mut report);
                break;
            }
            continue;
        }

        let destination = directory.join(file_name);
        let existed = copier.exists(&destination);
        match copier.copy_file(source, &destination) {
            Ok(bytes) => {
                debug!(index, destination = %destination.display(), bytes, "copied");
                if existed {
                    if !fresh.contains(&destination) && !overwritten.contains(&destination) {
                        overwritten.push(destination.clone());
                    }
                } else {
                    fresh.push(destination.clone());
                }
                report.created.push(destination);
            }
            Err(error) => {
                // A failed copy can still leave a new file behind.
                let left_behind = !existed && copier.exists(&destination);
                if record_failure(&mut report, index, file_name, error, policy) {
                    if left_behind {
                        fresh.push(destination);
                    }
                    roll_back(copier, &fresh, &overwritten, &mut report);
                    break;
                }
                if left_behind {
                    match copier.remove_file(&destination) {
                        Ok(()) => report.rolled_back.push(destination),
                        Err(error) => warn!(%error, "failed copy left a file behind"),
                    }
                }
            }
        }
    }

    info!(
        created = report.created.len(),
        failed = report.failures.len(),
        rolled_back = report.rolled_back.len(),
        "batch finished"
    );
    Ok(report)
}

/// Records a failed entry and returns whether the batch has to stop.
fn record_failure(
    report: &mut BatchReport,
    index: usize,
    file_name: &str,
    error: CopyError,
    policy: FailurePolicy,
) -> bool {
    warn!(index, file_name = %file_name, %error, "copy failed");
    report.failures.push(CopyFailure {
        index,
        file_name: file_name.to_string(),
        error,
    });

    if policy == FailurePolicy::AbortAndRollback {
        report.aborted = true;
    }
    report.aborted
}

fn roll_back<C: FileCopier>(
    copier: &C,
    fresh: &[PathBuf],
    overwritten: &[PathBuf],
    report: &mut BatchReport,
) {
    for path in fresh.iter().rev() {
        match copier.remove_file(path) {
            Ok(()) => report.rolled_back.push(path.clone()),
            Err(error) => warn!(%error, "rollback left a file behind"),
        }
    }
    for path in overwritten {
        warn!(path = %path.display(), "overwritten file cannot be restored");
    }
    report.created.retain(|path| !report.rolled_back.contains(path));
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    )
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn copies_bytes_into_source_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();

        let names = vec!["photo a.jpg".to_string(), "photo b.jpg".to_string()];
        let report =
            run_batch(&FsCopier, &source, &names, FailurePolicy::ContinueAndReport).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.created_count(), 2);
        assert_eq!(report.summary(), "Finished creating 2 file(s)!");
        for name in &names {
            assert_eq!(fs::read(dir.path().join(name)).unwrap(), b"jpeg bytes");
        }
    }

    #[test]
    fn keeps_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        fs::write(&source, b"hello").unwrap();
        let past = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_times(FileTimes::new().set_modified(past))
            .unwrap();

        let destination = dir.path().join("notes copy.txt");
        FsCopier.copy_file(&source, &destination).unwrap();

        let copied = fs::metadata(&destination).unwrap().modified().unwrap();
        assert_eq!(copied, past);
    }

    #[cfg(unix)]
    #[test]
    fn keeps_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("run.sh");
        fs::write(&source, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o750)).unwrap();

        let destination = dir.path().join("run a.sh");
        FsCopier.copy_file(&source, &destination).unwrap();

        let mode = fs::metadata(&destination).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn read_only_source_copies_cleanly() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();
        let past = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(2_000_000);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_times(FileTimes::new().set_modified(past))
            .unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o444)).unwrap();

        let names = vec!["photo a.jpg".to_string(), "photo b.jpg".to_string()];
        let report =
            run_batch(&FsCopier, &source, &names, FailurePolicy::AbortAndRollback).unwrap();

        assert!(report.is_clean(), "{:?}", report.failures);
        assert_eq!(report.summary(), "Finished creating 2 file(s)!");
        for name in &names {
            let copied = dir.path().join(name);
            let metadata = fs::metadata(&copied).unwrap();
            assert_eq!(metadata.permissions().mode() & 0o777, 0o444);
            assert_eq!(metadata.modified().unwrap(), past);
            assert_eq!(fs::read(&copied).unwrap(), b"jpeg bytes");
        }
    }

    #[test]
    fn rejects_names_that_leave_the_directory() {
        assert!(is_plain_file_name("photo a.jpg"));
        assert!(is_plain_file_name("photo .jpg"));
        assert!(!is_plain_file_name("photo a/b.jpg"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("."));
        assert!(!is_plain_file_name(""));
    }

    /// Fails any destination whose file name is listed in `failing`. Names in
    /// `fail_after_write` are written first and then reported as failed.
    #[derive(Default)]
    struct FakeCopier {
        failing: HashSet<String>,
        fail_after_write: HashSet<String>,
        existing: HashSet<PathBuf>,
        written: RefCell<Vec<PathBuf>>,
        removed: RefCell<Vec<PathBuf>>,
    }

    impl FileCopier for FakeCopier {
        fn copy_file(&self, _source: &Path, destination: &Path) -> Result<u64, CopyError> {
            let name = destination.file_name().unwrap().to_str().unwrap();
            if self.failing.contains(name) {
                return Err(CopyError::Copy {
                    destination: destination.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            self.written.borrow_mut().push(destination.to_path_buf());
            if self.fail_after_write.contains(name) {
                return Err(CopyError::Timestamps {
                    destination: destination.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            Ok(4)
        }

        fn remove_file(&self, path: &Path) -> Result<(), CopyError> {
            self.removed.borrow_mut().push(path.to_path_buf());
            self.written.borrow_mut().retain(|written| written != path);
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.existing.contains(path) || self.written.borrow().iter().any(|w| w == path)
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn continue_policy_attempts_every_entry() {
        let copier = FakeCopier {
            failing: HashSet::from(["f b.txt".to_string()]),
            ..FakeCopier::default()
        };
        let report = run_batch(
            &copier,
            Path::new("/data/f.txt"),
            &names(&["f a.txt", "f b.txt", "f c.txt", "f d/e.txt"]),
            FailurePolicy::ContinueAndReport,
        )
        .unwrap();

        assert!(!report.aborted);
        assert_eq!(report.created_count(), 2);
        let failed: Vec<usize> = report.failures.iter().map(|f| f.index).collect();
        assert_eq!(failed, vec![1, 3]);
        assert!(matches!(
            report.failures[1].error,
            CopyError::InvalidFileName(_)
        ));
        assert_eq!(report.summary(), "Finished creating 2 file(s)! 2 failed.");
    }

    #[test]
    fn abort_policy_removes_only_files_the_batch_created() {
        let existing = PathBuf::from("/data/f b.txt");
        let copier = FakeCopier {
            failing: HashSet::from(["f c.txt".to_string()]),
            existing: HashSet::from([existing.clone()]),
            ..FakeCopier::default()
        };
        let report = run_batch(
            &copier,
            Path::new("/data/f.txt"),
            &names(&["f a.txt", "f b.txt", "f c.txt", "f d.txt"]),
            FailurePolicy::AbortAndRollback,
        )
        .unwrap();

        assert!(report.aborted);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(*copier.removed.borrow(), vec![PathBuf::from("/data/f a.txt")]);
        assert_eq!(report.created, vec![existing]);
        assert_eq!(report.summary(), "Stopped after a failure; rolled back 1 file(s).");
    }

    #[test]
    fn abort_policy_removes_file_written_by_the_failing_entry() {
        let copier = FakeCopier {
            fail_after_write: HashSet::from(["f b.txt".to_string()]),
            ..FakeCopier::default()
        };
        let report = run_batch(
            &copier,
            Path::new("/data/f.txt"),
            &names(&["f a.txt", "f b.txt", "f c.txt"]),
            FailurePolicy::AbortAndRollback,
        )
        .unwrap();

        assert!(report.aborted);
        assert!(copier.written.borrow().is_empty());
        assert_eq!(
            *copier.removed.borrow(),
            vec![PathBuf::from("/data/f b.txt"), PathBuf::from("/data/f a.txt")]
        );
        assert!(report.created.is_empty());
        assert_eq!(report.summary(), "Stopped after a failure; rolled back 2 file(s).");
    }

    #[test]
    fn continue_policy_removes_file_left_by_a_failed_entry() {
        let copier = FakeCopier {
            fail_after_write: HashSet::from(["f b.txt".to_string()]),
            ..FakeCopier::default()
        };
        let report = run_batch(
            &copier,
            Path::new("/data/f.txt"),
            &names(&["f a.txt", "f b.txt", "f c.txt"]),
            FailurePolicy::ContinueAndReport,
        )
        .unwrap();

        assert!(!report.aborted);
        assert_eq!(report.rolled_back, vec![PathBuf::from("/data/f b.txt")]);
        assert_eq!(
            *copier.written.borrow(),
            vec![PathBuf::from("/data/f a.txt"), PathBuf::from("/data/f c.txt")]
        );
        assert_eq!(report.summary(), "Finished creating 2 file(s)! 1 failed.");
    }

    #[test]
    fn duplicate_names_count_each_copy() {
        let copier = FakeCopier::default();
        let report = run_batch(
            &copier,
            Path::new("/data/photo.jpg"),
            &names(&["photo b.jpg", "photo b.jpg"]),
            FailurePolicy::AbortAndRollback,
        )
        .unwrap();
        assert_eq!(report.created_count(), 2);
        assert_eq!(report.summary(), "Finished creating 2 file(s)!");
    }

    #[test]
    fn source_without_parent_is_an_error() {
        let err = run_batch(
            &FakeCopier::default(),
            Path::new("/"),
            &names(&["x"]),
            FailurePolicy::ContinueAndReport,
        )
        .unwrap_err();
        assert!(matches!(err, CopyError::NoParentDirectory(_)));
    }
}
