//! File planning and writing
//!
//! Planning decides the action for every rendered file without touching the file
//! system beyond existence checks. Writing then issues the planned writes in order,
//! checking for cancellation before each one.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs, io,
    path::{Component, Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, MutexGuard,
    },
};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    error::GenerationError,
    models::{ConflictPolicy, FileAction, GenerationResult},
    templates::RenderedFile,
};

/// File-system collaborator used by the planner
///
/// Paths are relative to the output root of the implementation.
pub trait FileSystem: Send + Sync {
    /// Whether a file exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Write `content` to `path`, replacing any existing file
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Create `path` and its parents
    fn ensure_dir(&self, path: &Path) -> io::Result<()>;
}

/// File system rooted at an output directory on disk
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    /// Create a file system rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        fs::write(self.resolve(path), content)
    }

    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(self.resolve(path))
    }
}

/// In-memory file system for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, String>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
    failing: BTreeSet<PathBuf>,
    writes: AtomicUsize,
}

impl MemoryFileSystem {
    /// Empty file system
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing file
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        lock(&self.files).insert(path.into(), content.into());
        self
    }

    /// Make every write to `path` fail with a permission error
    pub fn failing_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    /// Content of the file at `path`
    pub fn read(&self, path: impl AsRef<Path>) -> Option<String> {
        lock(&self.files).get(path.as_ref()).cloned()
    }

    /// Snapshot of every file
    pub fn files(&self) -> BTreeMap<PathBuf, String> {
        lock(&self.files).clone()
    }

    /// Number of successful writes issued
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        lock(&self.files).contains_key(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        if self.failing.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("write to {} denied", path.display()),
            ));
        }
        lock(&self.files).insert(path.to_path_buf(), content.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        lock(&self.dirs).insert(path.to_path_buf());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A rendered file with its decided action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Catalog id of the source template
    pub template_id: String,
    /// Target path
    pub path: PathBuf,
    /// Content to write
    pub content: String,
    /// Decided action
    pub action: FileAction,
    /// Why the file is skipped or failed
    pub reason: Option<String>,
}

impl PlannedFile {
    fn result(&self) -> GenerationResult {
        GenerationResult {
            path: self.path.clone(),
            action: self.action,
            reason: self.reason.clone(),
        }
    }

    fn needs_write(&self) -> bool {
        matches!(self.action, FileAction::Created | FileAction::Overwritten)
    }
}

/// Decides and performs file writes
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePlanner;

impl FilePlanner {
    /// Create a planner
    pub fn new() -> Self {
        Self
    }

    /// Decide the action for every rendered file
    ///
    /// Fails before any write if a target path is not a plain relative path or if two
    /// files share a target path.
    pub fn plan(
        &self,
        rendered: Vec<RenderedFile>,
        fs: &dyn FileSystem,
        policy: ConflictPolicy,
    ) -> Result<Vec<PlannedFile>, GenerationError> {
        let mut owners: BTreeMap<&Path, &str> = BTreeMap::new();
        for file in &rendered {
            if !is_contained(&file.path) {
                return Err(GenerationError::PathOutsideRoot {
                    path: file.path.clone(),
                });
            }
            if let Some(first) = owners.insert(file.path.as_path(), file.template_id.as_str()) {
                return Err(GenerationError::Conflict {
                    path: file.path.clone(),
                    message: format!(
                        "templates '{}' and '{}' both target this path",
                        first, file.template_id
                    ),
                });
            }
        }

        let planned = rendered
            .into_iter()
            .map(|file| {
                let (action, reason) = if !fs.exists(&file.path) {
                    (FileAction::Created, None)
                } else {
                    match policy {
                        ConflictPolicy::SkipExisting => {
                            (FileAction::SkippedExists, Some("file already exists".to_string()))
                        }
                        ConflictPolicy::Overwrite => (FileAction::Overwritten, None),
                        ConflictPolicy::FailOnConflict => {
                            let conflict = GenerationError::Conflict {
                                path: file.path.clone(),
                                message: "file already exists".to_string(),
                            };
                            (FileAction::Failed, Some(conflict.to_string()))
                        }
                    }
                };
                debug!(path = %file.path.display(), %action, "Planned file");

                PlannedFile {
                    template_id: file.template_id,
                    path: file.path,
                    content: file.content,
                    action,
                    reason,
                }
            })
            .collect();

        Ok(planned)
    }

    /// Issue the planned writes in order
    ///
    /// Once `cancel` fires, every file not yet written is reported as skipped with reason
    /// `"cancelled"`. In a dry run the planned actions are reported without writing.
    pub fn write(
        &self,
        planned: &[PlannedFile],
        fs: &dyn FileSystem,
        cancel: &CancellationToken,
        dry_run: bool,
    ) -> Vec<GenerationResult> {
        planned
            .iter()
            .map(|file| {
                if !file.needs_write() || dry_run {
                    return file.result();
                }
                if cancel.is_cancelled() {
                    return GenerationResult::with_reason(
                        &file.path,
                        FileAction::SkippedExists,
                        "cancelled",
                    );
                }

                match write_one(fs, &file.path, &file.content) {
                    Ok(()) => {
                        debug!(path = %file.path.display(), action = %file.action, "Wrote file");
                        file.result()
                    }
                    Err(e) => {
                        warn!(path = %file.path.display(), error = %e, "Failed to write file");
                        GenerationResult::with_reason(&file.path, FileAction::Failed, e.to_string())
                    }
                }
            })
            .collect()
    }
}

/// Relative, non-empty and made of normal components only
fn is_contained(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

fn write_one(fs: &dyn FileSystem, path: &Path, content: &str) -> Result<(), GenerationError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.ensure_dir(parent)?;
    }
    fs.write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(path: &str, template_id: &str) -> RenderedFile {
        RenderedFile {
            template_id: template_id.to_string(),
            path: PathBuf::from(path),
            content: format!("// {}\n", template_id),
        }
    }

    #[test]
    fn test_plan_rejects_paths_leaving_the_root() {
        let fs = MemoryFileSystem::new();
        for path in ["apps/../../escaped/a.ts", "/etc/a.ts", "./a.ts", ""] {
            let err = FilePlanner::new()
                .plan(vec![rendered(path, "a")], &fs, ConflictPolicy::Overwrite)
                .unwrap_err();
            assert!(
                matches!(err, GenerationError::PathOutsideRoot { .. }),
                "{:?} accepted",
                path
            );
        }
    }

    #[test]
    fn test_write_failure_reason_is_io_error() {
        let fs = MemoryFileSystem::new().failing_on("a.ts");
        let planned = FilePlanner::new()
            .plan(vec![rendered("a.ts", "a")], &fs, ConflictPolicy::SkipExisting)
            .unwrap();
        let results = FilePlanner::new().write(&planned, &fs, &CancellationToken::new(), false);

        assert_eq!(results[0].action, FileAction::Failed);
        assert_eq!(results[0].reason.as_deref(), Some("IO error: write to a.ts denied"));
    }

    #[test]
    fn test_plan_new_files_are_created() {
        let fs = MemoryFileSystem::new();
        let planned = FilePlanner::new()
            .plan(vec![rendered("a.ts", "a")], &fs, ConflictPolicy::SkipExisting)
            .unwrap();
        assert_eq!(planned[0].action, FileAction::Created);
    }

    #[test]
    fn test_plan_respects_policy_for_existing_files() {
        let fs = MemoryFileSystem::new().with_file("a.ts", "old");
        let planner = FilePlanner::new();

        let skip = planner
            .plan(vec![rendered("a.ts", "a")], &fs, ConflictPolicy::SkipExisting)
            .unwrap();
        assert_eq!(skip[0].action, FileAction::SkippedExists);

        let overwrite = planner
            .plan(vec![rendered("a.ts", "a")], &fs, ConflictPolicy::Overwrite)
            .unwrap();
        assert_eq!(overwrite[0].action, FileAction::Overwritten);

        let fail = planner
            .plan(vec![rendered("a.ts", "a")], &fs, ConflictPolicy::FailOnConflict)
            .unwrap();
        assert_eq!(fail[0].action, FileAction::Failed);
        assert!(fail[0].reason.as_deref().unwrap().contains("Conflict"));
    }

    #[test]
    fn test_duplicate_paths_conflict_before_any_write() {
        let fs = MemoryFileSystem::new();
        let err = FilePlanner::new()
            .plan(
                vec![rendered("a.ts", "first"), rendered("a.ts", "second")],
                &fs,
                ConflictPolicy::Overwrite,
            )
            .unwrap_err();
        assert!(matches!(err, GenerationError::Conflict { .. }));
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn test_write_skips_untouched_files() {
        let fs = MemoryFileSystem::new().with_file("a.ts", "old");
        let planner = FilePlanner::new();
        let planned = planner
            .plan(
                vec![rendered("a.ts", "a"), rendered("dir/b.ts", "b")],
                &fs,
                ConflictPolicy::SkipExisting,
            )
            .unwrap();

        let results = planner.write(&planned, &fs, &CancellationToken::new(), false);
        assert_eq!(results[0].action, FileAction::SkippedExists);
        assert_eq!(results[1].action, FileAction::Created);
        assert_eq!(fs.read("a.ts").as_deref(), Some("old"));
        assert_eq!(fs.read("dir/b.ts").as_deref(), Some("// b\n"));
        assert_eq!(fs.write_count(), 1);
    }

    #[test]
    fn test_write_failure_does_not_stop_other_files() {
        let fs = MemoryFileSystem::new().failing_on("a.ts");
        let planner = FilePlanner::new();
        let planned = planner
            .plan(
                vec![rendered("a.ts", "a"), rendered("b.ts", "b")],
                &fs,
                ConflictPolicy::SkipExisting,
            )
            .unwrap();

        let results = planner.write(&planned, &fs, &CancellationToken::new(), false);
        assert_eq!(results[0].action, FileAction::Failed);
        assert_eq!(results[1].action, FileAction::Created);
    }

    #[test]
    fn test_cancelled_files_are_reported_skipped() {
        let fs = MemoryFileSystem::new();
        let planner = FilePlanner::new();
        let planned = planner
            .plan(vec![rendered("a.ts", "a")], &fs, ConflictPolicy::SkipExisting)
            .unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let results = planner.write(&planned, &fs, &token, false);
        assert_eq!(results[0].action, FileAction::SkippedExists);
        assert_eq!(results[0].reason.as_deref(), Some("cancelled"));
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let fs = MemoryFileSystem::new();
        let planner = FilePlanner::new();
        let planned = planner
            .plan(vec![rendered("a.ts", "a")], &fs, ConflictPolicy::SkipExisting)
            .unwrap();

        let results = planner.write(&planned, &fs, &CancellationToken::new(), true);
        assert_eq!(results[0].action, FileAction::Created);
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn test_local_file_system_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFileSystem::new(dir.path());
        let path = Path::new("nested/file.ts");

        assert!(!fs.exists(path));
        write_one(&fs, path, "export {};\n").unwrap();
        assert!(fs.exists(path));
        assert_eq!(
            std::fs::read_to_string(dir.path().join(path)).unwrap(),
            "export {};\n"
        );
    }
}
