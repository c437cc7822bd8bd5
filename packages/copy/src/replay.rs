//! Catalogue replay.
//!
//! Records are processed strictly in catalogue order. A file whose inode was
//! already materialized earlier in the same order is hard linked to that
//! first copy instead of being copied again, so the catalogue must be
//! replayed in the order it was built.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, Metadata};
use std::io::BufRead;
use std::os::unix::fs::MetadataExt;
use std::path::{Component, Path, PathBuf};

use rawcopy_catalogue::{CatalogueEntry, CatalogueReader, EntryKind, NodeKind};
use rawcopy_registry::{Checkpoint, InodeRegistry};

use crate::copy::{copy_directory, copy_file, copy_symlink};
use crate::deferred::DeferredDirectories;
use crate::error::{CopyError, ReplayError};
use crate::layout;
use crate::link::{ensure_inode_path, try_hard_link};
use crate::options::{KindMismatchPolicy, ReplayOptions};
use crate::progress::ReplayProgress;
use crate::range::ReplayRange;

/// Counters describing what a replay did (or would do, in test mode).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// In-range entries processed, roots excluded.
    pub entries_processed: u64,
    /// Directories created.
    pub directories_created: u64,
    /// Regular files copied.
    pub files_copied: u64,
    /// Hard links created to earlier copies.
    pub hard_links_created: u64,
    /// Symlinks recreated.
    pub symlinks_created: u64,
    /// Entries whose destination already existed.
    pub already_present: u64,
    /// Devices, FIFOs and sockets skipped.
    pub special_skipped: u64,
    /// Entries whose source disappeared since the catalogue was built.
    pub sources_missing: u64,
    /// Entries that failed to copy.
    pub errors: u64,
    /// Index of the last processed entry.
    pub last_index: Option<u64>,
    /// Checkpoint this run resumed from.
    pub resumed_from: Option<u64>,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "entries processed: {}", self.entries_processed)?;
        writeln!(f, "directories created: {}", self.directories_created)?;
        writeln!(f, "files copied: {}", self.files_copied)?;
        writeln!(f, "hard links created: {}", self.hard_links_created)?;
        writeln!(f, "symlinks created: {}", self.symlinks_created)?;
        writeln!(f, "already present: {}", self.already_present)?;
        writeln!(f, "special files skipped: {}", self.special_skipped)?;
        writeln!(f, "sources missing: {}", self.sources_missing)?;
        write!(f, "errors: {}", self.errors)
    }
}

/// What a single materialization produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Materialized {
    Directory,
    File,
    HardLink,
    Symlink,
}

/// How the catalogue loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    EndOfCatalogue,
    EndOfRange,
}

#[derive(Debug)]
struct RootState {
    index: u64,
    path: PathBuf,
    suffix: PathBuf,
    materialized: bool,
}

/// State of one replay run.
#[derive(Debug)]
struct ReplaySession<'a> {
    destination: &'a Path,
    options: &'a ReplayOptions,
    range: ReplayRange,
    checkpoint: Checkpoint,
    write_checkpoints: bool,
    base: Option<PathBuf>,
    root: Option<RootState>,
    registry: Option<InodeRegistry>,
    directories: DeferredDirectories,
    /// Directories a test run reported as created, by suffix.
    reported: HashSet<PathBuf>,
    summary: ReplaySummary,
}

/// Replay `catalogue` onto `destination`.
///
/// Without an explicit range, a valid checkpoint left by an interrupted run
/// makes the replay resume from it. `on_progress` is called after every
/// processed entry.
///
/// # Arguments
///
/// * `catalogue` - Catalogue file to replay
/// * `destination` - Destination root, created if missing
/// * `options` - Replay options
/// * `on_progress` - Callback for progress updates
///
/// # Errors
///
/// * If the catalogue cannot be read
/// * If the catalogue is structurally invalid (missing base, root outside base, ...)
/// * If the inode registry or checkpoint fails
/// * If a kind mismatch is found under [`KindMismatchPolicy::Strict`]
pub fn replay<F>(
    catalogue: &Path,
    destination: &Path,
    options: &ReplayOptions,
    mut on_progress: F,
) -> Result<ReplaySummary, ReplayError>
where
    F: FnMut(&ReplayProgress),
{
    log::info!("Opening catalogue: {}", catalogue.display());
    let reader = CatalogueReader::open(catalogue)?;

    if !options.test_mode && !destination.exists() {
        log::info!("Creating output directory: {}", destination.display());
        fs::create_dir_all(destination).map_err(|e| ReplayError::CreateOutputError {
            path: destination.to_path_buf(),
            source: e,
        })?;
    }

    let mut session = ReplaySession::new(destination, options);
    session.resolve_range(catalogue)?;

    let outcome = session.run(reader, &mut on_progress);
    session.directories.finish(options);
    let closed = session.close();
    let termination = outcome?;
    closed?;

    if termination == Termination::EndOfCatalogue && session.write_checkpoints {
        session.checkpoint.clear()?;
    }

    log::debug!("Replay finished: {:?}", session.summary);
    Ok(session.summary)
}

impl<'a> ReplaySession<'a> {
    fn new(destination: &'a Path, options: &'a ReplayOptions) -> Self {
        Self {
            destination,
            options,
            range: options.range.unwrap_or_default(),
            checkpoint: Checkpoint::new(layout::checkpoint_path(destination)),
            write_checkpoints: options.range.is_none() && !options.test_mode,
            base: None,
            root: None,
            registry: None,
            directories: DeferredDirectories::default(),
            reported: HashSet::new(),
            summary: ReplaySummary::default(),
        }
    }

    fn resolve_range(&mut self, catalogue: &Path) -> Result<(), ReplayError> {
        if let Some(range) = self.options.range {
            log::info!("Using catalogue item range: {range}");
            return Ok(());
        }

        if let Some(index) = self.checkpoint.load(catalogue)? {
            log::info!("Resuming from checkpoint {index}");
            self.range = ReplayRange::from_start(index);
            self.summary.resumed_from = Some(index);
        }
        Ok(())
    }

    fn run<R, F>(
        &mut self,
        reader: CatalogueReader<R>,
        on_progress: &mut F,
    ) -> Result<Termination, ReplayError>
    where
        R: BufRead,
        F: FnMut(&ReplayProgress),
    {
        for entry in reader {
            let entry = entry?;
            match entry.kind {
                EntryKind::Base => self.open_base(&entry.path)?,
                EntryKind::Root => self.enter_root(entry.index, entry.path)?,
                EntryKind::Dir | EntryKind::File | EntryKind::Symlink => {
                    let index = entry.index;
                    if self.range.is_before(index) {
                        continue;
                    }
                    if self.range.is_past(index) {
                        log::info!("Reached end of range {} at {index}", self.range);
                        return Ok(Termination::EndOfRange);
                    }

                    self.replay_entry(&entry)?;
                    self.summary.entries_processed += 1;
                    self.summary.last_index = Some(index);
                    on_progress(&ReplayProgress::new(
                        index,
                        self.summary.entries_processed,
                    ));

                    if self.options.is_checkpoint(index) {
                        self.sync(index)?;
                    }
                }
            }
        }
        Ok(Termination::EndOfCatalogue)
    }

    fn open_base(&mut self, path: &Path) -> Result<(), ReplayError> {
        if let Some(first) = &self.base {
            return Err(ReplayError::DuplicateBase {
                first: first.clone(),
                second: path.to_path_buf(),
            });
        }
        if !fs::metadata(path).is_ok_and(|m| m.is_dir()) {
            return Err(ReplayError::MissingBase(path.to_path_buf()));
        }

        log::info!("Using base: {}", path.display());
        self.registry = Some(self.open_registry()?);
        self.base = Some(path.to_path_buf());
        Ok(())
    }

    fn open_registry(&self) -> Result<InodeRegistry, ReplayError> {
        let path = layout::registry_path(self.destination);
        if !self.options.test_mode {
            return Ok(InodeRegistry::open(&path)?);
        }

        if path.exists() {
            Ok(InodeRegistry::open(&path)?.read_only())
        } else {
            log::info!("Test run without copy database, using an empty in-memory one");
            Ok(InodeRegistry::in_memory().read_only())
        }
    }

    fn enter_root(&mut self, index: u64, path: PathBuf) -> Result<(), ReplayError> {
        let base = self
            .base
            .as_ref()
            .ok_or(ReplayError::EntryBeforeBase { index })?;
        let suffix = path
            .strip_prefix(base)
            .map_err(|_| ReplayError::RootOutsideBase {
                base: base.clone(),
                root: path.clone(),
            })?
            .to_path_buf();

        log::debug!("Entering root {index}:{}", path.display());
        self.directories.enter(&suffix, self.options);
        self.root = Some(RootState {
            index,
            path,
            suffix,
            materialized: false,
        });

        if self.range.contains(index) {
            self.materialize_root()?;
        }
        Ok(())
    }

    /// Create the current root's destination once, before anything under it.
    fn materialize_root(&mut self) -> Result<(), ReplayError> {
        let Some(root) = self.root.as_mut() else {
            return Ok(());
        };
        if root.materialized {
            return Ok(());
        }
        root.materialized = true;

        // The destination root itself is handled by `replay`.
        if root.suffix.as_os_str().is_empty() {
            return Ok(());
        }

        let index = root.index;
        let source = root.path.clone();
        let suffix = root.suffix.clone();
        let target = self.destination.join(&suffix);

        if self.is_present(&target, &suffix) {
            return Ok(());
        }

        log::info!("Creating root: {index}:{}", source.display());
        let metadata = match fs::symlink_metadata(&source) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::error!("Root does not exist: {index}:{}: {e}", source.display());
                self.summary.sources_missing += 1;
                return Ok(());
            }
        };

        if !self.options.test_mode {
            if let Some(parent) = target.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    log::error!(
                        "{}",
                        CopyError::CreateDirError {
                            path: parent.to_path_buf(),
                            io_error: e,
                        }
                    );
                    self.summary.errors += 1;
                    return Ok(());
                }
            }
        }

        self.materialize(index, &source, &metadata, &target, &suffix)
    }

    fn replay_entry(&mut self, entry: &CatalogueEntry) -> Result<(), ReplayError> {
        let index = entry.index;
        if self.base.is_none() {
            return Err(ReplayError::EntryBeforeBase { index });
        }
        if !is_single_component(&entry.path) {
            return Err(ReplayError::InvalidEntryPath {
                index,
                path: entry.path.clone(),
            });
        }
        self.materialize_root()?;

        let root = self
            .root
            .as_ref()
            .ok_or(ReplayError::EntryBeforeRoot { index })?;
        let source = root.path.join(&entry.path);
        let suffix = root.suffix.join(&entry.path);
        let target = self.destination.join(&suffix);

        let metadata = match fs::symlink_metadata(&source) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::error!("Source path not available: {index}:{}: {e}", source.display());
                self.summary.sources_missing += 1;
                return Ok(());
            }
        };

        let live = NodeKind::of(metadata.file_type());
        if let NodeKind::Special(what) = live {
            log::warn!("Skipping {what}: {index}:{}", source.display());
            self.summary.special_skipped += 1;
            return Ok(());
        }

        if self.is_present(&target, &suffix) {
            log::info!("Skipping already copied {live}: {index}:{}", target.display());
            self.summary.already_present += 1;
            // An interrupted run may have left it without its attributes.
            if live == NodeKind::Directory && !self.options.test_mode {
                self.directories.defer(&suffix, &target, &metadata);
            }
            let registry = self
                .registry
                .as_mut()
                .ok_or(ReplayError::EntryBeforeBase { index })?;
            ensure_inode_path(registry, &metadata, &suffix)?;
            return Ok(());
        }

        if !live.matches(entry.kind) {
            match self.options.kind_mismatch {
                KindMismatchPolicy::Warn => log::warn!(
                    "Catalogue lists {index}:{} as a {} but it is a {live} now, copying it as found",
                    source.display(),
                    entry.kind
                ),
                KindMismatchPolicy::Strict => {
                    return Err(ReplayError::KindMismatch {
                        index,
                        path: source,
                        declared: entry.kind,
                        actual: live,
                    });
                }
            }
        }

        log::info!("Copy: copying path {index}:{}", entry.path.display());
        self.materialize(index, &source, &metadata, &target, &suffix)
    }

    /// Create `target` according to the source's on-disk type.
    fn materialize(
        &mut self,
        index: u64,
        source: &Path,
        metadata: &Metadata,
        target: &Path,
        suffix: &Path,
    ) -> Result<(), ReplayError> {
        let options = self.options;
        let result = match NodeKind::of(metadata.file_type()) {
            NodeKind::Special(what) => {
                log::warn!("Skipping {what}: {index}:{}", source.display());
                self.summary.special_skipped += 1;
                return Ok(());
            }
            NodeKind::Directory => {
                copy_directory(target, options).map(|()| Materialized::Directory)
            }
            NodeKind::Symlink => {
                copy_symlink(source, metadata, target, options).map(|()| Materialized::Symlink)
            }
            NodeKind::File => {
                let registry = self
                    .registry
                    .as_mut()
                    .ok_or(ReplayError::EntryBeforeBase { index })?;
                materialize_file(
                    registry,
                    self.destination,
                    source,
                    metadata,
                    target,
                    suffix,
                    options,
                )
            }
        };

        match result {
            Ok(Materialized::Directory) => {
                self.summary.directories_created += 1;
                if options.test_mode {
                    self.reported.insert(suffix.to_path_buf());
                } else {
                    self.directories.defer(suffix, target, metadata);
                }
            }
            Ok(Materialized::File) => self.summary.files_copied += 1,
            Ok(Materialized::HardLink) => self.summary.hard_links_created += 1,
            Ok(Materialized::Symlink) => self.summary.symlinks_created += 1,
            Err(CopyError::Registry(e)) => return Err(e.into()),
            Err(e) => {
                log::error!("{index}: {e}");
                self.summary.errors += 1;
            }
        }
        Ok(())
    }

    /// Whether `target` exists, or a test run already reported creating it.
    fn is_present(&self, target: &Path, suffix: &Path) -> bool {
        fs::symlink_metadata(target).is_ok() || self.reported.contains(suffix)
    }

    fn sync(&mut self, index: u64) -> Result<(), ReplayError> {
        log::info!("{index} items processed, syncing copy database");
        if let Some(registry) = self.registry.as_mut() {
            registry.flush()?;
        }
        if self.write_checkpoints {
            self.checkpoint.store(index)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), ReplayError> {
        if let Some(registry) = self.registry.take() {
            registry.close()?;
        }
        Ok(())
    }
}

/// Link to an earlier copy of the same inode, or copy and register.
fn materialize_file(
    registry: &mut InodeRegistry,
    destination: &Path,
    source: &Path,
    metadata: &Metadata,
    target: &Path,
    suffix: &Path,
    options: &ReplayOptions,
) -> Result<Materialized, CopyError> {
    if try_hard_link(registry, destination, metadata, target, options)? {
        return Ok(Materialized::HardLink);
    }

    copy_file(source, metadata, target, options)?;
    registry.set_path(metadata.ino(), suffix)?;
    Ok(Materialized::File)
}

fn is_single_component(path: &Path) -> bool {
    let mut components = path.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawcopy_catalogue::CatalogueBuilder;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        source: PathBuf,
        output: PathBuf,
        catalogue: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let source = dir.path().join("src");
            let output = dir.path().join("out");
            let catalogue = dir.path().join("catalogue.lst");
            fs::create_dir(&source).unwrap();
            Self {
                _dir: dir,
                source,
                output,
                catalogue,
            }
        }

        fn build(&self) -> u64 {
            CatalogueBuilder::new(&self.source, vec![self.source.clone()])
                .save(&self.catalogue)
                .unwrap()
        }

        fn write_catalogue(&self, content: &str) {
            fs::write(&self.catalogue, content).unwrap();
        }

        fn replay(&self, options: &ReplayOptions) -> Result<ReplaySummary, ReplayError> {
            replay(&self.catalogue, &self.output, options, |_| {})
        }

        fn registry(&self) -> InodeRegistry {
            InodeRegistry::open(&layout::registry_path(&self.output)).unwrap()
        }
    }

    fn ino(path: &Path) -> u64 {
        fs::symlink_metadata(path).unwrap().ino()
    }

    fn make_fifo(path: &Path) {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes()).unwrap();
        assert_eq!(unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) }, 0);
    }

    /// Relative paths of everything under `root`, metadata dir excluded.
    fn tree(root: &Path) -> Vec<String> {
        fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
            let mut names: Vec<_> = fs::read_dir(dir)
                .unwrap()
                .map(|e| e.unwrap().path())
                .collect();
            names.sort();
            for path in names {
                let relative = path.strip_prefix(root).unwrap().to_string_lossy().to_string();
                if relative == layout::METADATA_DIR {
                    continue;
                }
                out.push(relative);
                if fs::symlink_metadata(&path).unwrap().is_dir() {
                    walk(root, &path, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(root, root, &mut out);
        out
    }

    #[test]
    fn test_hard_links_are_reconstructed() {
        let fixture = Fixture::new();
        fs::write(fixture.source.join("a"), "shared").unwrap();
        fs::hard_link(fixture.source.join("a"), fixture.source.join("b")).unwrap();
        fixture.build();

        let summary = fixture.replay(&ReplayOptions::default()).unwrap();

        assert_eq!(summary.files_copied, 1);
        assert_eq!(summary.hard_links_created, 1);
        assert_eq!(
            ino(&fixture.output.join("a")),
            ino(&fixture.output.join("b"))
        );
        assert_ne!(ino(&fixture.output.join("a")), ino(&fixture.source.join("a")));
        assert_eq!(fs::read_to_string(fixture.output.join("b")).unwrap(), "shared");

        let registry = fixture.registry();
        assert_eq!(
            registry.get_path(ino(&fixture.source.join("a"))).unwrap(),
            Some(PathBuf::from("a"))
        );
    }

    #[test]
    fn test_hard_links_across_roots() {
        let fixture = Fixture::new();
        let snap1 = fixture.source.join("snap1");
        let snap2 = fixture.source.join("snap2");
        fs::create_dir_all(snap1.join("etc")).unwrap();
        fs::create_dir_all(snap2.join("etc")).unwrap();
        fs::write(snap1.join("etc/hosts"), "127.0.0.1").unwrap();
        fs::hard_link(snap1.join("etc/hosts"), snap2.join("etc/hosts")).unwrap();

        CatalogueBuilder::new(&fixture.source, vec![snap1, snap2])
            .save(&fixture.catalogue)
            .unwrap();
        let summary = fixture.replay(&ReplayOptions::default()).unwrap();

        assert_eq!(summary.hard_links_created, 1);
        assert_eq!(
            ino(&fixture.output.join("snap1/etc/hosts")),
            ino(&fixture.output.join("snap2/etc/hosts"))
        );
    }

    #[test]
    fn test_fifo_is_skipped() {
        let fixture = Fixture::new();
        fs::write(fixture.source.join("file"), "x").unwrap();
        make_fifo(&fixture.source.join("pipe"));
        fixture.write_catalogue(&format!(
            "0:B:{src}\n0:R:{src}\n0:F:file\n1:F:pipe\n",
            src = fixture.source.display()
        ));

        let summary = fixture.replay(&ReplayOptions::default()).unwrap();

        assert_eq!(summary.special_skipped, 1);
        assert!(fixture.output.join("file").exists());
        assert!(fs::symlink_metadata(fixture.output.join("pipe")).is_err());
        assert!(
            fixture
                .registry()
                .get_path(ino(&fixture.source.join("pipe")))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_tree_with_symlinks_and_modes() {
        let fixture = Fixture::new();
        fs::create_dir_all(fixture.source.join("dir/nested")).unwrap();
        fs::write(fixture.source.join("dir/nested/file"), "deep").unwrap();
        fs::set_permissions(
            fixture.source.join("dir/nested/file"),
            fs::Permissions::from_mode(0o604),
        )
        .unwrap();
        std::os::unix::fs::symlink("dir/nested/file", fixture.source.join("link")).unwrap();
        std::os::unix::fs::symlink("nowhere", fixture.source.join("dangling")).unwrap();
        fixture.build();

        let summary = fixture.replay(&ReplayOptions::default()).unwrap();

        assert_eq!(summary.errors, 0);
        assert_eq!(summary.symlinks_created, 2);
        assert_eq!(
            tree(&fixture.output),
            vec!["dangling", "dir", "dir/nested", "dir/nested/file", "link"]
        );
        assert_eq!(
            fs::read_link(fixture.output.join("dangling")).unwrap(),
            Path::new("nowhere")
        );
        assert_eq!(
            fs::metadata(fixture.output.join("dir/nested/file"))
                .unwrap()
                .permissions()
                .mode()
                & 0o777,
            0o604
        );
    }

    #[test]
    fn test_replay_is_idempotent() {
        let fixture = Fixture::new();
        fs::create_dir(fixture.source.join("d")).unwrap();
        fs::write(fixture.source.join("d/x"), "x").unwrap();
        fs::write(fixture.source.join("y"), "y").unwrap();
        fs::hard_link(fixture.source.join("y"), fixture.source.join("z")).unwrap();
        fixture.build();

        fixture.replay(&ReplayOptions::default()).unwrap();
        let first = tree(&fixture.output);
        let inode = ino(&fixture.output.join("y"));

        let summary = fixture.replay(&ReplayOptions::default()).unwrap();

        assert_eq!(tree(&fixture.output), first);
        assert_eq!(ino(&fixture.output.join("y")), inode);
        assert_eq!(ino(&fixture.output.join("z")), inode);
        assert_eq!(summary.already_present, summary.entries_processed);
        assert_eq!(summary.files_copied + summary.hard_links_created, 0);
    }

    #[test]
    fn test_existing_destination_is_registered() {
        let fixture = Fixture::new();
        fs::write(fixture.source.join("a"), "shared").unwrap();
        fs::hard_link(fixture.source.join("a"), fixture.source.join("b")).unwrap();
        fixture.build();

        fs::create_dir_all(&fixture.output).unwrap();
        fs::write(fixture.output.join("a"), "shared").unwrap();

        let summary = fixture.replay(&ReplayOptions::default()).unwrap();

        assert_eq!(summary.already_present, 1);
        assert_eq!(summary.hard_links_created, 1);
        assert_eq!(
            ino(&fixture.output.join("a")),
            ino(&fixture.output.join("b"))
        );
    }

    #[test]
    fn test_range_only_touches_selected_entries() {
        let fixture = Fixture::new();
        for name in ["a", "b", "c", "d"] {
            fs::write(fixture.source.join(name), name).unwrap();
        }
        fixture.build();

        let options = ReplayOptions {
            range: Some("1-2".parse().unwrap()),
            ..ReplayOptions::default()
        };
        let summary = fixture.replay(&options).unwrap();

        assert_eq!(summary.entries_processed, 2);
        assert_eq!(summary.last_index, Some(2));
        assert_eq!(tree(&fixture.output), vec!["b", "c"]);
        assert!(!layout::checkpoint_path(&fixture.output).exists());
    }

    #[test]
    fn test_root_outside_range_is_created_lazily() {
        let fixture = Fixture::new();
        fs::create_dir(fixture.source.join("sub")).unwrap();
        fs::write(fixture.source.join("sub/one"), "1").unwrap();
        fs::write(fixture.source.join("sub/two"), "2").unwrap();
        fixture.build();

        // 0 is the `sub` directory record; its root carries index 1.
        let options = ReplayOptions {
            range: Some("2-".parse().unwrap()),
            ..ReplayOptions::default()
        };
        let summary = fixture.replay(&options).unwrap();

        assert_eq!(summary.entries_processed, 1);
        assert_eq!(tree(&fixture.output), vec!["sub", "sub/two"]);
    }

    #[test]
    fn test_test_mode_changes_nothing() {
        let fixture = Fixture::new();
        fs::create_dir(fixture.source.join("d")).unwrap();
        fs::write(fixture.source.join("d/f"), "f").unwrap();
        fs::hard_link(fixture.source.join("d/f"), fixture.source.join("g")).unwrap();
        fixture.build();

        let options = ReplayOptions {
            test_mode: true,
            ..ReplayOptions::default()
        };
        let summary = fixture.replay(&options).unwrap();

        assert!(!fixture.output.exists());
        assert_eq!(summary.entries_processed, 3);
        assert_eq!(summary.directories_created, 1);
        // The registry is not written, so the second name is reported as a copy.
        assert_eq!(summary.files_copied, 2);
        assert_eq!(summary.hard_links_created, 0);
    }

    #[test]
    fn test_test_mode_reports_like_real_run() {
        let fixture = Fixture::new();
        fs::create_dir_all(fixture.source.join("d/e")).unwrap();
        fs::write(fixture.source.join("d/f"), "f").unwrap();
        fs::write(fixture.source.join("d/e/g"), "g").unwrap();
        fixture.build();

        let options = ReplayOptions {
            test_mode: true,
            ..ReplayOptions::default()
        };
        let dry = fixture.replay(&options).unwrap();
        let real = fixture.replay(&ReplayOptions::default()).unwrap();

        assert_eq!(dry, real);
        assert_eq!(real.directories_created, 2);
    }

    #[test]
    fn test_directory_attributes_survive_contents() {
        use filetime::FileTime;

        let fixture = Fixture::new();
        fs::create_dir_all(fixture.source.join("d/e")).unwrap();
        fs::write(fixture.source.join("d/f"), "f").unwrap();
        fs::write(fixture.source.join("d/e/g"), "g").unwrap();
        fs::create_dir(fixture.source.join("ro")).unwrap();
        fs::write(fixture.source.join("ro/f"), "f").unwrap();
        for dir in ["d", "d/e", "ro"] {
            filetime::set_file_mtime(
                fixture.source.join(dir),
                FileTime::from_unix_time(1_000_000_000, 0),
            )
            .unwrap();
        }
        fs::set_permissions(fixture.source.join("ro"), fs::Permissions::from_mode(0o555))
            .unwrap();
        fixture.build();

        let first = fixture.replay(&ReplayOptions::default()).unwrap();
        let second = fixture.replay(&ReplayOptions::default()).unwrap();

        let mtime = |dir: &str| fs::metadata(fixture.output.join(dir)).unwrap().mtime();
        let ro_mode = fs::metadata(fixture.output.join("ro"))
            .unwrap()
            .permissions()
            .mode();
        for dir in [&fixture.source, &fixture.output] {
            fs::set_permissions(dir.join("ro"), fs::Permissions::from_mode(0o755)).unwrap();
        }

        assert_eq!(first.errors, 0);
        assert_eq!(second.already_present, second.entries_processed);
        assert_eq!(mtime("d"), 1_000_000_000);
        assert_eq!(mtime("d/e"), 1_000_000_000);
        assert_eq!(mtime("ro"), 1_000_000_000);
        assert_eq!(ro_mode & 0o777, 0o555);
        assert_eq!(fs::read_to_string(fixture.output.join("ro/f")).unwrap(), "f");
    }

    #[test]
    fn test_test_mode_uses_existing_registry_read_only() {
        let fixture = Fixture::new();
        fs::write(fixture.source.join("a"), "a").unwrap();
        fs::hard_link(fixture.source.join("a"), fixture.source.join("b")).unwrap();
        fixture.build();

        fixture.replay(&ReplayOptions::default()).unwrap();
        fs::remove_file(fixture.output.join("b")).unwrap();

        let options = ReplayOptions {
            test_mode: true,
            ..ReplayOptions::default()
        };
        let summary = fixture.replay(&options).unwrap();

        assert_eq!(summary.hard_links_created, 1);
        assert!(!fixture.output.join("b").exists());
    }

    #[test]
    fn test_resume_from_checkpoint() {
        let fixture = Fixture::new();
        for name in ["a", "b", "c", "d", "e"] {
            fs::write(fixture.source.join(name), name).unwrap();
        }
        fixture.build();

        let checkpoint = Checkpoint::new(layout::checkpoint_path(&fixture.output));
        checkpoint.store(3).unwrap();

        let options = ReplayOptions {
            checkpoint_interval: 2,
            ..ReplayOptions::default()
        };
        let summary = fixture.replay(&options).unwrap();

        assert_eq!(summary.resumed_from, Some(3));
        assert_eq!(summary.entries_processed, 2);
        assert_eq!(tree(&fixture.output), vec!["d", "e"]);
        assert!(!checkpoint.path().exists());
    }

    #[test]
    fn test_interrupted_run_resumes_to_same_tree() {
        let fixture = Fixture::new();
        for name in ["a", "b", "c", "d", "e", "f"] {
            fs::write(fixture.source.join(name), name).unwrap();
        }
        fs::hard_link(fixture.source.join("a"), fixture.source.join("g")).unwrap();
        fixture.build();

        // First pass stops after index 3, with its last sync at 2.
        fixture
            .replay(&ReplayOptions {
                range: Some("-3".parse().unwrap()),
                ..ReplayOptions::default()
            })
            .unwrap();
        Checkpoint::new(layout::checkpoint_path(&fixture.output))
            .store(2)
            .unwrap();

        let summary = fixture.replay(&ReplayOptions::default()).unwrap();

        assert_eq!(summary.resumed_from, Some(2));
        assert_eq!(summary.already_present, 2);
        assert_eq!(summary.hard_links_created, 1);
        assert_eq!(tree(&fixture.output), vec!["a", "b", "c", "d", "e", "f", "g"]);
        assert_eq!(
            ino(&fixture.output.join("a")),
            ino(&fixture.output.join("g"))
        );
    }

    #[test]
    fn test_checkpoint_cleared_after_complete_run() {
        let fixture = Fixture::new();
        for name in ["a", "b", "c"] {
            fs::write(fixture.source.join(name), name).unwrap();
        }
        fixture.build();

        let summary = fixture
            .replay(&ReplayOptions {
                checkpoint_interval: 2,
                ..ReplayOptions::default()
            })
            .unwrap();

        assert_eq!(summary.entries_processed, 3);
        assert!(!layout::checkpoint_path(&fixture.output).exists());
    }

    #[test]
    fn test_failed_run_keeps_last_checkpoint() {
        let fixture = Fixture::new();
        for name in ["a", "b", "c"] {
            fs::write(fixture.source.join(name), name).unwrap();
        }
        fs::create_dir(fixture.source.join("y")).unwrap();
        fixture.write_catalogue(&format!(
            "0:B:{src}\n0:R:{src}\n0:F:a\n1:F:b\n2:F:c\n3:F:y\n",
            src = fixture.source.display()
        ));

        let err = fixture
            .replay(&ReplayOptions {
                checkpoint_interval: 2,
                kind_mismatch: KindMismatchPolicy::Strict,
                ..ReplayOptions::default()
            })
            .unwrap_err();

        assert!(matches!(err, ReplayError::KindMismatch { index: 3, .. }));
        assert_eq!(
            fs::read_to_string(layout::checkpoint_path(&fixture.output)).unwrap(),
            "2\n"
        );
    }

    #[test]
    fn test_missing_base_is_fatal() {
        let fixture = Fixture::new();
        fixture.write_catalogue("0:B:/definitely/not/here\n0:R:/definitely/not/here\n");

        let err = fixture.replay(&ReplayOptions::default()).unwrap_err();

        assert!(matches!(err, ReplayError::MissingBase(_)));
    }

    #[test]
    fn test_root_outside_base_is_fatal() {
        let fixture = Fixture::new();
        fixture.write_catalogue(&format!(
            "0:B:{}\n0:R:/elsewhere\n0:F:x\n",
            fixture.source.display()
        ));

        let err = fixture.replay(&ReplayOptions::default()).unwrap_err();

        assert!(matches!(err, ReplayError::RootOutsideBase { .. }));
    }

    #[test]
    fn test_structural_errors() {
        let fixture = Fixture::new();
        let src = fixture.source.display();

        fixture.write_catalogue(&format!("0:R:{src}\n"));
        assert!(matches!(
            fixture.replay(&ReplayOptions::default()),
            Err(ReplayError::EntryBeforeBase { index: 0 })
        ));

        fixture.write_catalogue(&format!("0:B:{src}\n0:F:x\n"));
        assert!(matches!(
            fixture.replay(&ReplayOptions::default()),
            Err(ReplayError::EntryBeforeRoot { index: 0 })
        ));

        fixture.write_catalogue(&format!("0:B:{src}\n0:R:{src}\n0:F:../x\n"));
        assert!(matches!(
            fixture.replay(&ReplayOptions::default()),
            Err(ReplayError::InvalidEntryPath { index: 0, .. })
        ));

        fixture.write_catalogue(&format!("0:B:{src}\n0:B:{src}\n"));
        assert!(matches!(
            fixture.replay(&ReplayOptions::default()),
            Err(ReplayError::DuplicateBase { .. })
        ));
    }

    #[test]
    fn test_missing_catalogue_is_fatal() {
        let fixture = Fixture::new();

        assert!(matches!(
            fixture.replay(&ReplayOptions::default()),
            Err(ReplayError::Catalogue(_))
        ));
    }

    #[test]
    fn test_vanished_source_is_skipped() {
        let fixture = Fixture::new();
        fs::write(fixture.source.join("keep"), "k").unwrap();
        fs::write(fixture.source.join("gone"), "g").unwrap();
        fixture.build();
        fs::remove_file(fixture.source.join("gone")).unwrap();

        let summary = fixture.replay(&ReplayOptions::default()).unwrap();

        assert_eq!(summary.sources_missing, 1);
        assert_eq!(tree(&fixture.output), vec!["keep"]);
    }

    #[test]
    fn test_kind_mismatch_policies() {
        let fixture = Fixture::new();
        fs::create_dir(fixture.source.join("was_file")).unwrap();
        fixture.write_catalogue(&format!(
            "0:B:{src}\n0:R:{src}\n0:F:was_file\n",
            src = fixture.source.display()
        ));

        let err = fixture
            .replay(&ReplayOptions {
                kind_mismatch: KindMismatchPolicy::Strict,
                ..ReplayOptions::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            ReplayError::KindMismatch {
                declared: EntryKind::File,
                actual: NodeKind::Directory,
                ..
            }
        ));
        assert!(!fixture.output.join("was_file").exists());

        let summary = fixture.replay(&ReplayOptions::default()).unwrap();
        assert_eq!(summary.directories_created, 1);
        assert!(fixture.output.join("was_file").is_dir());
    }

    #[test]
    fn test_progress_reported_per_entry() {
        let fixture = Fixture::new();
        fs::write(fixture.source.join("a"), "a").unwrap();
        fs::write(fixture.source.join("b"), "b").unwrap();
        fixture.build();

        let mut seen = Vec::new();
        replay(
            &fixture.catalogue,
            &fixture.output,
            &ReplayOptions::default(),
            |progress| seen.push(*progress),
        )
        .unwrap();

        assert_eq!(
            seen,
            vec![ReplayProgress::new(0, 1), ReplayProgress::new(1, 2)]
        );
    }

    #[test]
    fn test_single_file_source() {
        let fixture = Fixture::new();
        fs::create_dir(fixture.source.join("docs")).unwrap();
        fs::write(fixture.source.join("docs/readme"), "read me").unwrap();
        fs::write(fixture.source.join("other"), "o").unwrap();

        CatalogueBuilder::new(
            &fixture.source,
            vec![fixture.source.join("docs/readme"), fixture.source.join("other")],
        )
        .save(&fixture.catalogue)
        .unwrap();
        fixture.replay(&ReplayOptions::default()).unwrap();

        assert_eq!(tree(&fixture.output), vec!["docs", "docs/readme", "other"]);
        assert_eq!(
            fs::read_to_string(fixture.output.join("docs/readme")).unwrap(),
            "read me"
        );
    }

    #[test]
    fn test_is_single_component() {
        assert!(is_single_component(Path::new("name")));
        assert!(!is_single_component(Path::new("a/b")));
        assert!(!is_single_component(Path::new("..")));
        assert!(!is_single_component(Path::new("/abs")));
        assert!(!is_single_component(Path::new("")));
    }
}
