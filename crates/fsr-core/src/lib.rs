use std::ffi::OsStr;
use std::fs::{self, File, Permissions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

pub mod pairs;
pub mod replacement;

pub use pairs::{load_pairs_file, parse_pairs, PairsFile, SkippedLine};
pub use replacement::{MatchOrder, ReplacementMap, ReplacementPair, Substituter};

/// Appended to the reference folder path when no destination is given.
pub const GENERATED_SUFFIX: &str = "(generated)";

#[derive(thiserror::Error, Debug)]
pub enum FsrError {
    #[error("Not a directory: {path:?}")]
    NotADirectory { path: PathBuf },
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Destination {destination:?} lies inside the reference folder {source_dir:?}")]
    DestinationInsideSource {
        source_dir: PathBuf,
        destination: PathBuf,
    },
    #[error(transparent)]
    Review(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct DuplicateOptions {
    pub rewrite_names: bool,
    pub rewrite_contents: bool,
    pub dry_run: bool,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        Self {
            rewrite_names: true,
            rewrite_contents: true,
            dry_run: false,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DuplicateResult {
    pub directories_created: usize,
    pub files_written: usize,
    pub names_changed: usize,
    pub content_changes: usize,
    pub entries_skipped: usize,
}

/// `source` with trailing separators dropped and [`GENERATED_SUFFIX`] appended.
pub fn default_destination(source: &Path) -> PathBuf {
    let trimmed: PathBuf = source.components().collect();
    let mut destination = trimmed.into_os_string();
    destination.push(GENERATED_SUFFIX);
    PathBuf::from(destination)
}

/// Mirrors `source` into `destination`, substituting entry names and text file
/// contents. The first failure aborts the run; nothing already written is removed.
pub fn duplicate_tree(
    source: &Path,
    destination: &Path,
    substituter: &Substituter,
    options: &DuplicateOptions,
) -> Result<DuplicateResult, FsrError> {
    duplicate_tree_interactive(
        source,
        destination,
        substituter,
        options,
        |_, _, _, _| Ok(true),
        |_, _, _| Ok(true),
    )
}

/// Like [`duplicate_tree`], but every content rewrite and every renaming is offered
/// to a review callback first. A declined rewrite copies the raw content; a declined
/// renaming keeps the original name.
pub fn duplicate_tree_interactive<F, G>(
    source: &Path,
    destination: &Path,
    substituter: &Substituter,
    options: &DuplicateOptions,
    content_review: F,
    name_review: G,
) -> Result<DuplicateResult, FsrError>
where
    F: Fn(&Path, &str, &str, &str) -> anyhow::Result<bool>,
    G: Fn(&Path, &Path, &str) -> anyhow::Result<bool>,
{
    let source_metadata = match fs::metadata(source) {
        Ok(metadata) if metadata.is_dir() => metadata,
        Ok(_) => {
            return Err(FsrError::NotADirectory {
                path: source.to_path_buf(),
            })
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(FsrError::NotADirectory {
                path: source.to_path_buf(),
            })
        }
        Err(err) => return Err(io_error(source)(err)),
    };

    ensure_outside_source(source, destination)?;

    info!("Duplicating {:?} into {:?}", source, destination);
    if options.dry_run {
        warn!("Dry run mode - no changes will be made");
    }

    let mut duplicator = Duplicator {
        substituter,
        options,
        content_review: &content_review,
        name_review: &name_review,
        result: DuplicateResult::default(),
    };
    duplicator.duplicate_directory(source, destination, source_metadata.permissions())?;

    let result = duplicator.result;
    info!(
        "Duplication complete: {} directories, {} files, {} names changed, {} content changes",
        result.directories_created, result.files_written, result.names_changed, result.content_changes
    );

    Ok(result)
}

struct Duplicator<'a, F, G> {
    substituter: &'a Substituter,
    options: &'a DuplicateOptions,
    content_review: &'a F,
    name_review: &'a G,
    result: DuplicateResult,
}

impl<F, G> Duplicator<'_, F, G>
where
    F: Fn(&Path, &str, &str, &str) -> anyhow::Result<bool>,
    G: Fn(&Path, &Path, &str) -> anyhow::Result<bool>,
{
    fn duplicate_directory(
        &mut self,
        source_dir: &Path,
        dest_dir: &Path,
        permissions: Permissions,
    ) -> Result<(), FsrError> {
        debug!("Processing directory: {:?}", source_dir);

        if self.options.dry_run {
            info!("Would create directory: {:?}", dest_dir);
        } else {
            fs::create_dir_all(dest_dir).map_err(io_error(dest_dir))?;
            make_writable(dest_dir)?;
        }
        self.result.directories_created += 1;

        let entries: Vec<_> = fs::read_dir(source_dir)
            .and_then(|entries| entries.collect::<Result<Vec<_>, _>>())
            .map_err(io_error(source_dir))?;

        for entry in &entries {
            let source_path = entry.path();

            // Follows symlinks, so linked files and directories are copied as their targets
            let metadata = match fs::metadata(&source_path) {
                Ok(metadata) => metadata,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    warn!("Skipping dangling symlink: {:?}", source_path);
                    self.result.entries_skipped += 1;
                    continue;
                }
                Err(err) => return Err(io_error(&source_path)(err)),
            };

            if !metadata.is_dir() && !metadata.is_file() {
                warn!("Skipping special file: {:?}", source_path);
                self.result.entries_skipped += 1;
                continue;
            }

            let dest_path =
                self.destination_for(&source_path, &entry.file_name(), dest_dir, metadata.is_dir())?;

            if metadata.is_dir() {
                self.duplicate_directory(&source_path, &dest_path, metadata.permissions())?;
            } else {
                self.duplicate_file(&source_path, &dest_path, metadata.permissions())?;
            }
        }

        // Applied last so read-only source directories can still be populated
        if !self.options.dry_run {
            fs::set_permissions(dest_dir, permissions).map_err(io_error(dest_dir))?;
        }

        Ok(())
    }

    fn destination_for(
        &mut self,
        source_path: &Path,
        name: &OsStr,
        dest_dir: &Path,
        is_dir: bool,
    ) -> Result<PathBuf, FsrError> {
        let original = dest_dir.join(name);
        if !self.options.rewrite_names {
            return Ok(original);
        }

        let Some(name_str) = name.to_str() else {
            debug!("Keeping non UTF-8 name: {:?}", source_path);
            return Ok(original);
        };

        let Some(new_name) = self.substituter.resolve_name(name_str) else {
            return Ok(original);
        };

        if !is_single_segment(&new_name) {
            warn!(
                "Keeping original name for {:?}: '{}' is not a valid entry name",
                source_path, new_name
            );
            return Ok(original);
        }

        let renamed = dest_dir.join(&new_name);
        let kind = if is_dir { "Directory" } else { "File" };

        if (self.name_review)(source_path, &renamed, kind)? {
            info!("Renaming {}: '{}' -> '{}'", kind.to_lowercase(), name_str, new_name);
            self.result.names_changed += 1;
            Ok(renamed)
        } else {
            debug!("Keeping original name: {:?}", source_path);
            Ok(original)
        }
    }

    fn duplicate_file(
        &mut self,
        source_path: &Path,
        dest_path: &Path,
        permissions: Permissions,
    ) -> Result<(), FsrError> {
        debug!("Processing file: {:?}", source_path);

        let bytes = fs::read(source_path).map_err(io_error(source_path))?;
        let contents = match String::from_utf8(bytes) {
            Ok(text) => self.rewrite_text(source_path, text)?.into_bytes(),
            Err(err) => {
                debug!("Copying binary file verbatim: {:?}", source_path);
                err.into_bytes()
            }
        };

        if self.options.dry_run {
            info!("Would write file: {:?}", dest_path);
        } else {
            debug!("Generating file: {:?}", dest_path);
            write_file(dest_path, &contents, permissions)?;
        }
        self.result.files_written += 1;

        Ok(())
    }

    fn rewrite_text(&mut self, source_path: &Path, text: String) -> Result<String, FsrError> {
        if !self.options.rewrite_contents {
            return Ok(text);
        }

        let Some(rewritten) = self.substituter.rewrite_content(&text) else {
            return Ok(text);
        };

        if (self.content_review)(source_path, &text, &rewritten, "Content rewrite")? {
            info!("Rewriting contents of: {:?}", source_path);
            self.result.content_changes += 1;
            Ok(rewritten)
        } else {
            debug!("Keeping original contents: {:?}", source_path);
            Ok(text)
        }
    }
}

fn write_file(path: &Path, contents: &[u8], permissions: Permissions) -> Result<(), FsrError> {
    make_writable(path)?;

    let mut file = File::create(path).map_err(io_error(path))?;
    file.write_all(contents).map_err(io_error(path))?;
    file.set_permissions(permissions).map_err(io_error(path))
}

/// True when `name` is exactly one normal path component.
fn is_single_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    !name.contains(std::path::is_separator)
        && matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
}

/// Gives the owner write access to an entry left read-only by an earlier run.
/// The source permissions are applied again once the entry is written.
fn make_writable(path: &Path) -> Result<(), FsrError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(io_error(path)(err)),
    };
    let mut permissions = metadata.permissions();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let required = if metadata.is_dir() { 0o700 } else { 0o200 };
        if permissions.mode() & required == required {
            return Ok(());
        }
        permissions.set_mode(permissions.mode() | required);
    }
    #[cfg(not(unix))]
    {
        if !permissions.readonly() {
            return Ok(());
        }
        permissions.set_readonly(false);
    }

    debug!("Making existing destination entry writable: {:?}", path);
    fs::set_permissions(path, permissions).map_err(io_error(path))
}

fn ensure_outside_source(source: &Path, destination: &Path) -> Result<(), FsrError> {
    let source_dir = source.canonicalize().map_err(io_error(source))?;
    let resolved = resolve_destination(destination).map_err(io_error(destination))?;

    if resolved.starts_with(&source_dir) {
        return Err(FsrError::DestinationInsideSource {
            source_dir: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }

    Ok(())
}

/// Canonicalizes the deepest existing ancestor of `path` and re-appends the
/// components that do not exist yet.
fn resolve_destination(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(resolved) => {
                return Ok(missing.iter().rev().fold(resolved, |acc, name| acc.join(name)));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(err);
                };
                missing.push(name);
                existing = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            Err(err) => return Err(err),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> FsrError + '_ {
    move |source| FsrError::Io {
        path: path.to_path_buf(),
        source,
    }
}
