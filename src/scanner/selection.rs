use crate::config::FilterConfig;
use crate::error::Result;
use crate::scanner::file_filter::FileFilter;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// One entry of a selection, in the order the user gave it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub filename: String,
    pub extension: String,
}

impl SelectedFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Self {
            path,
            filename,
            extension,
        }
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

/// Expands command-line paths into an ordered selection.
pub struct FileSelector {
    filter: FileFilter,
    max_depth: usize,
}

impl FileSelector {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
        }
    }

    /// Files are kept as given, even if missing, so that the run reports them.
    /// Directories are walked in file-name order.
    pub fn select<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<SelectedFile>> {
        let mut selection = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                selection.extend(self.walk_directory(path)?);
            } else {
                selection.push(SelectedFile::new(path));
            }
        }

        Ok(selection)
    }

    fn walk_directory(&self, root: &Path) -> Result<Vec<SelectedFile>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .max_depth(self.max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // An unreadable entry is skipped; the rest of the tree is still walked.
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    warn!(path = %path, error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if is_file_entry(&entry) {
                files.push(SelectedFile::new(entry.path()));
            }
        }

        Ok(files)
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        self.filter.should_visit(entry.path())
    }
}

/// Regular files, plus symlinks that resolve to one. Linked directories are not followed.
fn is_file_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}
