use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Produces candidate paths for a file-search query.
pub trait FileSearch {
    fn scan(&mut self, query: &str) -> Vec<PathBuf>;

    /// Most paths one scan returns. A scan that reaches it may have
    /// dropped matches.
    fn limit(&self) -> Option<usize> {
        None
    }
}

/// Tries `fd`, then `locate`, then a bounded directory walk of `root`.
pub struct CascadeSearch {
    root: PathBuf,
    limit: usize,
    max_depth: usize,
    use_tools: bool,
}

impl CascadeSearch {
    pub fn new(root: PathBuf, limit: usize, max_depth: usize) -> Self {
        Self {
            root,
            limit,
            max_depth,
            use_tools: true,
        }
    }

    /// Skips external tools, only walks `root`.
    pub fn walk_only(root: PathBuf, limit: usize, max_depth: usize) -> Self {
        Self {
            use_tools: false,
            ..Self::new(root, limit, max_depth)
        }
    }

    fn with_fd(&self, query: &str) -> Option<Vec<PathBuf>> {
        let fd = which::which("fd").or_else(|_| which::which("fdfind")).ok()?;
        let mut command = Command::new(fd);
        command
            .args(["--hidden", "--fixed-strings", "--ignore-case", "--absolute-path"])
            .args(["--exclude", ".git", "--max-results"])
            .arg(self.limit.to_string())
            .arg("--")
            .arg(query)
            .arg(&self.root);
        run_lines(command)
    }

    fn with_locate(&self, query: &str) -> Option<Vec<PathBuf>> {
        let locate = which::which("plocate").or_else(|_| which::which("locate")).ok()?;
        let mut command = Command::new(locate);
        command
            .args(["-i", "-l"])
            .arg(self.limit.to_string())
            .arg("--")
            .arg(query);
        run_lines(command)
    }

    fn walk(&self, query: &str) -> Vec<PathBuf> {
        let needle = query.to_lowercase();
        WalkDir::new(&self.root)
            .max_depth(self.max_depth)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e))
            .flatten()
            .filter(|e| e.depth() > 0)
            .filter(|e| {
                e.file_name()
                    .to_string_lossy()
                    .to_lowercase()
                    .contains(&needle)
            })
            .take(self.limit)
            .map(DirEntry::into_path)
            .collect()
    }
}

impl FileSearch for CascadeSearch {
    fn limit(&self) -> Option<usize> {
        Some(self.limit)
    }

    fn scan(&mut self, query: &str) -> Vec<PathBuf> {
        if self.use_tools {
            if let Some(paths) = self.with_fd(query) {
                info!("fd: {} paths for {:?}", paths.len(), query);
                return paths;
            }
            if let Some(paths) = self.with_locate(query) {
                info!("locate: {} paths for {:?}", paths.len(), query);
                return paths;
            }
        }
        let paths = self.walk(query);
        info!("walk: {} paths for {:?}", paths.len(), query);
        paths
    }
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

/// Runs `command`, returning stdout lines as paths. `None` when the tool
/// fails so the caller can fall through to the next strategy.
fn run_lines(mut command: Command) -> Option<Vec<PathBuf>> {
    let output = command.stdin(Stdio::null()).stderr(Stdio::null()).output().ok()?;
    if !output.status.success() {
        debug!("{:?} exited with {}", command.get_program(), output.status);
        return None;
    }
    Some(
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|l| !l.is_empty())
            .map(PathBuf::from)
            .collect(),
    )
}

/// Number of directories between `home` and the file's parent, or `None`
/// when the path is outside `home`.
pub fn depth_below(path: &Path, home: &Path) -> Option<usize> {
    let relative = path.strip_prefix(home).ok()?;
    Some(relative.components().count().saturating_sub(1))
}
