use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Filesystem operations the engine performs on the scratch tree.
pub trait ScratchFs: Send {
    fn exists(&self, path: &Path) -> bool;

    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Appends `line` plus a newline, creating the file if needed.
    fn append_line(&self, path: &Path, line: &str) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl ScratchFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn append_line(&self, path: &Path, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")
    }
}

/// Whether a removal failure means another process holds the directory.
pub fn is_lock_error(err: &io::Error) -> bool {
    // ERROR_SHARING_VIOLATION and ERROR_LOCK_VIOLATION
    const WINDOWS_LOCK_CODES: [i32; 2] = [32, 33];

    err.kind() == io::ErrorKind::PermissionDenied
        || (cfg!(windows) && err.raw_os_error().is_some_and(|code| WINDOWS_LOCK_CODES.contains(&code)))
}
