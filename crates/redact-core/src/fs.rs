//! Atomic output writes.
//!
//! Output is written to a temporary file in the destination directory and
//! renamed into place only after the writer succeeds, so a failed run never
//! leaves a complete-looking file at the output path.

use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `contents` to `path` atomically.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    write_atomic_with(path, |file| file.write_all(contents))
}

/// Run `write` against a temporary file next to `path`, then move it into place.
///
/// The temporary file is removed if `write` returns an error.
pub fn write_atomic_with<F, E>(path: &Path, write: F) -> Result<(), E>
where
    F: FnOnce(&mut NamedTempFile) -> Result<(), E>,
    E: From<io::Error>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".redact-")
        .suffix(".partial")
        .tempfile_in(dir)?;

    write(&mut tmp)?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| E::from(err.error))?;

    tracing::trace!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("out.txt");

        write_atomic(&path, b"hello").expect("write file");

        assert_eq!(std::fs::read(&path).expect("read back"), b"hello");
    }

    #[test]
    fn test_failed_write_leaves_no_output() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("out.txt");

        let result: io::Result<()> = write_atomic_with(&path, |file| {
            file.write_all(b"partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "encoder failed"))
        });

        assert!(result.is_err());
        assert!(!path.exists());
        let leftovers = std::fs::read_dir(tmp.path()).expect("list dir").count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("out.txt");
        std::fs::write(&path, b"old").expect("seed file");

        write_atomic(&path, b"new").expect("overwrite file");

        assert_eq!(std::fs::read(&path).expect("read back"), b"new");
    }
}
