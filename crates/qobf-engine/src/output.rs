//! Output collaborators and default output paths.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::state::Mode;

/// Where finished artifacts go.
pub trait OutputWriter {
    /// Store `contents` at `path`, entirely or not at all.
    fn write(&mut self, path: &Path, contents: &str) -> EngineResult<()>;
}

/// Writes files next to their final location, then renames them into place.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

impl FsWriter {
    fn temp_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{name}.qobf-tmp"))
    }
}

impl OutputWriter for FsWriter {
    fn write(&mut self, path: &Path, contents: &str) -> EngineResult<()> {
        let io_error = |source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        };

        let temp = Self::temp_path(path);
        fs::write(&temp, contents).map_err(io_error)?;
        if let Err(e) = fs::rename(&temp, path) {
            let _ = fs::remove_file(&temp);
            return Err(io_error(e));
        }

        debug!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    }
}

/// Keeps written artifacts in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryWriter {
    files: FxHashMap<PathBuf, String>,
}

impl MemoryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents written to `path`, if any.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    /// Number of files written.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl OutputWriter for MemoryWriter {
    fn write(&mut self, path: &Path, contents: &str) -> EngineResult<()> {
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

/// Default output path, next to the input: `{stem}_obfuscated{ext}` for
/// circuits, `{stem}_obf_{algorithm}{ext}` for guarded scripts.
pub fn default_output_path(input: &Path, mode: Mode, algorithm: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());
    let ext = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let name = match mode {
        Mode::Quantum => format!("{stem}_obfuscated{ext}"),
        Mode::Classical => format!("{stem}_obf_{algorithm}{ext}"),
    };
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        assert_eq!(
            default_output_path(Path::new("dir/bell.qasm"), Mode::Quantum, "cloaked"),
            PathBuf::from("dir/bell_obfuscated.qasm")
        );
        assert_eq!(
            default_output_path(Path::new("payload.py"), Mode::Classical, "shroud"),
            PathBuf::from("payload_obf_shroud.py")
        );
        assert_eq!(
            default_output_path(Path::new("noext"), Mode::Quantum, "x"),
            PathBuf::from("noext_obfuscated")
        );
    }

    #[test]
    fn test_fs_writer_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.qasm");
        fs::write(&path, "old").unwrap();

        FsWriter.write(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!FsWriter::temp_path(&path).exists());
    }

    #[test]
    fn test_fs_writer_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.qasm");
        let err = FsWriter.write(&path, "x").unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_memory_writer() {
        let mut writer = MemoryWriter::new();
        writer.write(Path::new("a.py"), "print(1)").unwrap();
        assert_eq!(writer.get("a.py"), Some("print(1)"));
        assert_eq!(writer.len(), 1);
    }
}
