use crate::buffer::{BufferError, RopeBuffer};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document {path}: {source}")]
    InvalidDocument { path: PathBuf, source: BufferError },
}

/// Write content to a markdown file
pub fn write_file(path: &Path, content: &str) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(path, content).map_err(IoError::Io)
}

/// Load a markdown file into a buffer, byte for byte
pub fn load_buffer(path: &Path) -> Result<RopeBuffer, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    RopeBuffer::from_bytes(&bytes).map_err(|source| IoError::InvalidDocument {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a buffer back to disk
pub fn save_buffer(path: &Path, buffer: &RopeBuffer) -> Result<(), IoError> {
    write_file(path, &buffer.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::LineBuffer;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.md");

        let result = load_buffer(&missing);

        assert!(matches!(result, Err(IoError::NotFound(path)) if path == missing));
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("lists/todo.md");

        write_file(&nested, "- [ ] a\n").unwrap();

        assert_eq!(fs::read_to_string(&nested).unwrap(), "- [ ] a\n");
    }

    #[test]
    fn test_buffer_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("todo.md");
        fs::write(&path, "- [ ] a\r\n- [x] b\n").unwrap();

        let buffer = load_buffer(&path).unwrap();
        assert_eq!(buffer.line_count(), 3);
        save_buffer(&path, &buffer).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"- [ ] a\r\n- [x] b\n");
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("binary.md");
        fs::write(&path, [0xff, 0xfe]).unwrap();

        let result = load_buffer(&path);

        assert!(matches!(result, Err(IoError::InvalidDocument { .. })));
    }
}
