//! Writing the generated document to disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::IacResult;

/// File name of the generated document.
pub const DEFAULT_FILE_NAME: &str = "main.tf";

/// Folder under which per-region output directories are created.
pub const DEFAULT_OUTPUT_ROOT: &str = "output";

/// Writes a generated document into an output directory.
pub struct OutputWriter {
    output_dir: PathBuf,
    file_name: String,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }

    /// `<root>/<region>`
    pub fn for_region(root: impl AsRef<Path>, region: &str) -> Self {
        Self::new(root.as_ref().join(region))
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn target(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }

    /// Replace the target file with `content`.
    ///
    /// The document is written to a temporary file next to the target and
    /// renamed over it, so the target is either the old or the new document.
    pub fn write(&self, content: &str) -> IacResult<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let mut file = NamedTempFile::new_in(&self.output_dir)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        let target = self.target();
        file.persist(&target).map_err(|e| e.error)?;

        info!("Wrote {} bytes to {:?}", content.len(), target);
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::for_region(dir.path(), "us-east-1");

        let path = writer.write("first\n").unwrap();
        assert_eq!(path, dir.path().join("us-east-1").join("main.tf"));

        writer.write("second\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");

        let entries = fs::read_dir(dir.path().join("us-east-1")).unwrap().count();
        assert_eq!(entries, 1);
    }
}
