use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::AppError;

/// Holds the compiled PDF shown next to the editor. At most one preview
/// file exists at a time; the old one is deleted before a replacement is
/// written, and the last one goes away on drop.
#[derive(Default)]
pub struct PdfPreview {
    current: Option<NamedTempFile>,
}

impl PdfPreview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a fresh preview file and returns its path. The previous
    /// file is removed first.
    pub fn replace(&mut self, bytes: &[u8]) -> Result<PathBuf, AppError> {
        self.current = None;
        let mut file = tempfile::Builder::new()
            .prefix("skolamat-preview-")
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        let path = file.path().to_path_buf();
        self.current = Some(file);
        Ok(path)
    }

    pub fn path(&self) -> Option<&Path> {
        self.current.as_ref().map(|f| f.path())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_keeps_single_file() {
        let mut preview = PdfPreview::new();
        let first = preview.replace(b"%PDF-1.5 one").expect("first preview");
        assert!(first.exists());

        let second = preview.replace(b"%PDF-1.5 two").expect("second preview");
        assert!(!first.exists(), "old preview must be deleted");
        assert!(second.exists());
        assert_eq!(preview.path(), Some(second.as_path()));
    }

    #[test]
    fn test_clear_removes_file() {
        let mut preview = PdfPreview::new();
        let path = preview.replace(b"%PDF-1.5").expect("preview");
        preview.clear();
        assert!(!path.exists());
        assert!(preview.path().is_none());
    }
}
