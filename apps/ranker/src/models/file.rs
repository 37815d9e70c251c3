use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;

pub const PDF_MIME: &str = "application/pdf";
const OCTET_STREAM_MIME: &str = "application/octet-stream";

/// A file picked by the user, held in memory until it is sent to the service.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, deriving its MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", path.display()))?;
        let mime_type = mime_for_name(&name);

        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case(PDF_MIME)
    }

    /// Two selections are the same file when name and byte size match.
    pub fn same_file_as(&self, other: &SelectedFile) -> bool {
        self.name == other.name && self.size() == other.size()
    }
}

pub fn mime_for_name(name: &str) -> &'static str {
    let is_pdf = Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        PDF_MIME
    } else {
        OCTET_STREAM_MIME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_for_name("resume.pdf"), PDF_MIME);
        assert_eq!(mime_for_name("RESUME.PDF"), PDF_MIME);
        assert_eq!(mime_for_name("resume.docx"), OCTET_STREAM_MIME);
        assert_eq!(mime_for_name("pdf"), OCTET_STREAM_MIME);
    }

    #[test]
    fn test_same_file_compares_name_and_size() {
        let a = SelectedFile::new("a.pdf", PDF_MIME, vec![0u8; 1024]);
        let same = SelectedFile::new("a.pdf", PDF_MIME, vec![1u8; 1024]);
        let bigger = SelectedFile::new("a.pdf", PDF_MIME, vec![0u8; 2048]);
        let renamed = SelectedFile::new("b.pdf", PDF_MIME, vec![0u8; 1024]);

        assert!(a.same_file_as(&same));
        assert!(!a.same_file_as(&bigger));
        assert!(!a.same_file_as(&renamed));
    }

    #[tokio::test]
    async fn test_from_path_reads_name_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.pdf");
        std::fs::write(&path, b"%PDF-1.4 test").unwrap();

        let file = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "cv.pdf");
        assert!(file.is_pdf());
        assert_eq!(file.size(), 13);
    }
}
