use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::resume::RankedResult;

/// A plain-text feedback download for one ranked resume.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackExport {
    pub file_name: String,
    pub contents: String,
}

impl FeedbackExport {
    /// `None` when no feedback has been generated for the result yet.
    pub fn for_result(result: &RankedResult) -> Option<Self> {
        let feedback = result.feedback.as_ref()?;
        Some(Self {
            file_name: export_file_name(&result.filename),
            contents: feedback.clone(),
        })
    }

    /// Writes the artifact into `dir` and returns the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// `feedback_<stem>.txt`, where `<stem>` is `filename` without its last extension.
pub fn export_file_name(filename: &str) -> String {
    // The service echoes client-supplied names; keep the artifact inside the target dir.
    let flat: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    let stem = match flat.rfind('.') {
        Some(idx) if idx > 0 => &flat[..idx],
        _ => flat.as_str(),
    };
    format!("feedback_{stem}.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(filename: &str, feedback: Option<&str>) -> RankedResult {
        RankedResult {
            resume_id: "r1".to_string(),
            filename: filename.to_string(),
            score: 0.2,
            snippet: String::new(),
            full_text: String::new(),
            feedback: feedback.map(str::to_string),
            feedback_visible: true,
        }
    }

    #[test]
    fn test_export_file_name_replaces_extension() {
        assert_eq!(export_file_name("jane_doe.pdf"), "feedback_jane_doe.txt");
        assert_eq!(export_file_name("cv.final.PDF"), "feedback_cv.final.txt");
        assert_eq!(export_file_name("noext"), "feedback_noext.txt");
        assert_eq!(export_file_name(".pdf"), "feedback_.pdf.txt");
        assert_eq!(export_file_name("../../etc/x.pdf"), "feedback_.._.._etc_x.txt");
    }

    #[test]
    fn test_no_feedback_no_export() {
        assert!(FeedbackExport::for_result(&result_with("a.pdf", None)).is_none());
        let export = FeedbackExport::for_result(&result_with("a.pdf", Some("Good fit"))).unwrap();
        assert_eq!(export.file_name, "feedback_a.txt");
        assert_eq!(export.contents, "Good fit");
    }

    #[test]
    fn test_write_to_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let export = FeedbackExport {
            file_name: "feedback_a.txt".to_string(),
            contents: "Add Kubernetes experience".to_string(),
        };

        let path = export.write_to(&dir.path().join("out")).unwrap();
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "Add Kubernetes experience"
        );
    }
}
