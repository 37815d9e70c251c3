use std::fmt;
use std::path::PathBuf;

use crate::errors::WorkflowError;
use crate::workflow::controller::{FileOutcome, UploadReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn ranked(count: usize) -> Self {
        let noun = if count == 1 { "resume" } else { "resumes" };
        Self::success(format!("Resumes ranked successfully! ({count} {noun})"))
    }

    /// Outcome of writing a feedback export to disk.
    pub fn for_export(written: &anyhow::Result<PathBuf>) -> Self {
        match written {
            Ok(path) => Self::info(format!("Feedback downloaded to {}", path.display())),
            Err(e) => Self::error(format!("{e:#}")),
        }
    }

    /// One notice per file of an upload batch, in selection order.
    pub fn for_upload(report: &UploadReport) -> Vec<Notice> {
        report
            .outcomes
            .iter()
            .map(|outcome| match outcome {
                FileOutcome::Uploaded(resume) => Notice::success(format!(
                    "Resume \"{}\" uploaded successfully!",
                    resume.display_name
                )),
                FileOutcome::Rejected(err) => Notice::from(err),
            })
            .collect()
    }
}

impl From<&WorkflowError> for Notice {
    fn from(err: &WorkflowError) -> Self {
        let level = if err.is_warning() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        Self {
            level,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::file::{SelectedFile, PDF_MIME};
    use crate::models::resume::UploadedResume;
    use crate::workflow::export::FeedbackExport;

    #[test]
    fn test_upload_report_notices_follow_outcomes() {
        let report = UploadReport {
            outcomes: vec![
                FileOutcome::Uploaded(UploadedResume::new(
                    "r1".to_string(),
                    SelectedFile::new("a.pdf", PDF_MIME, vec![1]),
                )),
                FileOutcome::Rejected(WorkflowError::DuplicateFile("a.pdf".to_string())),
                FileOutcome::Rejected(WorkflowError::InvalidFileType("b.docx".to_string())),
            ],
        };

        let notices = Notice::for_upload(&report);
        let levels: Vec<NoticeLevel> = notices.iter().map(|n| n.level).collect();
        assert_eq!(
            levels,
            vec![NoticeLevel::Success, NoticeLevel::Warning, NoticeLevel::Error]
        );
        assert_eq!(
            notices[0].to_string(),
            "[ok] Resume \"a.pdf\" uploaded successfully!"
        );
    }

    #[test]
    fn test_error_notice_uses_error_message() {
        let notice = Notice::from(&WorkflowError::MissingJobDescriptionText);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(
            notice.to_string(),
            "[error] Job description text is not available. Please rank resumes first."
        );
    }

    #[test]
    fn test_ranked_notice_counts_results() {
        assert_eq!(
            Notice::ranked(3).to_string(),
            "[ok] Resumes ranked successfully! (3 resumes)"
        );
        assert_eq!(Notice::ranked(1).message, "Resumes ranked successfully! (1 resume)");
    }

    #[test]
    fn test_failed_export_write_is_an_error_notice() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "not a directory").unwrap();
        let export = FeedbackExport {
            file_name: "feedback_a.txt".to_string(),
            contents: "Good fit".to_string(),
        };

        let failed = Notice::for_export(&export.write_to(&blocker));
        assert_eq!(failed.level, NoticeLevel::Error);
        assert!(failed.message.contains("Failed to create"));

        let saved = Notice::for_export(&export.write_to(dir.path()));
        assert_eq!(saved.level, NoticeLevel::Info);
        assert!(saved.message.starts_with("Feedback downloaded to "));
        assert!(saved.message.ends_with("feedback_a.txt"));
    }
}
