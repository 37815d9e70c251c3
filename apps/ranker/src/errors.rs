use thiserror::Error;

/// Client-observable workflow errors.
/// Each one ends the single operation that raised it and is shown to the user as a notice.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("File \"{0}\" is not a PDF. Only PDF files are allowed.")]
    InvalidFileType(String),

    #[error("Duplicate file skipped: \"{0}\"")]
    DuplicateFile(String),

    #[error("Error uploading \"{filename}\": {message}")]
    UploadFailed { filename: String, message: String },

    #[error("Please select a job description PDF first.")]
    MissingJobDescription,

    #[error("Please upload at least one resume PDF first.")]
    NoResumes,

    #[error("Error ranking resumes: {0}")]
    RankingFailed(String),

    #[error("Job description text is not available. Please rank resumes first.")]
    MissingJobDescriptionText,

    #[error("Error getting feedback for \"{resume_id}\": {message}")]
    FeedbackFailed { resume_id: String, message: String },

    #[error("No feedback stored for \"{0}\"")]
    NothingToExport(String),
}

impl WorkflowError {
    /// Stable machine-readable code, used as a log field.
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::InvalidFileType(_) => "INVALID_FILE_TYPE",
            WorkflowError::DuplicateFile(_) => "DUPLICATE_FILE",
            WorkflowError::UploadFailed { .. } => "UPLOAD_FAILED",
            WorkflowError::MissingJobDescription => "MISSING_JOB_DESCRIPTION",
            WorkflowError::NoResumes => "NO_RESUMES",
            WorkflowError::RankingFailed(_) => "RANKING_FAILED",
            WorkflowError::MissingJobDescriptionText => "MISSING_JOB_DESCRIPTION_TEXT",
            WorkflowError::FeedbackFailed { .. } => "FEEDBACK_FAILED",
            WorkflowError::NothingToExport(_) => "NOTHING_TO_EXPORT",
        }
    }

    /// Skipped duplicates are reported as warnings rather than failures.
    pub fn is_warning(&self) -> bool {
        matches!(self, WorkflowError::DuplicateFile(_))
    }
}
