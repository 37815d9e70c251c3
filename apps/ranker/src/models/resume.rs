use serde::Serialize;

use crate::models::file::SelectedFile;
use crate::ranking_client::RankedResumeEntry;

/// A resume the Ranking Service has accepted.
#[derive(Debug, Clone)]
pub struct UploadedResume {
    /// Opaque id assigned by the service.
    pub id: String,
    pub source_file: SelectedFile,
    pub display_name: String,
}

impl UploadedResume {
    pub fn new(id: String, source_file: SelectedFile) -> Self {
        let display_name = source_file.name.clone();
        Self {
            id,
            source_file,
            display_name,
        }
    }
}

/// The active job description. It is only uploaded together with a ranking request.
#[derive(Debug, Clone)]
pub struct JobDescription {
    pub source_file: SelectedFile,
    /// Text the service extracted from the PDF during the last successful ranking.
    pub extracted_text: Option<String>,
}

impl JobDescription {
    pub fn new(source_file: SelectedFile) -> Self {
        Self {
            source_file,
            extracted_text: None,
        }
    }
}

/// One ranked resume. Lower `score` is a stronger match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub resume_id: String,
    pub filename: String,
    pub score: f64,
    pub snippet: String,
    pub full_text: String,
    pub feedback: Option<String>,
    pub feedback_visible: bool,
}

impl From<RankedResumeEntry> for RankedResult {
    fn from(entry: RankedResumeEntry) -> Self {
        Self {
            resume_id: entry.resume_id,
            filename: entry.filename,
            score: entry.score,
            snippet: entry.snippet,
            full_text: entry.full_text,
            feedback: None,
            feedback_visible: false,
        }
    }
}
