use std::collections::BTreeSet;

use crate::models::file::SelectedFile;
use crate::models::resume::{JobDescription, RankedResult, UploadedResume};

/// Everything one ranking session knows. Owned by `RankingWorkflow`; the view
/// layer only ever sees clones of it.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    pub pending_resumes: Vec<UploadedResume>,
    pub job_description: Option<JobDescription>,
    /// Service order. Never re-sorted.
    pub results: Vec<RankedResult>,
    pub upload_in_progress: bool,
    pub ranking_in_progress: bool,
    /// Resume ids with a feedback request on the wire.
    pub feedback_in_progress: BTreeSet<String>,
    /// Token of the most recently started ranking call.
    pub(crate) rank_token: u64,
    /// Bumped whenever the job description is replaced or cleared.
    pub(crate) jd_epoch: u64,
}

impl WorkflowState {
    pub fn is_duplicate(&self, file: &SelectedFile) -> bool {
        self.pending_resumes
            .iter()
            .any(|resume| resume.source_file.same_file_as(file))
    }

    pub fn append_resumes(&mut self, resumes: impl IntoIterator<Item = UploadedResume>) {
        self.pending_resumes.extend(resumes);
    }

    pub fn remove_resume(&mut self, id: &str) -> bool {
        let before = self.pending_resumes.len();
        self.pending_resumes.retain(|resume| resume.id != id);
        self.pending_resumes.len() != before
    }

    pub fn replace_job_description(&mut self, file: SelectedFile) {
        self.job_description = Some(JobDescription::new(file));
        self.jd_epoch += 1;
    }

    pub fn clear_job_description(&mut self) {
        self.job_description = None;
        self.jd_epoch += 1;
    }

    pub fn clear_extracted_text(&mut self) {
        if let Some(jd) = self.job_description.as_mut() {
            jd.extracted_text = None;
        }
    }

    /// Stores the text the service extracted from the job description of
    /// `epoch`. Returns false if that job description was replaced or cleared
    /// while the ranking call was in flight.
    pub fn set_extracted_text(&mut self, epoch: u64, text: String) -> bool {
        if epoch != self.jd_epoch {
            return false;
        }
        match self.job_description.as_mut() {
            Some(jd) => {
                jd.extracted_text = Some(text);
                true
            }
            None => false,
        }
    }

    /// Extracted job description text, if a ranking has succeeded. Blank text counts as absent.
    pub fn extracted_text(&self) -> Option<&str> {
        self.job_description
            .as_ref()
            .and_then(|jd| jd.extracted_text.as_deref())
            .filter(|text| !text.trim().is_empty())
    }

    /// Whole-collection replacement; results are never merged.
    pub fn replace_results(&mut self, results: Vec<RankedResult>) {
        self.results = results;
    }

    pub fn result(&self, resume_id: &str) -> Option<&RankedResult> {
        self.results.iter().find(|r| r.resume_id == resume_id)
    }

    /// Applies `update` to the result with `resume_id` in place. Returns false if absent.
    pub fn update_result(&mut self, resume_id: &str, update: impl FnOnce(&mut RankedResult)) -> bool {
        match self.results.iter_mut().find(|r| r.resume_id == resume_id) {
            Some(result) => {
                update(result);
                true
            }
            None => false,
        }
    }

    pub fn is_feedback_in_progress(&self, resume_id: &str) -> bool {
        self.feedback_in_progress.contains(resume_id)
    }

    /// Whether the rank action should be offered.
    pub fn can_rank(&self) -> bool {
        self.job_description.is_some()
            && !self.pending_resumes.is_empty()
            && !self.ranking_in_progress
            && !self.upload_in_progress
    }
}
