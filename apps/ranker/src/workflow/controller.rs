//! Ranking Workflow Controller: the upload → rank → feedback session.
//!
//! State lives behind a `std::sync::Mutex` that is only held for short,
//! synchronous updates and never across a service call. Operations take `&self`
//! so the presentation layer can overlap them the way a UI does. Upload batches
//! are serialized by a separate async gate.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};

use crate::errors::WorkflowError;
use crate::models::file::SelectedFile;
use crate::models::resume::{RankedResult, UploadedResume};
use crate::ranking_client::RankingService;
use crate::workflow::export::FeedbackExport;
use crate::workflow::state::WorkflowState;

const UPLOAD_FALLBACK: &str = "Failed to upload resume.";
const RANK_FALLBACK: &str = "Failed to rank resumes.";
const FEEDBACK_FALLBACK: &str = "Failed to get LLM feedback.";

/// What happened to one file of an `add_resume_files` batch.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Uploaded(UploadedResume),
    Rejected(WorkflowError),
}

/// Per-file outcomes of one batch, in selection order.
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub outcomes: Vec<FileOutcome>,
}

impl UploadReport {
    pub fn uploaded(&self) -> impl Iterator<Item = &UploadedResume> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Uploaded(resume) => Some(resume),
            FileOutcome::Rejected(_) => None,
        })
    }

    pub fn rejected(&self) -> impl Iterator<Item = &WorkflowError> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Rejected(err) => Some(err),
            FileOutcome::Uploaded(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RankOutcome {
    Ranked { count: usize },
    /// A newer ranking started before this one resolved; its response was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackOutcome {
    /// Feedback was attached to the result and revealed.
    Generated,
    /// A request for this resume was already on the wire; nothing was sent.
    AlreadyInFlight,
}

pub struct RankingWorkflow<S> {
    service: S,
    state: Mutex<WorkflowState>,
    upload_gate: AsyncMutex<()>,
}

impl<S: RankingService> RankingWorkflow<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: Mutex::new(WorkflowState::default()),
            upload_gate: AsyncMutex::new(()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current state for rendering.
    pub fn snapshot(&self) -> WorkflowState {
        self.lock_state().clone()
    }

    /// Validates, then uploads the accepted files one at a time. A rejected
    /// or failed file never stops the rest of the batch.
    pub async fn add_resume_files(&self, files: Vec<SelectedFile>) -> UploadReport {
        let _batch = self.upload_gate.lock().await;

        let verdicts: Vec<Result<SelectedFile, WorkflowError>> = {
            let state = self.lock_state();
            let mut verdicts: Vec<Result<SelectedFile, WorkflowError>> = Vec::with_capacity(files.len());
            for file in files {
                let queued_twice = verdicts
                    .iter()
                    .any(|v| matches!(v, Ok(queued) if queued.same_file_as(&file)));
                let verdict = if !file.is_pdf() {
                    Err(WorkflowError::InvalidFileType(file.name.clone()))
                } else if queued_twice || state.is_duplicate(&file) {
                    Err(WorkflowError::DuplicateFile(file.name.clone()))
                } else {
                    Ok(file)
                };
                verdicts.push(verdict);
            }
            verdicts
        };

        for err in verdicts.iter().filter_map(|v| v.as_ref().err()) {
            warn!(code = err.code(), "{err}");
        }

        if verdicts.iter().all(Result::is_err) {
            return UploadReport {
                outcomes: verdicts
                    .into_iter()
                    .filter_map(Result::err)
                    .map(FileOutcome::Rejected)
                    .collect(),
            };
        }

        self.lock_state().upload_in_progress = true;

        let mut outcomes = Vec::with_capacity(verdicts.len());
        for verdict in verdicts {
            let file = match verdict {
                Ok(file) => file,
                Err(err) => {
                    outcomes.push(FileOutcome::Rejected(err));
                    continue;
                }
            };

            match self.service.upload_resume(&file).await {
                Ok(id) => {
                    info!(filename = %file.name, resume_id = %id, "resume uploaded");
                    outcomes.push(FileOutcome::Uploaded(UploadedResume::new(id, file)));
                }
                Err(e) => {
                    let err = WorkflowError::UploadFailed {
                        filename: file.name.clone(),
                        message: e.user_message(UPLOAD_FALLBACK),
                    };
                    error!(code = err.code(), filename = %file.name, "upload failed: {e}");
                    outcomes.push(FileOutcome::Rejected(err));
                }
            }
        }

        let report = UploadReport { outcomes };
        info!(
            uploaded = report.uploaded().count(),
            rejected = report.rejected().count(),
            "upload batch finished"
        );
        {
            let mut state = self.lock_state();
            state.append_resumes(report.uploaded().cloned());
            state.upload_in_progress = false;
        }
        report
    }

    /// Drops a resume from the pending list. The service is not told.
    pub fn remove_resume(&self, id: &str) -> bool {
        let removed = self.lock_state().remove_resume(id);
        if removed {
            info!(resume_id = %id, "resume removed");
        }
        removed
    }

    pub fn set_job_description(&self, file: SelectedFile) -> Result<(), WorkflowError> {
        if !file.is_pdf() {
            let err = WorkflowError::InvalidFileType(file.name);
            warn!(code = err.code(), "{err}");
            return Err(err);
        }
        info!(filename = %file.name, "job description selected");
        self.lock_state().replace_job_description(file);
        Ok(())
    }

    pub fn clear_job_description(&self) {
        self.lock_state().clear_job_description();
        info!("job description cleared");
    }

    /// Submits the job description and replaces `results` with the service's ranking.
    pub async fn rank_resumes(&self) -> Result<RankOutcome, WorkflowError> {
        // Uploads still being written into the pending list finish first.
        let batch = self.upload_gate.lock().await;

        let started = {
            let mut state = self.lock_state();
            let jd_file = state
                .job_description
                .as_ref()
                .map(|jd| jd.source_file.clone())
                .ok_or(WorkflowError::MissingJobDescription);
            match jd_file {
                Err(err) => Err(err),
                Ok(_) if state.pending_resumes.is_empty() => Err(WorkflowError::NoResumes),
                Ok(jd_file) => {
                    state.rank_token += 1;
                    state.ranking_in_progress = true;
                    state.replace_results(Vec::new());
                    state.clear_extracted_text();
                    let ids: Vec<String> =
                        state.pending_resumes.iter().map(|r| r.id.clone()).collect();
                    Ok((state.rank_token, state.jd_epoch, jd_file, ids))
                }
            }
        };
        drop(batch);

        let (token, jd_epoch, jd_file, resume_ids) = started.map_err(|err| {
            warn!(code = err.code(), "{err}");
            err
        })?;

        info!(resumes = resume_ids.len(), token, "ranking resumes");
        let response = self.service.rank_resumes(&jd_file, &resume_ids).await;

        let mut state = self.lock_state();
        if state.rank_token != token {
            debug!(token, latest = state.rank_token, "dropping superseded ranking response");
            return Ok(RankOutcome::Superseded);
        }
        state.ranking_in_progress = false;

        match response {
            Ok(body) => {
                let results: Vec<RankedResult> =
                    body.ranked_resumes.into_iter().map(RankedResult::from).collect();
                let count = results.len();
                state.replace_results(results);
                if !state.set_extracted_text(jd_epoch, body.job_description_text) {
                    warn!("job description changed during ranking; extracted text dropped");
                }
                info!(count, "resumes ranked");
                Ok(RankOutcome::Ranked { count })
            }
            Err(e) => {
                let err = WorkflowError::RankingFailed(e.user_message(RANK_FALLBACK));
                error!(code = err.code(), "ranking failed: {e}");
                Err(err)
            }
        }
    }

    /// Asks the service for feedback on one ranked resume. At most one request
    /// per resume is in flight; a repeat call while one is pending is dropped.
    pub async fn request_feedback(&self, resume_id: &str) -> Result<FeedbackOutcome, WorkflowError> {
        let inputs = {
            let mut state = self.lock_state();
            if state.is_feedback_in_progress(resume_id) {
                None
            } else {
                let jd_text = state
                    .extracted_text()
                    .map(str::to_string)
                    .ok_or(WorkflowError::MissingJobDescriptionText);
                let resume_text = state
                    .result(resume_id)
                    .map(|r| r.full_text.clone())
                    .ok_or_else(|| WorkflowError::FeedbackFailed {
                        resume_id: resume_id.to_string(),
                        message: "resume is not among the ranked results".to_string(),
                    });
                let inputs = jd_text.and_then(|jd| resume_text.map(|resume| (resume, jd)));
                if inputs.is_ok() {
                    state.feedback_in_progress.insert(resume_id.to_string());
                }
                Some(inputs)
            }
        };

        let (resume_text, jd_text) = match inputs {
            None => {
                debug!(resume_id, "feedback already in flight");
                return Ok(FeedbackOutcome::AlreadyInFlight);
            }
            Some(Err(err)) => {
                warn!(code = err.code(), resume_id, "{err}");
                return Err(err);
            }
            Some(Ok(inputs)) => inputs,
        };

        let response = self.service.llm_feedback(&resume_text, &jd_text).await;

        let mut state = self.lock_state();
        state.feedback_in_progress.remove(resume_id);
        match response {
            Ok(feedback) => {
                let attached = state.update_result(resume_id, |r| {
                    r.feedback = Some(feedback);
                    r.feedback_visible = true;
                });
                if !attached {
                    warn!(resume_id, "results replaced while feedback was generated");
                }
                info!(resume_id, "feedback generated");
                Ok(FeedbackOutcome::Generated)
            }
            Err(e) => {
                let err = WorkflowError::FeedbackFailed {
                    resume_id: resume_id.to_string(),
                    message: e.user_message(FEEDBACK_FALLBACK),
                };
                error!(code = err.code(), resume_id, "feedback failed: {e}");
                Err(err)
            }
        }
    }

    /// Flips whether a result's feedback is shown. `None` for an unknown id.
    pub fn toggle_feedback_visibility(&self, resume_id: &str) -> Option<bool> {
        let mut state = self.lock_state();
        let mut visible = None;
        state.update_result(resume_id, |r| {
            r.feedback_visible = !r.feedback_visible;
            visible = Some(r.feedback_visible);
        });
        visible
    }

    pub fn export_feedback(&self, resume_id: &str) -> Result<FeedbackExport, WorkflowError> {
        let state = self.lock_state();
        state
            .result(resume_id)
            .and_then(FeedbackExport::for_result)
            .ok_or_else(|| {
                let err = WorkflowError::NothingToExport(resume_id.to_string());
                warn!(code = err.code(), "{err}");
                err
            })
    }
}
