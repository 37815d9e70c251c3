use crate::view::DisplayOptions;
use crate::workflow::state::WorkflowState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    SelectJobDescription,
    UploadResumes,
    Rank,
    ReviewFeedback,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 4] = [
        WorkflowStep::SelectJobDescription,
        WorkflowStep::UploadResumes,
        WorkflowStep::Rank,
        WorkflowStep::ReviewFeedback,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WorkflowStep::SelectJobDescription => "Job description",
            WorkflowStep::UploadResumes => "Resumes",
            WorkflowStep::Rank => "Rank",
            WorkflowStep::ReviewFeedback => "Feedback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepStatus {
    pub step: WorkflowStep,
    pub completed: bool,
    pub description: String,
    /// Percentage, only for steps that can be partially done.
    pub progress: Option<u8>,
}

/// Step indicator for the session: which steps are done and which one is current.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressIndicator {
    pub steps: Vec<StepStatus>,
    pub current: usize,
}

impl ProgressIndicator {
    pub fn from_state(state: &WorkflowState) -> Self {
        let steps: Vec<StepStatus> = WorkflowStep::ALL
            .iter()
            .map(|&step| step_status(step, state))
            .collect();
        let current = steps
            .iter()
            .position(|s| !s.completed)
            .unwrap_or(steps.len() - 1);
        Self { steps, current }
    }

    pub fn render(&self, options: &DisplayOptions) -> String {
        let line = self
            .steps
            .iter()
            .enumerate()
            .map(|(idx, status)| {
                let mark = if status.completed {
                    options.theme.done_mark()
                } else {
                    options.theme.todo_mark()
                };
                let label = status.step.label();
                if idx == self.current {
                    format!("{mark} *{label}*")
                } else {
                    format!("{mark} {label}")
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ");

        if !options.show_details {
            return line;
        }

        let mut out = line;
        for status in &self.steps {
            out.push_str(&format!("\n  {}: {}", status.step.label(), status.description));
            if let Some(pct) = status.progress {
                out.push_str(&format!(" ({pct}%)"));
            }
        }
        out
    }
}

fn step_status(step: WorkflowStep, state: &WorkflowState) -> StepStatus {
    match step {
        WorkflowStep::SelectJobDescription => {
            let description = match &state.job_description {
                Some(jd) => format!("selected {}", jd.source_file.name),
                None => "waiting for a PDF".to_string(),
            };
            StepStatus {
                step,
                completed: state.job_description.is_some(),
                description,
                progress: None,
            }
        }
        WorkflowStep::UploadResumes => {
            let count = state.pending_resumes.len();
            let description = if state.upload_in_progress {
                format!("uploading ({count} done)")
            } else {
                format!("{count} uploaded")
            };
            StepStatus {
                step,
                completed: count > 0 && !state.upload_in_progress,
                description,
                progress: None,
            }
        }
        WorkflowStep::Rank => {
            let description = if state.ranking_in_progress {
                "ranking...".to_string()
            } else if state.results.is_empty() {
                "not ranked yet".to_string()
            } else {
                format!("{} ranked", state.results.len())
            };
            StepStatus {
                step,
                completed: !state.results.is_empty(),
                description,
                progress: None,
            }
        }
        WorkflowStep::ReviewFeedback => {
            let total = state.results.len();
            let with_feedback = state.results.iter().filter(|r| r.feedback.is_some()).count();
            let progress = (total > 0).then(|| (with_feedback * 100 / total) as u8);
            StepStatus {
                step,
                completed: total > 0 && with_feedback == total,
                description: format!("{with_feedback} of {total} reviewed"),
                progress,
            }
        }
    }
}
