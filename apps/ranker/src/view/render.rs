use crate::models::resume::RankedResult;
use crate::view::DisplayOptions;
use crate::workflow::state::WorkflowState;

/// The inputs side of the session: job description and pending resumes.
pub fn render_inputs(state: &WorkflowState) -> String {
    let mut out = match &state.job_description {
        Some(jd) => format!("Job description: {}\n", jd.source_file.name),
        None => "Job description: (none)\n".to_string(),
    };

    if state.upload_in_progress {
        out.push_str("Uploading resumes...\n");
    }
    out.push_str(&format!("Pending resumes ({}):", state.pending_resumes.len()));
    for resume in &state.pending_resumes {
        out.push_str(&format!("\n  - {} [{}]", resume.display_name, resume.id));
    }
    out.push_str(&format!("\nRank: {}", rank_status(state)));
    out
}

/// Whether the rank action is available, and what it is waiting on if not.
pub fn rank_status(state: &WorkflowState) -> &'static str {
    if state.can_rank() {
        "ready"
    } else if state.ranking_in_progress {
        "ranking in progress"
    } else if state.upload_in_progress {
        "waiting for uploads to finish"
    } else if state.job_description.is_none() {
        "select a job description first"
    } else {
        "add at least one resume first"
    }
}

/// Ranked results in service order. Scores are printed as the service sent them.
pub fn render_results(state: &WorkflowState, options: &DisplayOptions) -> String {
    if state.ranking_in_progress {
        return "Ranking resumes...".to_string();
    }
    if state.results.is_empty() {
        return "No ranked resumes yet.".to_string();
    }

    let mut out = String::from("Ranked resumes (lower score = stronger match)");
    for (idx, result) in state.results.iter().enumerate() {
        out.push('\n');
        out.push_str(options.theme.rule());
        out.push('\n');
        out.push_str(&render_result(idx + 1, result, state, options));
    }
    out
}

fn render_result(
    position: usize,
    result: &RankedResult,
    state: &WorkflowState,
    options: &DisplayOptions,
) -> String {
    let mut out = format!(
        "{position}. {}  score {:.4}  [{}]\n   {}",
        result.filename,
        result.score,
        result.resume_id,
        truncate(&result.snippet, options.snippet_width)
    );

    if state.is_feedback_in_progress(&result.resume_id) {
        out.push_str("\n   Generating feedback...");
    } else if let Some(feedback) = &result.feedback {
        if result.feedback_visible {
            out.push_str("\n   Feedback:");
            for line in feedback.lines() {
                out.push_str(&format!("\n     {line}"));
            }
        } else {
            out.push_str("\n   Feedback available (hidden)");
        }
    }
    out
}

/// Cuts `text` to at most `width` characters, marking the cut with "...".
pub fn truncate(text: &str, width: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}
