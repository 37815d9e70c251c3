//! Interactive session: one command per line against a single workflow.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::models::file::SelectedFile;
use crate::ranking_client::RankingService;
use crate::view::notice::Notice;
use crate::view::progress::ProgressIndicator;
use crate::view::render::{render_inputs, render_results};
use crate::view::DisplayOptions;
use crate::workflow::controller::{FeedbackOutcome, RankOutcome, RankingWorkflow};
use crate::workflow::state::WorkflowState;

const HELP: &str = "\
Commands:
  jd <file.pdf>             select the job description
  clear-jd                  clear the job description
  add <file.pdf>...         upload resumes
  remove <resume-id>        drop a pending resume
  rank                      rank pending resumes against the job description
  feedback <#|resume-id>    generate feedback for a ranked resume
  toggle <#|resume-id>      show or hide a resume's feedback
  export <#|resume-id> [dir]  save feedback as a text file (default dir: .)
  show                      print the session
  help                      this text
  quit                      leave";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    SetJobDescription(PathBuf),
    ClearJobDescription,
    AddResumes(Vec<PathBuf>),
    RemoveResume(String),
    Rank,
    Feedback(String),
    Toggle(String),
    Export { target: String, dir: PathBuf },
    Show,
    Help,
    Quit,
}

/// Parses one input line. `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let one = |what: &str| -> Result<String, String> {
        match args.as_slice() {
            [arg] => Ok(arg.to_string()),
            _ => Err(format!("usage: {verb} <{what}>")),
        }
    };

    let command = match verb {
        "jd" => ShellCommand::SetJobDescription(PathBuf::from(one("file.pdf")?)),
        "clear-jd" => ShellCommand::ClearJobDescription,
        "add" if !args.is_empty() => {
            ShellCommand::AddResumes(args.iter().map(PathBuf::from).collect())
        }
        "add" => return Err("usage: add <file.pdf>...".to_string()),
        "remove" => ShellCommand::RemoveResume(one("resume-id")?),
        "rank" => ShellCommand::Rank,
        "feedback" => ShellCommand::Feedback(one("#|resume-id")?),
        "toggle" => ShellCommand::Toggle(one("#|resume-id")?),
        "export" => match args.as_slice() {
            [target] => ShellCommand::Export {
                target: target.to_string(),
                dir: PathBuf::from("."),
            },
            [target, dir] => ShellCommand::Export {
                target: target.to_string(),
                dir: PathBuf::from(dir),
            },
            _ => return Err("usage: export <#|resume-id> [dir]".to_string()),
        },
        "show" | "ls" => ShellCommand::Show,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

/// A 1-based rank position resolves to that result's id; anything else is taken as an id.
pub fn resolve_target(state: &WorkflowState, target: &str) -> String {
    target
        .parse::<usize>()
        .ok()
        .and_then(|pos| pos.checked_sub(1))
        .and_then(|idx| state.results.get(idx))
        .map(|r| r.resume_id.clone())
        .unwrap_or_else(|| target.to_string())
}

pub async fn run<S: RankingService>(
    workflow: &RankingWorkflow<S>,
    options: &DisplayOptions,
) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(b"Resume ranker. Type 'help' for commands.\n").await?;
    loop {
        stdout.write_all(b"ranker> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };
        debug!(?command, "shell command");

        if command == ShellCommand::Quit {
            break;
        }
        for notice in execute(workflow, options, command).await {
            println!("{notice}");
        }
    }
    Ok(())
}

async fn execute<S: RankingService>(
    workflow: &RankingWorkflow<S>,
    options: &DisplayOptions,
    command: ShellCommand,
) -> Vec<Notice> {
    match command {
        ShellCommand::SetJobDescription(path) => {
            let file = match read_file(&path).await {
                Ok(file) => file,
                Err(notice) => return vec![notice],
            };
            let name = file.name.clone();
            match workflow.set_job_description(file) {
                Ok(()) => vec![Notice::success(format!("Job Description \"{name}\" selected."))],
                Err(err) => vec![Notice::from(&err)],
            }
        }
        ShellCommand::ClearJobDescription => {
            workflow.clear_job_description();
            vec![Notice::info("Job Description cleared.")]
        }
        ShellCommand::AddResumes(paths) => {
            let mut notices = Vec::new();
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                match read_file(path).await {
                    Ok(file) => files.push(file),
                    Err(notice) => notices.push(notice),
                }
            }
            let report = workflow.add_resume_files(files).await;
            notices.extend(Notice::for_upload(&report));
            notices
        }
        ShellCommand::RemoveResume(id) => {
            if workflow.remove_resume(&id) {
                vec![Notice::info("Resume removed.")]
            } else {
                vec![Notice::info(format!("No pending resume with id \"{id}\"."))]
            }
        }
        ShellCommand::Rank => match workflow.rank_resumes().await {
            Ok(RankOutcome::Ranked { count }) => {
                println!("{}", render_results(&workflow.snapshot(), options));
                vec![Notice::ranked(count)]
            }
            Ok(RankOutcome::Superseded) => Vec::new(),
            Err(err) => vec![Notice::from(&err)],
        },
        ShellCommand::Feedback(target) => {
            let id = resolve_target(&workflow.snapshot(), &target);
            match workflow.request_feedback(&id).await {
                Ok(FeedbackOutcome::Generated) => {
                    println!("{}", render_results(&workflow.snapshot(), options));
                    vec![Notice::success("LLM feedback generated!")]
                }
                Ok(FeedbackOutcome::AlreadyInFlight) => {
                    vec![Notice::info("Feedback is already being generated.")]
                }
                Err(err) => vec![Notice::from(&err)],
            }
        }
        ShellCommand::Toggle(target) => {
            let id = resolve_target(&workflow.snapshot(), &target);
            match workflow.toggle_feedback_visibility(&id) {
                Some(true) => vec![Notice::info("Feedback shown.")],
                Some(false) => vec![Notice::info("Feedback hidden.")],
                None => Vec::new(),
            }
        }
        ShellCommand::Export { target, dir } => {
            let id = resolve_target(&workflow.snapshot(), &target);
            match workflow.export_feedback(&id) {
                Ok(export) => vec![Notice::for_export(&export.write_to(&dir))],
                Err(err) => vec![Notice::from(&err)],
            }
        }
        ShellCommand::Show => {
            let snapshot = workflow.snapshot();
            println!("{}", ProgressIndicator::from_state(&snapshot).render(options));
            println!("{}", render_inputs(&snapshot));
            println!("{}", render_results(&snapshot, options));
            Vec::new()
        }
        ShellCommand::Help => {
            println!("{HELP}");
            Vec::new()
        }
        ShellCommand::Quit => Vec::new(),
    }
}

async fn read_file(path: &Path) -> Result<SelectedFile, Notice> {
    SelectedFile::from_path(path).await.map_err(|e| Notice::error(format!("{e:#}")))
}
