mod config;
mod errors;
mod models;
mod ranking_client;
mod shell;
mod view;
mod workflow;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::models::file::SelectedFile;
use crate::ranking_client::{HttpRankingClient, RankingService};
use crate::view::notice::Notice;
use crate::view::progress::ProgressIndicator;
use crate::view::render::{render_inputs, render_results};
use crate::view::{DisplayOptions, Theme};
use crate::workflow::controller::{FeedbackOutcome, RankOutcome, RankingWorkflow};

/// Upload resumes and a job description to a Ranking Service, then review
/// the ranking and per-resume feedback.
#[derive(Parser)]
#[command(name = "ranker", version)]
struct Cli {
    /// Ranking Service base URL.
    #[arg(long, global = true, env = "RANKER_BACKEND_URL")]
    backend_url: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = Theme::Light)]
    theme: Theme,

    /// Show step descriptions under the progress indicator.
    #[arg(long, global = true)]
    details: bool,

    /// Maximum snippet length in characters.
    #[arg(long, global = true, default_value_t = 160)]
    snippet_width: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank resumes against one job description and exit.
    Run(RunArgs),
    /// Start an interactive session.
    Shell,
}

#[derive(Args)]
struct RunArgs {
    /// Job description PDF.
    #[arg(long)]
    jd: PathBuf,

    /// Resume PDFs, uploaded in this order.
    #[arg(required = true)]
    resumes: Vec<PathBuf>,

    /// Request feedback for the top N ranked resumes.
    #[arg(long, default_value_t = 0)]
    feedback: usize,

    /// Save each generated feedback as feedback_<name>.txt in this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Print the ranked results as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = &cli.backend_url {
        config = config.with_backend_url(url);
    }

    // Logs go to stderr; stdout carries notices and results.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting ranker v{} (service: {})",
        env!("CARGO_PKG_VERSION"),
        config.backend_url
    );

    let client = HttpRankingClient::new(&config)?;
    let workflow = RankingWorkflow::new(client);

    let options = DisplayOptions {
        theme: cli.theme,
        show_details: cli.details,
        snippet_width: cli.snippet_width,
    };

    match cli.command {
        Commands::Run(args) => run_session(&workflow, &options, args).await,
        Commands::Shell => shell::run(&workflow, &options).await,
    }
}

/// One pass through the workflow: select, upload, rank, optionally review.
async fn run_session<S: RankingService>(
    workflow: &RankingWorkflow<S>,
    options: &DisplayOptions,
    args: RunArgs,
) -> Result<()> {
    let jd = SelectedFile::from_path(&args.jd).await?;
    let jd_name = jd.name.clone();
    workflow.set_job_description(jd)?;
    print_notice(&Notice::success(format!(
        "Job Description \"{jd_name}\" selected."
    )));

    let mut files = Vec::with_capacity(args.resumes.len());
    for path in &args.resumes {
        match SelectedFile::from_path(path).await {
            Ok(file) => files.push(file),
            Err(e) => {
                warn!("skipping {}: {e:#}", path.display());
                print_notice(&Notice::error(format!("{e:#}")));
            }
        }
    }
    let report = workflow.add_resume_files(files).await;
    for notice in Notice::for_upload(&report) {
        print_notice(&notice);
    }

    if let RankOutcome::Ranked { count } = workflow.rank_resumes().await? {
        print_notice(&Notice::ranked(count));
    }

    let top: Vec<String> = workflow
        .snapshot()
        .results
        .iter()
        .take(args.feedback)
        .map(|r| r.resume_id.clone())
        .collect();
    for resume_id in &top {
        match workflow.request_feedback(resume_id).await {
            Ok(FeedbackOutcome::Generated) => {
                print_notice(&Notice::success("LLM feedback generated!"))
            }
            Ok(FeedbackOutcome::AlreadyInFlight) => {}
            Err(err) => {
                print_notice(&Notice::from(&err));
                continue;
            }
        }

        if let Some(dir) = &args.export_dir {
            match workflow.export_feedback(resume_id) {
                Ok(export) => print_notice(&Notice::for_export(&export.write_to(dir))),
                Err(err) => print_notice(&Notice::from(&err)),
            }
        }
    }

    let snapshot = workflow.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot.results)?);
        return Ok(());
    }

    println!("{}", ProgressIndicator::from_state(&snapshot).render(options));
    println!("{}", render_inputs(&snapshot));
    println!("{}", render_results(&snapshot, options));
    Ok(())
}

fn print_notice(notice: &Notice) {
    println!("{notice}");
}
