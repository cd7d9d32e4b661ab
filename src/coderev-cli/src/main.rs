//! coderev - AI-assisted code review from the command line.

mod ingest;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use coderev_llm::ScriptedInvoker;
use coderev_pipeline::{
    Approval, CodeState, FileReview, ProjectRequest, ReviewConfig, Reviewer,
};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Reply used for every stage when running with `--dry-run`.
const DRY_RUN_REPLY: &str = "[dry run] no model was called";

/// Review, refactor and explain code with a language model
#[derive(Parser)]
#[command(name = "coderev")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model name (overrides config and CODEREV_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory of prompt template overrides
    #[arg(long, global = true)]
    prompts_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Run the pipelines without calling a model
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse, review, refactor and suggest tests for one file
    File {
        path: PathBuf,

        /// Language tag passed along with the code
        #[arg(short, long)]
        language: Option<String>,

        /// Ask for approval of the refactored code
        #[arg(long)]
        approve: bool,

        /// Show a diff of the original against the refactored code
        #[arg(long)]
        diff: bool,
    },

    /// Review, explain or write interview questions for a project directory
    Project {
        dir: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Action::Review)]
        action: Action,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Action {
    Review,
    Explain,
    Interview,
}

impl From<Action> for ProjectRequest {
    fn from(action: Action) -> Self {
        match action {
            Action::Review => ProjectRequest::ProjectReview,
            Action::Explain => ProjectRequest::ProjectExplain,
            Action::Interview => ProjectRequest::Interview,
        }
    }
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(args: &Args) -> Result<ReviewConfig> {
    let mut config = ReviewConfig::discover(args.config.as_deref())?;
    if let Some(model) = &args.model {
        config.model.model = model.clone();
    }
    if let Some(url) = &args.base_url {
        config.model.base_url = url.clone();
    }
    if let Some(dir) = &args.prompts_dir {
        config.prompts_dir = Some(dir.clone());
    }
    Ok(config)
}

fn build_reviewer(config: &ReviewConfig, dry_run: bool) -> Result<Reviewer> {
    if dry_run {
        info!("Dry run: model calls are answered locally");
        let invoker = ScriptedInvoker::new().with_fallback(DRY_RUN_REPLY);
        let reviewer = Reviewer::with_max_steps(
            Arc::new(invoker),
            Arc::new(config.prompt_library()),
            config.max_steps,
        )?;
        return Ok(reviewer);
    }
    Reviewer::from_config(config).context("Failed to set up the model client")
}

async fn review_file(
    reviewer: &Reviewer,
    path: &Path,
    language: Option<String>,
    approve: bool,
    diff: bool,
    json: bool,
) -> Result<()> {
    let raw_code = ingest::read_source(path)?;
    info!(path = %path.display(), bytes = raw_code.len(), "reviewing file");

    let mut state = reviewer
        .review_file(CodeState::new(raw_code, language))
        .await
        .with_context(|| format!("Review of {} failed", path.display()))?;
    let review = FileReview::try_from(&state)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&review)?);
    } else {
        println!("{}", output::file_review_text(&review));
    }

    if diff {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let (inserted, deleted) = output::diff_stats(&state.raw_code, &review.refactored_code);
        debug!(inserted, deleted, "refactor diff");
        print!(
            "{}",
            output::unified_diff(&state.raw_code, &review.refactored_code, &name)
        );
    }

    if approve {
        let answer = output::ask_approval(std::io::stdin().lock(), std::io::stderr())?;
        match state.record_approval(&answer) {
            Approval::Approved => eprintln!("Refactored code approved."),
            Approval::Rejected => eprintln!("Refactored code rejected."),
        }
        info!(approval = ?state.user_approval, "approval recorded");
    }

    Ok(())
}

async fn review_project(
    reviewer: &Reviewer,
    dir: &Path,
    request: ProjectRequest,
    json: bool,
) -> Result<()> {
    let files = ingest::collect_project(dir)?;
    info!(dir = %dir.display(), files = files.len(), %request, "reviewing project");

    let report = reviewer
        .run_project_pipeline(files, request)
        .await
        .with_context(|| format!("{request} of {} failed", dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", output::project_report_text(&report));
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let reviewer = build_reviewer(&config, args.dry_run)?;

    match args.command {
        Command::File {
            path,
            language,
            approve,
            diff,
        } => review_file(&reviewer, &path, language, approve, diff, args.json).await,
        Command::Project { dir, action } => {
            review_project(&reviewer, &dir, action.into(), args.json).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    setup_logging(&args.log_level, args.json_logs);

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
