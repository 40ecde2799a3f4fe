//! `quiz`: import raw certification exam dumps and manage per-cert progress.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use quiz_core::model::CertId;
use quiz_core::time::Clock;
use services::sessions::domain_counts;
use services::{ImportRequest, ImportService};
use storage::{CertPaths, ProgressError, ProgressStore, read_questions};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for quiz
#[derive(Parser, Debug)]
#[command(name = "quiz")]
#[command(about = "Certification practice question importer and progress tracker")]
#[command(version)]
struct Args {
    /// Directory holding raw inputs, question files and progress files
    #[arg(long, global = true, default_value = ".", env = "QUIZ_DATA_DIR")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse the raw question dump and solutions into `{cert}_questions.json`
    Import {
        #[arg(long, env = "QUIZ_CERT", value_parser = parse_cert)]
        cert: CertId,

        /// Raw question dump (default: questions_raw.txt in the data dir)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Raw solutions document (default: {CERT}-Solution.txt in the data dir)
        #[arg(long)]
        solutions: Option<PathBuf>,

        /// Question file to write (default: {cert}_questions.json in the data dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show progress for a certification
    Stats {
        #[arg(long, env = "QUIZ_CERT", value_parser = parse_cert)]
        cert: CertId,
    },

    /// Delete all recorded progress for a certification
    Reset {
        #[arg(long, env = "QUIZ_CERT", value_parser = parse_cert)]
        cert: CertId,

        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

fn parse_cert(raw: &str) -> Result<CertId, String> {
    raw.parse().map_err(|e| format!("{e}"))
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quiz=info,services=info,storage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Import {
            cert,
            input,
            solutions,
            output,
        } => import(&CertPaths::new(&args.data_dir, &cert), input, solutions, output),
        Command::Stats { cert } => stats(&CertPaths::new(&args.data_dir, &cert)),
        Command::Reset { cert, yes } => reset(&CertPaths::new(&args.data_dir, &cert), yes),
    }
}

fn import(
    paths: &CertPaths,
    input: Option<PathBuf>,
    solutions: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let defaults = ImportRequest::for_cert(paths);
    let request = ImportRequest {
        questions_path: input.unwrap_or(defaults.questions_path),
        solutions_path: solutions.unwrap_or(defaults.solutions_path),
        output_path: output.unwrap_or(defaults.output_path),
    };
    info!(cert = %paths.cert(), "importing {}", request.questions_path.display());

    let report = ImportService::new()
        .run(&request)
        .with_context(|| format!("import for {} failed", paths.cert().display_name()))?;

    println!(
        "{}: {} questions extracted, {} solutions, {} written to {} ({} warnings)",
        paths.cert().display_name(),
        report.extracted,
        report.solutions,
        report.written,
        request.output_path.display(),
        report.diagnostics.len(),
    );
    Ok(())
}

fn stats(paths: &CertPaths) -> Result<()> {
    let progress = ProgressStore::load(paths, Clock::system())
        .context("failed to load progress")?;
    let summary = progress.summary();

    println!("{}", paths.cert().display_name());
    let questions_file = paths.questions_file();
    if questions_file.exists() {
        let questions = read_questions(&questions_file).context("failed to load questions")?;
        let weak = questions
            .iter()
            .filter(|q| progress.entry(q.number()).is_some_and(|e| e.is_weak()))
            .count();
        println!("  questions:  {}", questions.len());
        println!("  weak spots: {weak}");
        for (domain, count) in domain_counts(&questions) {
            println!("    {domain:<12} {count}");
        }
    }

    println!("  seen:       {}", summary.seen);
    println!("  correct:    {}", summary.correct);
    println!("  incorrect:  {}", summary.incorrect);
    match summary.accuracy() {
        Some(accuracy) => println!("  accuracy:   {:.1}%", accuracy * 100.0),
        None => println!("  accuracy:   n/a"),
    }
    Ok(())
}

fn reset(paths: &CertPaths, yes: bool) -> Result<()> {
    if !yes {
        bail!(
            "refusing to reset {} progress without --yes",
            paths.cert().display_name()
        );
    }
    match ProgressStore::load(paths, Clock::system()) {
        Ok(mut progress) => progress.reset().context("failed to reset progress")?,
        Err(ProgressError::Corrupt { path, .. }) => {
            warn!(path = %path.display(), "discarding corrupt progress file");
            ProgressStore::discard(paths).context("failed to reset progress")?;
        }
        Err(err) => return Err(err).context("failed to load progress"),
    }
    println!("{} progress reset", paths.cert().display_name());
    Ok(())
}
