use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plainly::{
    config::{self, Config},
    extraction::ExtractionCoordinator,
    logging,
    processing::{ProcessingService, SectionKind, SubmitOutcome},
};

#[derive(Parser)]
#[command(
    name = "plainly-cli",
    about = "Summarize legal PDFs in plain language and ask questions about them"
)]
struct Cli {
    /// Emit debug logs on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract and summarize a document.
    Summarize {
        path: PathBuf,
        /// Print the full outcome as JSON instead of the summary text.
        #[arg(long)]
        json: bool,
    },
    /// Extract a document, then answer one question about it.
    Ask { path: PathBuf, question: String },
    /// Print the extracted text without contacting the generation service.
    Extract { path: PathBuf },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli_tracing(cli.verbose);
    if let Err(err) = run(cli.command).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    config::init_config();
    let config = config::get_config();
    match command {
        Command::Summarize { path, json } => {
            let outcome = summarize(config, &path).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_summary(&outcome);
            }
        }
        Command::Ask { path, question } => {
            let service = service(config)?;
            let outcome = submit(&service, &path).await?;
            let answer = service
                .ask(&question, Some(outcome.document_id))
                .await
                .context("Failed to answer question")?;
            println!("{}", answer.answer);
        }
        Command::Extract { path } => {
            let bytes = read_document(&path).await?;
            let extraction = ExtractionCoordinator::from_config(config)
                .extract(&bytes)
                .await
                .with_context(|| format!("Failed to extract text from {}", path.display()))?;
            tracing::info!(method = ?extraction.method, "Extracted text");
            println!("{}", extraction.text);
        }
    }
    Ok(())
}

fn service(config: &Config) -> Result<ProcessingService> {
    ProcessingService::from_config(config).context("Failed to initialize the text-generation client")
}

async fn summarize(config: &Config, path: &Path) -> Result<SubmitOutcome> {
    let service = service(config)?;
    submit(&service, path).await
}

async fn submit(service: &ProcessingService, path: &Path) -> Result<SubmitOutcome> {
    let bytes = read_document(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    service
        .submit_document(file_name, bytes)
        .await
        .with_context(|| format!("Failed to process {}", path.display()))
}

async fn read_document(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Print the parsed sections, or the raw summary when no section headers were recognized.
fn print_summary(outcome: &SubmitOutcome) {
    let sections = &outcome.sections;
    if sections.is_empty() {
        println!("{}", outcome.summary);
        return;
    }

    for kind in SectionKind::ALL {
        let body = match kind {
            SectionKind::Summary => sections.summary.clone(),
            SectionKind::KeyPoints => bullet_list(&sections.key_points),
            SectionKind::Risks => bullet_list(&sections.risks),
            SectionKind::Guidance => bullet_list(&sections.guidance),
        };
        if body.is_empty() {
            continue;
        }
        println!("{}\n{}\n", kind.header(), body);
    }
    if !sections.unsectioned.is_empty() {
        println!("{}", sections.unsectioned);
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
