mod config;
mod render;
mod terminal_output;

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use media::ImageCapture;
use rxlens_assistant::{OpenAiAssistant, Orchestrator};
use rxlens_core::AnalysisSession;

use config::Config;

#[derive(Parser)]
#[command(name = "rxlens")]
#[command(about = "RxLens — prescription photo analysis via a hosted assistant")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a prescription image and show the extracted medicines
    Analyze {
        /// Path to the captured image, or a browser-exported data: URI
        image: String,

        /// Follow-up questions to ask after the analysis, in order
        #[arg(short, long)]
        question: Vec<String>,

        /// Print the parsed prescription as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Keep reading follow-up questions from stdin after the analysis
        #[arg(short, long)]
        interactive: bool,
    },
    /// Check configuration without calling the hosted service
    Doctor,
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    logging::init_logger(config.log_dir.as_deref(), &config.log_level);

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Analyze {
            image,
            question,
            json,
            interactive,
        } => run_analyze(&config, &image, question, json, interactive).await,
        Commands::Doctor => run_doctor(&config),
    };

    // Workflow failures surface as a single human-readable message; there is
    // no automatic retry — the user starts over with a fresh capture.
    if let Err(e) = result {
        terminal_output::note_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run_analyze(
    config: &Config,
    image: &str,
    questions: Vec<String>,
    as_json: bool,
    interactive: bool,
) -> Result<()> {
    let (api_key, assistant_id) = config.require_credentials()?;

    let capture = if image.starts_with("data:") {
        ImageCapture::from_data_uri(image)?
    } else {
        ImageCapture::from_path(Path::new(image)).await?
    };

    let service = Arc::new(OpenAiAssistant::new(api_key).with_base_url(&config.api_base));
    let orchestrator =
        Orchestrator::new(service, assistant_id).with_poll_policy(config.poll_policy());

    let mut session = capture.begin_session();
    info!(session = %session.id, source = %session.image_name, "Starting analysis");
    terminal_output::note_info("Analyzing prescription…");

    let prescription = orchestrator.analyze(&mut session).await?;
    terminal_output::note_success(&format!(
        "Extracted {} medicine(s)",
        prescription.medicines.len()
    ));

    if as_json {
        println!("{}", serde_json::to_string_pretty(&prescription)?);
    } else {
        print!("{}", render::prescription_table(&prescription));
    }

    for question in &questions {
        ask_and_render(&orchestrator, &mut session, question).await;
    }

    if interactive {
        interactive_loop(&orchestrator, &mut session).await?;
    }

    Ok(())
}

/// Follow-up failures degrade to an inline message in the answer area; they
/// never tear down the session.
async fn ask_and_render(orchestrator: &Orchestrator, session: &mut AnalysisSession, question: &str) {
    println!();
    terminal_output::note_info(&format!("Q: {question}"));
    match orchestrator.ask_follow_up(session, question).await {
        Ok(answer) => print!("{}", render::answer_panel(&answer)),
        Err(e) => println!("  (no answer: {e})"),
    }
}

async fn interactive_loop(orchestrator: &Orchestrator, session: &mut AnalysisSession) -> Result<()> {
    println!();
    terminal_output::note_info("Ask about your prescription (empty line to quit)");

    let stdin = std::io::stdin();
    loop {
        print!("? ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            break;
        }

        // One outstanding workflow at a time: the next question is not read
        // until this one has an answer.
        ask_and_render(orchestrator, session, question).await;
    }
    Ok(())
}

fn run_doctor(config: &Config) -> Result<()> {
    let checks = [
        ("OPENAI_API_KEY", config.api_key.is_some(), true),
        ("RXLENS_ASSISTANT_ID", config.assistant_id.is_some(), true),
        ("RXLENS_LOG_DIR", config.log_dir.is_some(), false),
    ];

    for (name, set, required) in checks {
        match (set, required) {
            (true, _) => terminal_output::note_success(&format!("{name} is set")),
            (false, true) => terminal_output::note_error(&format!("{name} is not set")),
            (false, false) => terminal_output::note_warn(&format!("{name} is not set (optional)")),
        }
    }

    terminal_output::note_info(&format!("API base: {}", config.api_base));
    terminal_output::note_info(&format!(
        "Polling: every {} ms, up to {} attempts",
        config.poll_interval_ms, config.poll_max_attempts
    ));

    if config.api_key.is_none() || config.assistant_id.is_none() {
        anyhow::bail!("configuration incomplete");
    }
    Ok(())
}
