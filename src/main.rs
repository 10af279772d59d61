use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use walkthrough::app::App;
use walkthrough::config::Config;
use walkthrough::logging;
use walkthrough::manual::{ManualFile, ValidationEntry};
use walkthrough::page::{HtmlPage, PageLayout};
use walkthrough::sequencer::StepSequencer;
use walkthrough::templates::TemplateRenderer;
use walkthrough::validation::{AckTimer, LogNotifier, SharedNotifier};

#[derive(Parser)]
#[command(name = "walkthrough")]
#[command(about = "Interactive step-by-step instruction manuals")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through a manual in the terminal
    Run {
        /// Manual file (.toml, .yaml, .yml or .json)
        manual: PathBuf,
    },

    /// Render a manual as a standalone HTML page
    Render {
        manual: PathBuf,

        /// Step shown as current (0-based)
        #[arg(short, long, default_value_t = 0)]
        step: usize,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a manual and list its steps
    Check { manual: PathBuf },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = matches!(cli.command, Commands::Run { .. });
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Commands::Run { manual } => {
            run_tui(config, &manual, logging_handle.log_file_path).await?;
        }
        Commands::Render {
            manual,
            step,
            output,
        } => {
            cmd_render(&config, &manual, step, output.as_deref())?;
        }
        Commands::Check { manual } => {
            cmd_check(&config, &manual)?;
        }
    }

    Ok(())
}

async fn run_tui(config: Config, manual: &Path, log_file_path: Option<PathBuf>) -> Result<()> {
    let manual = ManualFile::load(manual)?;
    let mut app = App::new(config, manual)?;
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

fn cmd_render(config: &Config, path: &Path, step: usize, output: Option<&Path>) -> Result<()> {
    let manual = ManualFile::load(path)?;
    let renderer = TemplateRenderer::new(manual.effective_labels(&config.labels)?)?;

    // Nothing is interactive here; checks only log
    let notifier: SharedNotifier = Rc::new(LogNotifier);
    let (ack_timer, _acks) = AckTimer::channel(config.ui.ack_delay());
    let built = manual.build(&renderer, &notifier, &ack_timer)?;

    let page = HtmlPage::build(built.meta, &built.steps, &renderer, PageLayout::default())?;
    let mut sequencer = StepSequencer::initialize(built.steps, page)?;
    sequencer
        .go_to(step)
        .with_context(|| format!("Cannot render step {step}"))?;

    let html = sequencer.hook().render_document(&renderer)?;
    match output {
        Some(file) => {
            std::fs::write(file, html)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            println!("Wrote {}", file.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}

fn cmd_check(config: &Config, path: &Path) -> Result<()> {
    let manual = ManualFile::load(path)?;
    let renderer = TemplateRenderer::new(manual.effective_labels(&config.labels)?)?;

    let summaries: Vec<String> = manual
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let content = match (&step.template, &step.markup) {
                (Some(name), _) => name.clone(),
                (None, Some(_)) => "markup".to_string(),
                (None, None) => "-".to_string(),
            };
            let validation = match &step.validation {
                Some(ValidationEntry::Command { .. }) => " (checks command)",
                Some(ValidationEntry::Input { .. }) => " (checks input)",
                None if step.flag("has_validation") => " (checks command)",
                None => "",
            };
            format!("{:>3}. {} [{content}]{validation}", i, step.title)
        })
        .collect();
    let title = manual.title.clone();

    let notifier: SharedNotifier = Rc::new(LogNotifier);
    let (ack_timer, _acks) = AckTimer::channel(config.ui.ack_delay());
    let built = manual.build(&renderer, &notifier, &ack_timer)?;

    // Render every step once so template data errors surface here
    for step in &built.steps {
        renderer
            .render_step(step)
            .with_context(|| format!("Step \"{}\" does not render", step.title))?;
    }

    println!("{title}");
    println!("{}", "─".repeat(60));
    for line in summaries {
        println!("{line}");
    }
    println!(
        "{} steps, {} input fields, {} checks",
        built.steps.len(),
        built.fields.len(),
        built.checks.len()
    );
    Ok(())
}
