use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod simulate;

use simulate::{Pacing, Scenario, StepReport};

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Replay scroll scripts against a reveal page headlessly")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scroll through a page and report every section after each step
    Simulate {
        /// Page file or directory containing folio.toml (defaults to the portfolio page)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Scroll offsets to visit, in order
        #[arg(short, long, value_delimiter = ',', default_value = "0,600,400,900")]
        scroll: Vec<f32>,

        /// JSON scenario file with explicit steps (replaces --scroll)
        #[arg(long, conflicts_with = "scroll")]
        script: Option<PathBuf>,

        /// Press the scroll-to-top control after the last offset
        #[arg(long)]
        scroll_top: bool,

        /// Frame length in milliseconds
        #[arg(long, default_value_t = 16.0)]
        frame_ms: f32,

        /// Time simulated after each step in milliseconds
        #[arg(long, default_value_t = 1200)]
        settle_ms: u32,

        /// Print JSON snapshots instead of a text table
        #[arg(long)]
        json: bool,
    },
    /// Write the portfolio page to folio.toml
    Init {
        /// Target file or directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate a page file
    Check {
        /// Page file or directory containing folio.toml
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Print the portfolio page as TOML
    Show,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "folio=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config: page_file,
            scroll,
            script,
            scroll_top,
            frame_ms,
            settle_ms,
            json,
        } => {
            let page = config::load_page(page_file.as_deref())?;
            let steps = match script {
                Some(path) => Scenario::from_path(&path)?.steps,
                None => simulate::script(&scroll, scroll_top),
            };
            let reports = simulate::simulate(page, &steps, Pacing { frame_ms, settle_ms })?;
            print_reports(&reports, json)
        }
        Commands::Init { path, force } => {
            let written = config::write_default(&path, force)?;
            println!("Created {}", written.display());
            Ok(())
        }
        Commands::Check { path } => {
            let page = config::load_page(Some(path.as_path()))?;
            println!(
                "{}: {} sections, {} px tall",
                config::page_path(&path).display(),
                page.sections.len(),
                page.content_height()
            );
            Ok(())
        }
        Commands::Show => {
            print!("{}", config::default_toml()?);
            Ok(())
        }
    }
}

fn print_reports(reports: &[StepReport], json: bool) -> Result<()> {
    if json {
        for report in reports {
            println!("{}", serde_json::to_string(report)?);
        }
    } else {
        print!("{}", simulate::render_text(reports));
    }
    Ok(())
}
