mod fetcher;
mod parser;
mod report;
mod settings;
mod text;

use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use parser::CategoryBoundary;
use report::Format;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "cashback_scraper",
    about = "Extract cash back reward offers from a rendered card page"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the page, extract rewards and print them
    Run {
        /// Page to scrape (default: CASHBACK_URL or the Blue Cash Everyday page)
        url: Option<String>,
        #[command(flatten)]
        fetch: FetchArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the page's flattened visible text without extracting
    Fetch {
        url: Option<String>,
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Extract rewards from previously captured flattened text
    Extract {
        /// Text file to read, or "-" for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct FetchArgs {
    /// Seconds to wait for client-side rendering
    #[arg(long)]
    settle_secs: Option<u64>,
    /// Poll until the page stops changing instead of a fixed wait
    #[arg(long)]
    poll: bool,
    /// Chrome/Chromium binary to launch
    #[arg(long)]
    chrome_path: Option<PathBuf>,
    /// Hide the progress spinner
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args)]
struct OutputArgs {
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Where a category label stops
    #[arg(long, value_enum)]
    category_boundary: Option<CategoryBoundary>,
}

impl FetchArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(secs) = self.settle_secs {
            settings.settle_secs = secs;
        }
        if self.poll {
            settings.poll = true;
        }
        if let Some(path) = &self.chrome_path {
            settings.chrome_path = Some(path.clone());
        }
    }
}

impl OutputArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(boundary) = self.category_boundary {
            settings.category_boundary = boundary;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    match cli.command {
        Commands::Run { url, fetch, output } => {
            fetch.apply(&mut settings);
            output.apply(&mut settings);
            let url = url.unwrap_or_else(|| settings.url.clone());

            let fetch_options = settings.fetch_options(!fetch.quiet);
            run_pipeline(
                &mut std::io::stdout().lock(),
                &url,
                &settings,
                output.format,
                |url| Ok(fetcher::fetch_page_text(url, &fetch_options)?),
            )?;
        }
        Commands::Fetch { url, fetch } => {
            fetch.apply(&mut settings);
            let url = url.unwrap_or_else(|| settings.url.clone());
            let raw_text = fetcher::fetch_page_text(&url, &settings.fetch_options(!fetch.quiet))?;
            println!("{}", raw_text);
        }
        Commands::Extract { input, output } => {
            output.apply(&mut settings);
            let raw_text = read_input(&input)?;
            let rewards = extract_rewards(&raw_text, &settings);
            report::render(&mut std::io::stdout().lock(), &rewards, output.format)?;
        }
    }

    info!("Done in {:.1}s", t0.elapsed().as_secs_f64());
    Ok(())
}

/// Fetch → extract → render, writing progress lines and the report to `out`.
fn run_pipeline(
    out: &mut impl Write,
    url: &str,
    settings: &Settings,
    format: Format,
    fetch: impl FnOnce(&str) -> Result<String>,
) -> Result<()> {
    announce(out, format, &format!("Scraping raw text from: {}", url))?;
    let raw_text = fetch(url)?;
    announce(out, format, "\nCleaning and extracting reward details...\n")?;
    let rewards = extract_rewards(&raw_text, settings);
    report::render(out, &rewards, format)
}

/// Progress lines go to stdout only next to the text report; JSON output
/// must stay a single parseable document.
fn announce(out: &mut impl Write, format: Format, line: &str) -> Result<()> {
    match format {
        Format::Text => writeln!(out, "{}", line)?,
        Format::Json => info!("{}", line.trim()),
    }
    Ok(())
}

fn extract_rewards(raw_text: &str, settings: &Settings) -> Vec<parser::RewardRecord> {
    match settings.category_boundary {
        CategoryBoundary::NextMarker => parser::extract(raw_text),
        CategoryBoundary::FirstDigit => parser::extract_with(raw_text, &settings.extract_options()),
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read text from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}

// ── Tests ──
