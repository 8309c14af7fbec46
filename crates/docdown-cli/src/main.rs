//! docdown CLI - convert a saved API documentation page to Markdown.
//!
//! Reads HTML from a file (or stdin), runs it through the docdown pipeline
//! and prints the Markdown, or writes it to a file.

mod error;

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use docdown::{ConvertOptions, DocumentConverter, HeadingStyle};
use error::CliError;

/// File name used by `--download`.
const DOWNLOAD_FILE_NAME: &str = "api-documentation.md";

/// Convert an API documentation page to Markdown.
#[derive(Parser, Debug)]
#[command(name = "docdown", version, about)]
struct Cli {
    /// HTML file to convert. Reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// URL the page was fetched from; relative links resolve against it.
    #[arg(short, long, env = "DOCDOWN_BASE_URL")]
    base_url: String,

    /// Write the Markdown to this file instead of stdout.
    #[arg(short, long, conflicts_with = "download")]
    output: Option<PathBuf>,

    /// Write the Markdown to `api-documentation.md` in the current directory.
    #[arg(long)]
    download: bool,

    /// Reject results shorter than this many characters.
    #[arg(long, default_value_t = 100)]
    min_length: usize,

    /// Underline h1/h2 headings instead of prefixing them with `#`.
    #[arg(long)]
    setext: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            heading_style: if self.setext {
                HeadingStyle::Setext
            } else {
                HeadingStyle::Atx
            },
            min_content_length: self.min_length,
            ..Default::default()
        }
    }

    fn destination(&self) -> Option<PathBuf> {
        if self.download {
            Some(PathBuf::from(DOWNLOAD_FILE_NAME))
        } else {
            self.output.clone()
        }
    }

    fn read_input(&self) -> Result<String, CliError> {
        match &self.input {
            Some(path) if path.as_os_str() != "-" => {
                fs::read_to_string(path).map_err(|source| CliError::Read {
                    path: path.clone(),
                    source,
                })
            }
            _ => {
                let mut html = String::new();
                io::stdin().read_to_string(&mut html)?;
                Ok(html)
            }
        }
    }

    fn execute(&self) -> Result<(), CliError> {
        let html = self.read_input()?;
        let converter = DocumentConverter::with_options(self.options());
        let markdown = converter.convert(&html, &self.base_url)?;

        match self.destination() {
            Some(path) => {
                fs::write(&path, format!("{markdown}\n")).map_err(|source| CliError::Write {
                    path: path.clone(),
                    source,
                })?;
                tracing::info!(
                    path = %path.display(),
                    chars = markdown.chars().count(),
                    "wrote markdown"
                );
            }
            None => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{markdown}")?;
            }
        }
        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(err) = cli.execute() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
