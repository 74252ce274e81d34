//! sheetview CLI - spreadsheet preview tool
//!
//! A command-line tool for showing the first sheet of an XLSX workbook as a table.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use sheetview::loader::BundledSource;
use sheetview::render::{render, JsonFormat, OutputFormat, RenderOptions};
use sheetview::session::{SelectedFile, UiState, UploadSession};
use sheetview::xlsx::OoxmlLibrary;
use sheetview::{HeaderMode, ReadHint, SpreadsheetLibrary};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Spreadsheet preview as text, Markdown, HTML, and JSON
#[derive(Parser)]
#[command(
    name = "sheetview",
    author = "iyulab",
    version,
    about = "Preview the first sheet of a spreadsheet",
    long_about = "sheetview - Spreadsheet preview tool.\n\n\
                  Reads the first sheet of an XLSX workbook, uses its first row as \
                  headers, and prints the remaining rows as a table."
)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the first sheet as a table
    Show {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: Format,

        /// Maximum number of rows to show
        #[arg(long)]
        max_rows: Option<usize>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// List the column headers of the first sheet
    Headers {
        /// Input file path
        input: PathBuf,
    },

    /// Show workbook information
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Output format
#[derive(Clone, ValueEnum)]
enum Format {
    /// Aligned plain text columns
    Text,
    /// Markdown pipe table
    Markdown,
    /// HTML table
    Html,
    /// JSON view object
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Markdown => OutputFormat::Markdown,
            Format::Html => OutputFormat::Html,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show {
            input,
            output,
            format,
            max_rows,
            compact,
        } => {
            let view = upload(&input).await?.view();

            let mut options = RenderOptions::new().with_format(format.into());
            if compact {
                options = options.with_json_format(JsonFormat::Compact);
            }
            if let Some(max) = max_rows {
                options = options.with_max_rows(max);
            }

            let rendered = render(&view, &options)?;
            write_output(output.as_ref(), &rendered)?;

            if let Some(path) = output {
                println!("{} Written to: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Headers { input } => {
            let state = upload(&input).await?.snapshot();

            for line in header_lines(&state) {
                println!("{}", line);
            }
        }

        Commands::Info { input } => {
            let pb = create_spinner("Analyzing workbook...");

            let data = fs::read(&input)?;
            let format = sheetview::detect_format_from_bytes(&data);
            let library = OoxmlLibrary::new();
            let workbook = library.read_workbook(&data, ReadHint::Sniff);

            pb.finish_and_clear();

            println!("{}", "Workbook Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "File".bold(), display_name(&input));
            if !sheetview::is_accepted_extension(&input) {
                println!(
                    "{} extension is not .xlsx or .xls",
                    "!".yellow().bold()
                );
            }
            match format {
                Ok(format) => println!(
                    "{}: {} (.{})",
                    "Format".bold(),
                    format,
                    format.extension()
                ),
                Err(e) => println!("{}: {}", "Format".bold(), e.to_string().red()),
            }

            let workbook = workbook?;
            println!("{}: {}", "Sheets".bold(), workbook.sheet_names.len());

            for name in &workbook.sheet_names {
                let Some(sheet) = workbook.sheets.get(name) else {
                    continue;
                };
                let json = library.sheet_to_json(sheet, HeaderMode::Array)?;
                let raw = sheetview::adapter::narrow_rows(json)?;
                let columns = raw.iter().map(Vec::len).max().unwrap_or(0);

                println!("\n{}", name.cyan().bold());
                println!("{}", "─".repeat(40));
                println!("{}: {}", "Rows".bold(), raw.len());
                println!("{}: {}", "Columns".bold(), columns);
                println!("{}: {}", "Cells".bold(), sheet.cell_count());
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Run one upload attempt for `input`.
///
/// Returns the session holding the outcome; a failed attempt is an error.
async fn upload(input: &Path) -> Result<UploadSession<BundledSource>, Box<dyn std::error::Error>> {
    if !sheetview::is_accepted_extension(input) {
        tracing::warn!(file = %input.display(), "unexpected file extension");
    }

    let pb = create_spinner(&format!("Loading {}...", display_name(input)));

    let session = UploadSession::with_defaults();
    let outcome = session
        .select(Some(SelectedFile::from_path(input)))
        .await;

    pb.finish_and_clear();
    outcome?;

    Ok(session)
}

/// Numbered header lines for a successful attempt, data rows or not.
fn header_lines(state: &UiState) -> Vec<String> {
    state
        .headers
        .iter()
        .enumerate()
        .map(|(i, header)| format!("{:>3}  {}", (i + 1).to_string().dimmed(), header))
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

fn print_version() {
    println!("{} {}", "sheetview".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Spreadsheet preview as text, Markdown, HTML, and JSON");
    println!();
    println!("Supported formats: XLSX");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
