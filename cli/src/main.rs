//! pdfoutline CLI - infer title and heading outlines from PDF files

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::engine::Verdict;
use pdfoutline::{
    discover_pdfs, render, BatchProcessor, BatchReport, DetectionOptions, FileOutcome,
    FileStatus, JsonFormat, OutlineEngine, Outliner, ParseOptions, PdfParser,
};

/// Default output directory for batch runs.
const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Infer a PDF's title and H1-H3 outline from its typography", long_about = None)]
struct Cli {
    /// Input PDF file or directory of PDFs
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (single PDF) or directory (batch)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every command.
#[derive(Args, Clone)]
struct Settings {
    /// Detection options as JSON
    #[arg(long, global = true, value_name = "FILE", env = "PDFOUTLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Font size tolerance in points
    #[arg(long, global = true, value_name = "POINTS")]
    size_tolerance: Option<f32>,

    /// Maximum heading length in characters
    #[arg(long, global = true, value_name = "CHARS")]
    max_heading_chars: Option<usize>,

    /// Write compact JSON
    #[arg(long, global = true)]
    compact: bool,

    /// Process batch files one at a time
    #[arg(long, global = true)]
    sequential: bool,

    /// Fail on the first page that cannot be extracted
    #[arg(long, global = true)]
    strict: bool,
}

impl Settings {
    fn detection(&self) -> Result<DetectionOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.config {
            Some(path) => DetectionOptions::from_json_file(path)?,
            None => DetectionOptions::default(),
        };
        if let Some(points) = self.size_tolerance {
            options = options.with_size_tolerance(points);
        }
        if let Some(chars) = self.max_heading_chars {
            options = options.with_max_heading_chars(chars);
        }
        options.validate()?;
        Ok(options)
    }

    fn parse_options(&self) -> ParseOptions {
        if self.strict {
            ParseOptions::new()
        } else {
            ParseOptions::new().lenient()
        }
    }

    fn format(&self) -> JsonFormat {
        if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the outline of one PDF as JSON
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Outline every PDF of a directory
    Batch {
        /// Directory containing PDF files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Directory receiving one JSON file per PDF
        #[arg(value_name = "OUTPUT_DIR")]
        output: PathBuf,
    },

    /// Dump the styled text fragments of one PDF as JSON
    Fragments {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show how the outline of one PDF was inferred
    Explain {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let settings = cli.settings;

    let result = match cli.command {
        Some(Commands::Outline { input, output }) => {
            cmd_outline(&input, output.as_deref(), &settings)
        }
        Some(Commands::Batch { input, output }) => cmd_batch(&input, &output, &settings),
        Some(Commands::Fragments { input, output }) => {
            cmd_fragments(&input, output.as_deref(), &settings)
        }
        Some(Commands::Explain { input }) => cmd_explain(&input, &settings),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => match cli.input {
            Some(input) if input.is_dir() => {
                let output = cli
                    .output
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
                cmd_batch(&input, &output, &settings)
            }
            Some(input) => cmd_outline(&input, cli.output.as_deref(), &settings),
            None => {
                println!("{}", "Usage: pdfoutline <INPUT> [OUTPUT]".yellow());
                println!("       pdfoutline --help for more information");
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_outline(
    input: &Path,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = Outliner::new()
        .with_parse_options(settings.parse_options())
        .with_detection(settings.detection()?)
        .parse(input)?;
    let json = result.to_json(settings.format())?;
    write_or_print(output, &json)
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.is_dir() {
        return Err(format!("{} is not a directory", input.display()).into());
    }

    let total = discover_pdfs(input)?.len();
    if total == 0 {
        println!("{} {}", "No PDF files found in".yellow(), input.display());
        return Ok(());
    }

    let pb = Arc::new(ProgressBar::new(total as u64));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let progress = Arc::clone(&pb);
    let mut processor = BatchProcessor::new()
        .with_detection(settings.detection()?)
        .with_parse_options(settings.parse_options())
        .with_format(settings.format())
        .with_progress(move |outcome: &FileOutcome| {
            let name = outcome
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress.set_message(name);
            progress.inc(1);
        });
    if settings.sequential {
        processor = processor.sequential();
    }

    let report = processor.process_directory(input, output)?;
    pb.finish_with_message("Done!");

    print_report(&report, output);
    Ok(())
}

fn print_report(report: &BatchReport, output: &Path) {
    println!();
    println!("{}", "Batch Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for outcome in &report.outcomes {
        let name = outcome
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match &outcome.status {
            FileStatus::Outlined { title, headings } => {
                let title = if title.is_empty() {
                    "(no title)".dimmed().to_string()
                } else {
                    title.clone()
                };
                println!(
                    "  {} {}: {} ({} headings)",
                    "✓".green(),
                    name.bold(),
                    title,
                    headings
                );
            }
            FileStatus::NoText => {
                println!("  {} {}: {}", "-".yellow(), name.bold(), "no text".yellow());
            }
            FileStatus::Failed(error) => {
                println!("  {} {}: {}", "✗".red(), name.bold(), error.red());
            }
        }
    }

    println!();
    println!(
        "{} {} outlined, {} without text, {} failed in {:.2?}",
        "Done!".green().bold(),
        report.succeeded(),
        report.no_text(),
        report.failed(),
        report.elapsed
    );
    println!("{} {}", "Output:".bold(), output.display());
}

fn cmd_fragments(
    input: &Path,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let parser = PdfParser::open_with_options(input, settings.parse_options())?;
    let document = parser.extract()?;
    let json = render::fragments_to_json(&document, settings.format())?;
    write_or_print(output, &json)
}

fn cmd_explain(input: &Path, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let engine = OutlineEngine::new(settings.detection()?)?;
    let parser = PdfParser::open_with_options(input, settings.parse_options())?;
    let document = parser.extract()?;
    let analysis = engine.analyze(&document)?;

    println!("{}", "Document".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), parser.version());
    println!("{}: {}", "Pages".bold(), document.page_count);
    println!("{}: {}", "Fragments".bold(), document.fragments.len());

    println!();
    println!("{}", "Typography".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {:.1}pt", "Body size".bold(), analysis.profile.body_size());
    let ladder = analysis.profile.ladder();
    if ladder.is_empty() {
        println!("{}: {}", "Ladder".bold(), "(none)".dimmed());
    }
    for (rank, cluster) in ladder.clusters().iter().enumerate() {
        println!(
            "{}: H{} {:.1}pt ({} fragments)",
            "Ladder".bold(),
            rank + 1,
            cluster.size(),
            cluster.fragments
        );
    }
    match &analysis.title {
        Some(title) => println!(
            "{}: {} ({:.1}pt)",
            "Title".bold(),
            title.text,
            title.font_size
        ),
        None => println!("{}: {}", "Title".bold(), "(none)".dimmed()),
    }

    println!();
    println!("{}", "Candidates".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    if analysis.candidates.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for candidate in &analysis.candidates {
        let verdict = match &candidate.verdict {
            Verdict::Accepted => "accepted".green().to_string(),
            Verdict::Rejected(reason) => format!("rejected: {}", reason).red().to_string(),
        };
        println!(
            "  {} p.{} {} [{}, confidence {:.2}]",
            candidate.level.to_string().bold(),
            candidate.fragment.page,
            candidate.fragment.text.trim(),
            verdict,
            candidate.confidence()
        );
    }

    let outline = analysis.outline();
    println!();
    println!(
        "{} {} of {} candidates accepted, {} headings after merging",
        "Result:".green().bold(),
        analysis.accepted(),
        analysis.candidates.len(),
        outline.headings().len()
    );
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF title and heading outline inference");
    println!();
    println!("License: MIT");
}
