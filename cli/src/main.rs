//! stepdoc CLI - procedure PDF conversion tool

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use stepdoc::{BatchEntry, Converter, ConversionOutcome, Error};

#[derive(Parser)]
#[command(name = "stepdoc")]
#[command(version)]
#[command(about = "Convert procedure PDFs to step JSON, screenshots, and HTML", long_about = None)]
struct Cli {
    /// Verbose output (conversion log echoed to stderr)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single procedure PDF
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Base name for output files (JSON, report, HTML, images dir)
        #[arg(value_name = "OUTPUT_NAME")]
        output_name: String,

        /// Skip HTML generation
        #[arg(long)]
        no_html: bool,
    },

    /// Convert every PDF matching a glob pattern
    Batch {
        /// File pattern for PDFs
        #[arg(long, default_value = "*.pdf")]
        pattern: String,

        /// Output file prefix
        #[arg(long, default_value = "converted")]
        prefix: String,

        /// Skip HTML generation
        #[arg(long)]
        no_html: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match cli.command {
        Commands::Convert {
            input,
            output_name,
            no_html,
        } => cmd_convert(&input, &output_name, no_html),
        Commands::Batch {
            pattern,
            prefix,
            no_html,
        } => cmd_batch(&pattern, &prefix, no_html),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_convert(input: &Path, output_name: &str, no_html: bool) -> Result<(), Error> {
    println!("{}", "Converting PDF to procedure JSON...".cyan());

    let mut converter = Converter::new(input, output_name);
    if no_html {
        converter = converter.without_html();
    }
    let outcome = converter.convert()?;

    print_summary(&outcome);
    Ok(())
}

fn print_summary(outcome: &ConversionOutcome) {
    println!("\n{}", "Conversion complete!".green().bold());

    println!("\n{}", "Output files:".bold());
    println!("  {} {}", "├─".dimmed(), outcome.json_path.display());
    println!("  {} {}", "├─".dimmed(), outcome.report_path.display());
    if let Some(html) = &outcome.html_path {
        println!("  {} {}", "├─".dimmed(), html.display());
    }
    println!(
        "  {} {}_images/",
        "└─".dimmed(),
        outcome.json_path.display().to_string().trim_end_matches(".json")
    );

    println!("\n{}", "Summary:".bold());
    println!("  Title:  {}", outcome.record.title);
    println!("  Steps:  {}", outcome.record.total_steps);
    println!("  Images: {}", outcome.record.total_images());

    let warnings = outcome.record.total_warnings() + outcome.validation.warnings.len();
    if warnings > 0 {
        println!(
            "  {} {} (see {})",
            "Warnings:".yellow(),
            warnings,
            outcome.report_path.display()
        );
    }
    if !outcome.validation.is_valid {
        println!(
            "  {} conversion has errors, see {}",
            "Invalid:".red().bold(),
            outcome.report_path.display()
        );
    }
}

fn cmd_batch(pattern: &str, prefix: &str, no_html: bool) -> Result<(), Error> {
    let paths: Vec<PathBuf> = glob::glob(pattern)
        .map_err(|e| Error::InvalidPattern(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .filter(|path| stepdoc::detect::is_pdf(path))
        .collect();

    if paths.is_empty() {
        println!("{}", "No PDF files found".yellow());
        return Ok(());
    }

    println!(
        "{} {} PDF files to convert",
        "Found".cyan().bold(),
        paths.len()
    );

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut entries = Vec::with_capacity(paths.len());
    for path in &paths {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        let output_name = format!("{}_{}", prefix, stem);
        pb.set_message(stem.clone());

        let mut converter = Converter::new(path, &output_name);
        if no_html {
            converter = converter.without_html();
        }

        // One bad document must not abort the batch.
        match converter.convert() {
            Ok(outcome) => {
                pb.println(format!(
                    "{} {} ({} steps)",
                    "✓".green(),
                    path.display(),
                    outcome.record.total_steps
                ));
                entries.push(BatchEntry {
                    source: path.display().to_string(),
                    title: outcome.record.title.clone(),
                    output_name,
                    total_steps: outcome.record.total_steps,
                    total_images: outcome.record.total_images(),
                    warnings: outcome.record.total_warnings(),
                    average_confidence: outcome.record.average_confidence(),
                    succeeded: true,
                });
            }
            Err(e) => {
                pb.println(format!("{} {}: {}", "✗".red(), path.display(), e));
                entries.push(BatchEntry::failed(path.display().to_string(), output_name));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let dashboard_path = format!("{}_dashboard.html", prefix);
    std::fs::write(
        &dashboard_path,
        stepdoc::render::dashboard::render_dashboard(&entries),
    )?;

    let successful = entries.iter().filter(|e| e.succeeded).count();
    let failed = entries.len() - successful;
    println!("\n{}", "Batch conversion complete!".green().bold());
    println!("  {} {}", "Successful:".green(), successful);
    if failed > 0 {
        println!("  {} {}", "Failed:".red(), failed);
    }
    println!(
        "  {} {} steps total",
        "Extracted:".bold(),
        entries.iter().map(|e| e.total_steps).sum::<usize>()
    );
    println!("\nOpen {} to view the conversion dashboard", dashboard_path);

    Ok(())
}
