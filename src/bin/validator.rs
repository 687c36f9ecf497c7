//! Watch Face Validator CLI
//!
//! Validates watch face XML documents against the versioned format
//! specification and prints a per-version report.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wff_validator::report;
use wff_validator::schema::watch_face_specification;
use wff_validator::validator::{validate_file, Specification};
use wff_validator::ResultKind;

#[derive(Parser)]
#[command(name = "wff-validator")]
#[command(about = "Validate watch face documents against all format versions")]
struct Cli {
    /// A watch face XML file, or a directory to scan for .xml files
    path: PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(all_valid) => {
            if !all_valid {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let spec = watch_face_specification();
    let mut all_valid = true;

    if cli.path.is_dir() {
        let mut found = false;
        for entry in walkdir::WalkDir::new(&cli.path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "xml").unwrap_or(false))
        {
            found = true;
            if !check_file(entry.path(), &spec, cli.format)? {
                all_valid = false;
            }
        }
        if !found {
            tracing::warn!(path = %cli.path.display(), "no .xml files found");
        }
    } else {
        all_valid = check_file(&cli.path, &spec, cli.format)?;
    }

    Ok(all_valid)
}

fn check_file(path: &Path, spec: &Specification, format: Format) -> anyhow::Result<bool> {
    let result =
        validate_file(path, spec).with_context(|| format!("validating {}", path.display()))?;

    match format {
        Format::Text => {
            println!("{}:", path.display());
            print!("{}", report::format_report(&result));
        }
        Format::Json => {
            let mut value = report::to_json(&result);
            value["file"] = serde_json::json!(path.display().to_string());
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(result.kind() != ResultKind::Failure)
}
