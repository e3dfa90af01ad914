//! Command-line interface for the extension spec parser.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use codegen_xmlparser::config::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_INCLUDE_DEPTH};
use codegen_xmlparser::ParserConfig;
use console::style;

use crate::error::Result;
use crate::output::{generate_yaml, save_yaml};
use crate::parser::parse_extension_file;
use crate::types::Extension;

/// CodeGen extension parser - Read an XML extension description.
#[derive(Parser)]
#[command(name = "codegen-extension")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a spec file and write the extension model as YAML.
    Parse {
        /// Extension spec file
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read buffer size in bytes
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Maximum nesting of included documents
        #[arg(long, default_value_t = DEFAULT_MAX_INCLUDE_DEPTH)]
        max_include_depth: usize,
    },

    /// Parse a spec file and report whether it is valid.
    Check {
        /// Extension spec file
        file: PathBuf,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            file,
            output,
            chunk_size,
            max_include_depth,
        } => {
            let config = ParserConfig::new()
                .with_chunk_size(chunk_size)
                .with_max_include_depth(max_include_depth);
            parse_command(&file, output.as_deref(), config)
        }
        Commands::Check { file } => check_command(&file),
    }
}

/// Execute the parse command.
fn parse_command(file: &Path, output: Option<&Path>, config: ParserConfig) -> Result<()> {
    let extension = parse_extension_file(file, config)?;

    match output {
        Some(path) => {
            save_yaml(&extension, path)?;
            eprintln!(
                "{} {} to {}",
                style("Saved").green().bold(),
                style(&extension.name).cyan(),
                path.display()
            );
        }
        None => print!("{}", generate_yaml(&extension)?),
    }

    Ok(())
}

/// Execute the check command.
fn check_command(file: &Path) -> Result<()> {
    let extension = parse_extension_file(file, ParserConfig::default())?;
    print_summary(file, &extension);
    Ok(())
}

fn print_summary(file: &Path, extension: &Extension) {
    println!(
        "{} {}",
        style("Valid").green().bold(),
        style(file.display()).cyan()
    );
    println!("  Extension: {}", style(&extension.name).green());
    println!("  Summary: {}", extension.summary);
    println!("  Language: {}", extension.language.as_str());
    if let Some(release) = &extension.release {
        println!("  Release: {} ({}, {})", release.version, release.state, release.date);
    }
    if let Some(license) = &extension.license {
        println!("  License: {license}");
    }
    println!("  Maintainers: {}", extension.maintainers.len());
    if !extension.code.is_empty() {
        println!("  Code blocks: {}", extension.code.len());
    }
}
