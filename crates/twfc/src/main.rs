//! The TWF compiler CLI (§6.3).
//!
//! Provides the `twfc` command with the following subcommands:
//!
//! - `twfc check [--lenient] FILE…` — parse and resolve, reporting errors
//! - `twfc parse [--lenient] FILE…` — emit the JSON AST
//! - `twfc symbols [--json] [--lenient] FILE…` — list document symbols
//! - `twfc lsp` — run the LSP server over stdio
//!
//! Multiple input files are concatenated with an interleaving newline and
//! analyzed as a single document.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use twf_common::{ParseError, ResolveError};
use twf_parser::ast::File;
use twf_parser::parser::parse_tolerant;

#[derive(Parser)]
#[command(name = "twfc", version, about = "The TWF workflow language toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and resolve one or more files, reporting errors to stderr
    Check {
        /// TWF source files to analyze
        files: Vec<PathBuf>,

        /// Exit 0 even when errors are found
        #[arg(long)]
        lenient: bool,
    },
    /// Parse one or more files and emit the JSON AST to stdout
    Parse {
        /// TWF source files to analyze
        files: Vec<PathBuf>,

        /// Accepted for consistency with `check`/`symbols`; parse always exits 0
        #[arg(long)]
        lenient: bool,
    },
    /// List the document symbols found in one or more files
    Symbols {
        /// TWF source files to analyze
        files: Vec<PathBuf>,

        /// Exit 0 even when errors are found
        #[arg(long)]
        lenient: bool,

        /// Emit the symbol tree as JSON instead of an indented listing
        #[arg(long = "json")]
        json: bool,
    },
    /// Run the LSP server over stdio
    Lsp,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Check { files, lenient } => check(&files, lenient),
        Commands::Parse { files, lenient: _ } => parse_command(&files),
        Commands::Symbols { files, lenient, json } => symbols_command(&files, lenient, json),
        Commands::Lsp => {
            run_lsp();
            ExitCode::SUCCESS
        }
    }
}

/// Reads and concatenates `files` with an interleaving newline, per §6.3.
fn load_sources(files: &[PathBuf]) -> Result<String, String> {
    if files.is_empty() {
        return Err("no input files".to_string());
    }
    let mut contents = Vec::with_capacity(files.len());
    for path in files {
        let text = std::fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
        contents.push(text);
    }
    Ok(contents.join("\n"))
}

struct Analysis {
    file: File,
    parse_errors: Vec<ParseError>,
    resolve_errors: Vec<ResolveError>,
}

fn analyze(source: &str) -> Analysis {
    let (mut file, parse_errors) = parse_tolerant(source);
    let resolve_errors = twf_analysis::resolve(&mut file);
    Analysis {
        file,
        parse_errors,
        resolve_errors,
    }
}

impl Analysis {
    fn has_errors(&self) -> bool {
        !self.parse_errors.is_empty() || !self.resolve_errors.is_empty()
    }

    fn report(&self) {
        for e in &self.parse_errors {
            eprintln!("{e}");
        }
        for e in &self.resolve_errors {
            eprintln!("{e}");
        }
    }
}

fn check(files: &[PathBuf], lenient: bool) -> ExitCode {
    let source = match load_sources(files) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let analysis = analyze(&source);
    analysis.report();
    if !analysis.has_errors() || lenient {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// `parse` always emits the (possibly partial) JSON AST and always exits 0
/// -- errors are reported to stderr alongside it, never fatal (§6.3, §7).
fn parse_command(files: &[PathBuf]) -> ExitCode {
    let source = match load_sources(files) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let analysis = analyze(&source);
    analysis.report();
    let json = twf_analysis::json::file_to_json(&analysis.file);
    println!("{}", serde_json::to_string_pretty(&json).expect("JSON AST is always serializable"));
    ExitCode::SUCCESS
}

fn symbols_command(files: &[PathBuf], lenient: bool, json: bool) -> ExitCode {
    let source = match load_sources(files) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let analysis = analyze(&source);
    analysis.report();

    let symbols = twf_lsp::queries::symbols::document_symbols(&analysis.file);
    if json {
        println!("{}", serde_json::to_string_pretty(&symbols).expect("DocumentSymbol is always serializable"));
    } else {
        for symbol in &symbols {
            print_symbol(symbol, 0);
        }
    }

    if !analysis.has_errors() || lenient {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_symbol(symbol: &tower_lsp::lsp_types::DocumentSymbol, depth: usize) {
    println!(
        "{}{} ({:?}) L{}-{}",
        "  ".repeat(depth),
        symbol.name,
        symbol.kind,
        symbol.range.start.line + 1,
        symbol.range.end.line + 1
    );
    if let Some(children) = &symbol.children {
        for child in children {
            print_symbol(child, depth + 1);
        }
    }
}

fn run_lsp() {
    let runtime = tokio::runtime::Runtime::new().expect("failed to start the tokio runtime");
    runtime.block_on(twf_lsp::run_server());
}
