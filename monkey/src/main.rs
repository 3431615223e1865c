//! Monkey interpreter CLI

use clap::{Parser, Subcommand};
use monkey::error::{read_source, report_error};
use monkey::interp::{Interpreter, Value};
use monkey::repl::{Repl, print_builtins};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "monkey", version, about = "Monkey - a small tree-walking interpreter")]
struct Cli {
    /// Log builtin dispatch and evaluation at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Monkey source file
    Run {
        /// Source file to run
        file: PathBuf,
    },
    /// Start the interactive REPL (default)
    Repl,
    /// Parse and dump AST as JSON (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
    /// List the built-in functions
    Builtins,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command.unwrap_or(Command::Repl) {
        Command::Run { file } => run_file(&file),
        Command::Repl => start_repl(),
        Command::Parse { file } => parse_file(&file),
        Command::Tokens { file } => tokenize_file(&file),
        Command::Builtins => {
            print_builtins();
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "monkey=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

type CliResult = Result<ExitCode, Box<dyn std::error::Error>>;

fn run_file(path: &Path) -> CliResult {
    let source = read_source(path)?;
    let filename = path.display().to_string();

    let mut interpreter = Interpreter::new();
    match interpreter.run_source(&source) {
        Ok(Value::Error(message)) => {
            eprintln!("ERROR: {message}");
            Ok(ExitCode::FAILURE)
        }
        Ok(value) => {
            tracing::debug!(result = %value, "program finished");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            report_error(&filename, &source, &e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn start_repl() -> CliResult {
    let mut repl = Repl::new()?;
    repl.run()?;
    Ok(ExitCode::SUCCESS)
}

fn parse_file(path: &Path) -> CliResult {
    let source = read_source(path)?;
    let filename = path.display().to_string();

    let tokens = monkey::lexer::tokenize(&source)?;
    let ast = monkey::parser::parse(&filename, &source, tokens)?;

    println!("{}", serde_json::to_string_pretty(&ast)?);
    Ok(ExitCode::SUCCESS)
}

fn tokenize_file(path: &Path) -> CliResult {
    let source = read_source(path)?;

    let tokens = monkey::lexer::tokenize(&source)?;
    for (tok, span) in &tokens {
        println!("{:?} @ {}..{}", tok, span.start, span.end);
    }

    Ok(ExitCode::SUCCESS)
}
