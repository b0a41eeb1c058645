//! jsabstract CLI
//!
//! Analyse a script in a fresh session and print its completion together with
//! every diagnostic reported along the way.

use anyhow::{bail, Context};
use clap::Parser;
use jsabstract::{AnalysisOptions, Completion, Session, VERSION};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jsabstract")]
#[command(author, version, about = "Abstract interpretation of JavaScript built-ins", long_about = None)]
struct Cli {
    /// JavaScript file to analyse
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Analyse a string of JavaScript
    #[arg(short, long, value_name = "CODE", conflicts_with = "file")]
    eval: Option<String>,

    /// Exact mode: every value is concrete and built-in faults are thrown
    #[arg(long)]
    exact: bool,

    /// Surface built-in faults as simulated exceptions instead of recovering
    #[arg(long)]
    no_recovery: bool,

    /// JSON file with analysis options
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn install_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_options(cli: &Cli) -> anyhow::Result<AnalysisOptions> {
    let mut options = match &cli.config {
        Some(path) => AnalysisOptions::from_file(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => AnalysisOptions::default(),
    };
    if cli.exact {
        options.exact_mode = true;
    }
    if cli.no_recovery {
        options.native_exception_recovery = false;
    }
    Ok(options)
}

/// Analyse the input; Ok(false) reports an uncaught simulated throw
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let options = load_options(cli)?;
    let (source, filename) = match (&cli.file, &cli.eval) {
        (Some(path), _) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("error reading '{}'", path.display()))?;
            (source, path.display().to_string())
        }
        (None, Some(code)) => (code.clone(), options.default_filename.clone()),
        (None, None) => bail!("no input: pass a FILE or -e CODE (jsabstract {})", VERSION),
    };

    let mut session = Session::new(options);
    let completion = session.run_file(&source, &filename);
    for diagnostic in session.diagnostics() {
        eprintln!("{}", diagnostic);
    }

    match completion? {
        Completion::Normal(value) => {
            match value {
                Some(value) => println!("{}", value),
                None => println!("undefined"),
            }
            Ok(true)
        }
        Completion::Throw(value) => {
            match value {
                Some(value) => eprintln!("Uncaught {}", value),
                None => eprintln!("Uncaught exception"),
            }
            Ok(false)
        }
    }
}
