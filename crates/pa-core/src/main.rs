//! Profiling Agent Core - configuration checks and inspection
//!
//! The main entry point for pa-core, handling:
//! - Resolving, loading and validating the agent configuration
//! - Printing the normalized configuration
//! - Printing the built-in profiling endpoint catalog

use clap::{Args, Parser, Subcommand};
use pa_config::{defaults, load_resolved, resolve_config};
use pa_core::check::CheckReport;
use pa_core::exit_codes::ExitCode;
use pa_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use pa_core::output::{render_document, DocumentFormat, ReportFormat};
use std::path::PathBuf;
use tracing::{debug, error, info_span};

/// Profiling Agent Core - validate and inspect agent configuration
#[derive(Parser)]
#[command(name = "pa-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to the agent configuration file
    #[arg(long, global = true)]
    config_file: Option<PathBuf>,

    /// Log format on stderr (human or jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the configuration
    Check(CheckArgs),

    /// Print the normalized configuration
    Show(ShowArgs),

    /// Print the built-in profiling endpoint catalog
    Defaults(DefaultsArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Report format
    #[arg(long, short = 'f', default_value = "json")]
    format: ReportFormat,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Document format
    #[arg(long, short = 'o', default_value = "yaml")]
    output: DocumentFormat,
}

#[derive(Args, Debug)]
struct DefaultsArgs {
    /// Document format
    #[arg(long, short = 'o', default_value = "yaml")]
    output: DocumentFormat,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let run_id = generate_run_id();
    let span = info_span!("pa-core", run_id = %run_id);
    let _guard = span.enter();

    let exit_code = match &cli.command {
        Commands::Check(args) => run_check(&cli.global, args, &run_id),
        Commands::Show(args) => run_show(&cli.global, args),
        Commands::Defaults(args) => run_defaults(args),
    };

    debug!(exit_code = exit_code.as_i32(), "command finished");
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_check(global: &GlobalOpts, args: &CheckArgs, run_id: &str) -> ExitCode {
    let resolved = resolve_config(global.config_file.as_deref());
    let outcome = load_resolved(&resolved);
    let report = CheckReport::new(run_id, &resolved, &outcome);

    match report.render(args.format) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            error!(error = %e, "cannot render check report");
            return ExitCode::InternalError;
        }
    }

    match &outcome {
        Ok(_) => ExitCode::Clean,
        Err(e) => ExitCode::for_config_error(e),
    }
}

fn run_show(global: &GlobalOpts, args: &ShowArgs) -> ExitCode {
    let resolved = resolve_config(global.config_file.as_deref());
    let loaded = match load_resolved(&resolved) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("pa-core show: {}", e);
            return ExitCode::for_config_error(&e);
        }
    };

    print_document(&loaded.config, args.output)
}

fn run_defaults(args: &DefaultsArgs) -> ExitCode {
    print_document(&defaults(), args.output)
}

fn print_document<T: serde::Serialize>(value: &T, format: DocumentFormat) -> ExitCode {
    match render_document(value, format) {
        Ok(text) => {
            print!("{}", text);
            ExitCode::Clean
        }
        Err(e) => {
            error!(error = %e, "cannot render document");
            ExitCode::InternalError
        }
    }
}
