//! `glintc` — the command-line driver for the glint compiler core.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use glint::{CompileOutput, GlintConfig};
use glint_base::Level;

#[derive(Parser)]
#[command(name = "glintc")]
#[command(about = "The glint compiler front end", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and report diagnostics without emitting anything.
    Check {
        /// Source file to compile.
        path: PathBuf,
        /// Path to a glint.toml to load instead of the default configuration.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run the pipeline and print the resulting IR as JSON.
    EmitIr {
        /// Source file to compile.
        path: PathBuf,
        /// Path to a glint.toml to load instead of the default configuration.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run_cli(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check { path, config } => {
            let config = load_config(config.as_deref())?;
            let out = glint::compile_file(&path)?;
            print_diagnostics(&out, &config);
            Ok(exit_code_for(&out, &config))
        }
        Commands::EmitIr { path, config } => {
            let config = load_config(config.as_deref())?;
            let out = glint::compile_file(&path)?;
            print_diagnostics(&out, &config);
            let failed = has_failure(&out, &config);
            if let (Some(script), false) = (&out.script, failed) {
                println!("{}", serde_json::to_string_pretty(script)?);
            }
            Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<GlintConfig, glint::ConfigError> {
    match path {
        Some(path) => GlintConfig::load(path),
        None => GlintConfig::load("glint.toml"),
    }
}

fn print_diagnostics(out: &CompileOutput, config: &GlintConfig) {
    for diag in &out.diagnostics {
        if diag.level == Level::Info && !config.diagnostics.verbose {
            continue;
        }
        eprintln!("{}: {} [{}] {}", diag.location, level_label(diag.level), diag.code, diag.message);
    }
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "error",
        Level::Warning => "warning",
        Level::Info => "info",
    }
}

fn exit_code_for(out: &CompileOutput, config: &GlintConfig) -> ExitCode {
    if has_failure(out, config) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn has_failure(out: &CompileOutput, config: &GlintConfig) -> bool {
    out.had_error()
        || (config.diagnostics.warnings_as_errors
            && out.diagnostics.iter().any(|d| d.level == Level::Warning))
}
