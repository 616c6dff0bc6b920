//! # swg CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::Parser;

/// Swagger 2.0 parameter and schema validator.
///
/// Validates wire-level parameter values and body documents against
/// Swagger 2.0 specifications given as JSON or YAML files.
#[derive(Parser, Debug)]
#[command(name = "swg", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate one parameter value against its parameter object.
    Param(swg_cli::param::ParamArgs),
    /// Validate a request or response body against a schema.
    Body(swg_cli::body::BodyArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let report = match cli.command {
        Commands::Param(args) => swg_cli::param::run(&args)?,
        Commands::Body(args) => swg_cli::body::run(&args)?,
    };

    println!("{}", report.render()?);
    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
