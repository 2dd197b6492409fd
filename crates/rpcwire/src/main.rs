//! rpcwire command-line tool
//!
//! - **check**: validate an interface document and report every violation
//! - **describe**: list declared types and function signatures
//! - **encode** / **decode**: convert between JSON values and canonical CBOR hex

use anyhow::Result;
use clap::{Parser, Subcommand};
use rpcwire_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "rpcwire", version, about = "Schema-driven RPC wire format tool")]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Codec configuration file (TOML)
    #[arg(long, global = true, env = "RPCWIRE_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum nesting depth accepted by the decoder
    #[arg(long, global = true, env = "RPCWIRE_MAX_DEPTH")]
    max_depth: Option<usize>,

    /// Maximum input length in bytes accepted by the decoder
    #[arg(long, global = true, env = "RPCWIRE_MAX_INPUT_LEN")]
    max_input_len: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate an interface document
    Check(cli::check::CheckArgs),

    /// Show the types and functions an interface declares
    Describe(cli::describe::DescribeArgs),

    /// Encode a JSON value under a type and print the bytes as hex
    Encode(cli::codec::EncodeArgs),

    /// Decode hex bytes under a type and print the value as JSON
    Decode(cli::codec::DecodeArgs),
}

fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check(args) => cli::check::run(args),
        Commands::Describe(args) => cli::describe::run(args),
        Commands::Encode(args) => cli::codec::run_encode(args),
        Commands::Decode(args) => {
            let overrides = cli::config::Overrides {
                max_depth: cli.max_depth,
                max_input_len: cli.max_input_len,
            };
            let codec_config = cli::config::load(cli.config.as_deref(), overrides)?;
            cli::codec::run_decode(args, codec_config)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LogConfig {
        app_name: "rpcwire",
        verbose: cli.verbose,
    }) {
        eprintln!("Warning: {}", err);
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}
