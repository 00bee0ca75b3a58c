mod cmd;
mod output;

use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use binshim_lib::acquire::remediation;
use binshim_lib::config::Config;
use binshim_lib::platform::PlatformKey;

use crate::cmd::{cmd_info, cmd_install, cmd_run, cmd_which};

/// Exit code for an invalid configuration.
const EXIT_CONFIG: u8 = 2;

/// binshim - fetch and launch a platform-specific pre-built binary
#[derive(Parser)]
#[command(name = "binshim")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output (must precede the command)
  #[arg(short, long)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Download the binary for this platform (never fails the package install)
  Install {
    /// Re-download even if the binary is already installed
    #[arg(short, long)]
    force: bool,
  },

  /// Run the binary, forwarding arguments, signals and the exit code
  ///
  /// Everything after `run` is passed through, including `--help`.
  #[command(disable_help_flag = true)]
  Run {
    /// Arguments passed through to the binary
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<OsString>,
  },

  /// Print the path of the binary that `run` would launch
  Which,

  /// Show platform, artifact and install details
  Info {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let config = match Config::load() {
    Ok(config) => config,
    Err(e) if matches!(cli.command, Commands::Install { .. }) => {
      output::warning(&format!("Skipping binary installation, invalid configuration: {}", e));
      let fallback = Config::new(PlatformKey::current(), ".");
      output::remediation(&remediation(&fallback));
      return ExitCode::SUCCESS;
    }
    Err(e) => {
      output::failure(&format!("invalid configuration: {}", e));
      return ExitCode::from(EXIT_CONFIG);
    }
  };

  let result = match cli.command {
    Commands::Install { force } => cmd_install(&config, force),
    Commands::Run { args } => cmd_run(&config, &args),
    Commands::Which => cmd_which(&config),
    Commands::Info { json } => cmd_info(&config, json),
  };

  match result {
    Ok(code) => exit_code(code),
    Err(e) => {
      output::failure(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "error" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

/// Codes outside `0..=255` only occur on Windows; report those as failure.
fn exit_code(code: i32) -> ExitCode {
  match u8::try_from(code) {
    Ok(code) => ExitCode::from(code),
    Err(_) => ExitCode::FAILURE,
  }
}
