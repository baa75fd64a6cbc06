//! # kithab CLI entry point
//!
//! Parses command-line arguments, sets up logging, loads configuration and
//! the stored session, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kithab_cli::account::{
    run_forgot_password, run_login, run_logout, run_whoami, ForgotPasswordArgs, LoginArgs,
};
use kithab_cli::admin::{run_admin, AdminArgs};
use kithab_cli::browse::{run_browse, BrowseArgs};
use kithab_cli::upload::{run_upload, run_uploads, UploadArgs, UploadsArgs};
use kithab_cli::{AppContext, CliConfig};

/// Kithab study-notes portal
///
/// Browse and download notes by regulation, branch, semester and subject;
/// upload notes as faculty; manage notes, faculty and academic metadata as
/// admin.
#[derive(Parser, Debug)]
#[command(name = "kithab", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in as admin or faculty.
    Login(LoginArgs),

    /// End the stored session.
    Logout,

    /// Show the logged-in user.
    Whoami,

    /// Request a password reset.
    ForgotPassword(ForgotPasswordArgs),

    /// Find notes by subject and optionally download them.
    Browse(BrowseArgs),

    /// Upload a note (faculty).
    Upload(UploadArgs),

    /// List or delete your uploads (faculty).
    Uploads(UploadsArgs),

    /// Manage notes, faculty and metadata (admin).
    Admin(AdminArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    tracing::debug!("kithab CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to start async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = CliConfig::load(cli.config.as_deref())?;
    tracing::debug!(backend = %config.backend_url, "configuration loaded");
    let ctx = AppContext::open(config, cli.json)?;

    match cli.command {
        Commands::Login(args) => run_login(&args, &ctx).await,
        Commands::Logout => run_logout(&ctx),
        Commands::Whoami => run_whoami(&ctx),
        Commands::ForgotPassword(args) => run_forgot_password(&args, &ctx).await,
        Commands::Browse(args) => run_browse(&args, &ctx).await,
        Commands::Upload(args) => run_upload(&args, &ctx).await,
        Commands::Uploads(args) => run_uploads(&args, &ctx).await,
        Commands::Admin(args) => run_admin(&args, &ctx).await,
    }
}
