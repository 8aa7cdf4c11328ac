#![forbid(unsafe_code)]

mod cmd;
mod output;

use chores_core::ErrorCode;
use chores_core::config::{self, DB_ENV};
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, Reported, render_error};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "chores: a small, durable to-do list",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output (alias for `--format json`).
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Database file (overrides CHORES_DB and the config file).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Edit",
        about = "Add an item to the top of the list",
        after_help = "EXAMPLES:\n    # Add an item\n    chores add buy oat milk\n\n    # Emit machine-readable output\n    chores add walk dog --json"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Remove an item",
        after_help = "EXAMPLES:\n    # Remove by key (see `chores list`)\n    chores rm 1700000000000"
    )]
    Rm(cmd::rm::RmArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Replace an item's text",
        after_help = "EXAMPLES:\n    # Fix a typo\n    chores edit 1700000000000 walk the dog"
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Mark an item done",
        after_help = "EXAMPLES:\n    chores check 1700000000000"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Mark an item not done",
        after_help = "EXAMPLES:\n    chores uncheck 1700000000000"
    )]
    Uncheck(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Order",
        about = "Move an item to another position",
        long_about = "Move an item between 1-based positions, shifting the items in between.",
        after_help = "EXAMPLES:\n    # Bring the third item to the top\n    chores move 3 1"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Order",
        about = "Sort the list alphabetically",
        long_about = "Sort the whole list by text. The sorted order replaces the manual order.",
        after_help = "EXAMPLES:\n    chores sort\n    chores sort --descending"
    )]
    Sort(cmd::sort::SortArgs),

    #[command(
        next_help_heading = "Read",
        about = "List items",
        after_help = "EXAMPLES:\n    # Everything\n    chores list\n\n    # Open items mentioning \"dog\"\n    chores list --search dog --pending\n\n    # Emit machine-readable output\n    chores list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Start an interactive session",
        long_about = "Read commands from stdin against one loaded list. Type `help` for commands, `quit` to leave."
    )]
    Shell,

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    chores completions bash > ~/.local/share/bash-completion/completions/chores"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CHORES_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "chores=debug,info"
        } else {
            "chores=info,warn"
        })
    });

    let format = env::var("CHORES_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn build_context(cli: &Cli) -> anyhow::Result<cmd::Context> {
    let pre_config_output = output::resolve_output_mode(cli.format, cli.json, None);
    let user = config::load_user_config().map_err(|err| {
        output::report(
            pre_config_output,
            CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
        )
    })?;

    let env_db = env::var(DB_ENV).ok();
    let db_path = config::resolve_db_path(cli.db.as_deref(), env_db.as_deref(), &user);

    Ok(cmd::Context {
        output: output::resolve_output_mode(cli.format, cli.json, user.output.as_deref()),
        quiet: cli.quiet,
        db_path,
        storage_key: user.storage.key.clone(),
        lock_timeout: user.storage.lock_timeout(),
    })
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let ctx = build_context(&cli)?;
    debug!(db = %ctx.db_path.display(), output = ?ctx.output, "resolved context");

    match &cli.command {
        Commands::Add(args) => cmd::add::run_add(args, &ctx).await,
        Commands::Rm(args) => cmd::rm::run_rm(args, &ctx).await,
        Commands::Edit(args) => cmd::edit::run_edit(args, &ctx).await,
        Commands::Check(args) => cmd::check::run_check(args, true, &ctx).await,
        Commands::Uncheck(args) => cmd::check::run_check(args, false, &ctx).await,
        Commands::Move(args) => cmd::move_cmd::run_move(args, &ctx).await,
        Commands::Sort(args) => cmd::sort::run_sort(args, &ctx).await,
        Commands::List(args) => cmd::list::run_list(args, &ctx).await,
        Commands::Shell => cmd::shell::run_shell(&ctx).await,
        Commands::Completions(_) => Ok(()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let mode = output::resolve_output_mode(cli.format, cli.json, None);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.downcast_ref::<Reported>().is_none() {
                let _ = render_error(
                    mode,
                    &CliError::from_code(ErrorCode::InternalUnexpected, format!("{err:#}")),
                );
            }
            ExitCode::FAILURE
        }
    }
}
