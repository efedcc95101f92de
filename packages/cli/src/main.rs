mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    AddArgs, Context, DeleteArgs, InitArgs, MoveArgs, NewArgs, PublishArgs, RemoveArgs,
    RestoreArgs, SetArgs, ShowArgs, UnpublishArgs,
};

/// Pagecraft CLI - Landing pages from typed sections
#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Acting user
    #[arg(short, long, global = true, env = "PAGECRAFT_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Pagecraft workspace
    Init(InitArgs),

    /// Create a page
    New(NewArgs),

    /// List your pages
    List,

    /// Show a page and its sections
    Show(ShowArgs),

    /// Append a section to a page
    Add(AddArgs),

    /// Change a section's content or style
    Set(SetArgs),

    /// Move a section to another position
    Move(MoveArgs),

    /// Remove a section from a page
    Remove(RemoveArgs),

    /// Publish a page
    Publish(PublishArgs),

    /// Take a published page offline
    Unpublish(UnpublishArgs),

    /// Recover a page from its local backup
    Restore(RestoreArgs),

    /// Permanently delete a page
    Delete(DeleteArgs),
}

async fn run(cli: Cli, cwd: &str) -> anyhow::Result<()> {
    if let Command::Init(args) = cli.command {
        return commands::init(args, cwd);
    }

    let ctx = Context::load(cwd, cli.user)?;

    match cli.command {
        Command::Init(_) => Ok(()),
        Command::New(args) => commands::new(args, &ctx).await,
        Command::List => commands::list(&ctx).await,
        Command::Show(args) => commands::show(args, &ctx).await,
        Command::Add(args) => commands::add(args, &ctx).await,
        Command::Set(args) => commands::set(args, &ctx).await,
        Command::Move(args) => commands::move_section(args, &ctx).await,
        Command::Remove(args) => commands::remove(args, &ctx).await,
        Command::Publish(args) => commands::publish(args, &ctx).await,
        Command::Unpublish(args) => commands::unpublish(args, &ctx).await,
        Command::Restore(args) => commands::restore(args, &ctx).await,
        Command::Delete(args) => commands::delete(args, &ctx).await,
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match std::env::current_dir() {
        Ok(cwd) => run(cli, &cwd.display().to_string()).await,
        Err(e) => Err(anyhow::anyhow!("Cannot get current directory: {}", e)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
