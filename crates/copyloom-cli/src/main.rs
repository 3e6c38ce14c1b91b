mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    client::ClientSubcommand, config::ConfigSubcommand, content::ContentSubcommand,
    kb::KbSubcommand, readiness::SelectionArgs,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "copyloom",
    about = "Client knowledge bases, completeness scoring and content generation",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: auto-detect from .copyloom/)
    #[arg(long, global = true, env = "COPYLOOM_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a copyloom workspace in the current directory
    Init {
        /// Workspace name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Manage clients
    Client {
        #[command(subcommand)]
        subcommand: ClientSubcommand,
    },

    /// Show, edit and import knowledge bases
    Kb {
        #[command(subcommand)]
        subcommand: KbSubcommand,
    },

    /// Score a client's knowledge base
    Completeness { client: String },

    /// Check whether a selection may be sent for generation
    Readiness {
        client: String,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Generate a piece of content for a client
    Generate {
        client: String,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Ask for a revision of generated content
    Chat {
        client: String,
        content_id: String,
        message: String,
    },

    /// Browse generated content
    Content {
        #[command(subcommand)]
        subcommand: ContentSubcommand,
    },

    /// Inspect and validate the workspace configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Start the HTTP API
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "3141")]
        port: u16,

        /// Open the API in a browser once listening
        #[arg(long)]
        open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref(), cli.json),
        Commands::Client { subcommand } => cmd::client::run(&root, subcommand, cli.json),
        Commands::Kb { subcommand } => cmd::kb::run(&root, subcommand, cli.json),
        Commands::Completeness { client } => cmd::completeness::run(&root, &client, cli.json),
        Commands::Readiness { client, selection } => {
            cmd::readiness::run(&root, &client, selection, cli.json)
        }
        Commands::Generate { client, selection } => {
            cmd::generate::run(&root, &client, selection, cli.json)
        }
        Commands::Chat {
            client,
            content_id,
            message,
        } => cmd::chat::run(&root, &client, &content_id, &message, cli.json),
        Commands::Content { subcommand } => cmd::content::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port, open } => cmd::serve::run(&root, port, open),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
