mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{callback::ActionCallbackArgs, config::ConfigSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "taskgraph-actions",
    about = "Render the actions manifest for a push and run action callbacks",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from taskcluster/ or .git/)
    #[arg(long, global = true, env = "ACTIONS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render actions.json for a set of decision parameters
    Render {
        /// Parameters file (YAML or JSON)
        #[arg(long, short = 'p')]
        parameters: PathBuf,

        /// Task group the callback tasks join (default: a fresh id)
        #[arg(long, env = "TASK_ID")]
        task_group_id: Option<String>,

        /// Write the manifest here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List registered actions and callbacks
    List,

    /// Run the callback named by an action task
    ActionCallback(ActionCallbackArgs),

    /// Inspect and validate the callback task config
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::ActionCallback(_) => tracing::Level::INFO,
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
        Commands::Render {
            parameters,
            task_group_id,
            output,
        } => cmd::render::run(&root, &parameters, task_group_id.as_deref(), output.as_deref()),
        Commands::List => cmd::list::run(&root, cli.json),
        Commands::ActionCallback(args) => cmd::callback::run(&root, args),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
