//! Mindmap CLI entry point

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "mindmap")]
#[command(about = "Dependency graph and change-impact analysis for TypeScript projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Project root path (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the analysis server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "7890")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Open the graph endpoint once the server is up
        #[arg(short, long)]
        open: bool,
    },
    /// Scan the project and print a summary
    Scan {
        /// Print the full graph as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Analyze the impact of a change to one node
    Impact {
        /// Node id, e.g. `src/Button.tsx::Button`
        node_id: String,

        #[command(flatten)]
        change: ChangeArgs,
    },
    /// Remove saved node positions
    Clear,
    /// Show version
    Version,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ChangeArgs {
    /// Rename the node
    #[arg(long, value_name = "NEW_NAME")]
    rename: Option<String>,

    /// Delete the node
    #[arg(long)]
    delete: bool,

    /// Change the node's parameter list
    #[arg(long, num_args = 2, value_names = ["BEFORE", "AFTER"])]
    signature: Option<Vec<String>>,
}

impl ChangeArgs {
    fn into_change(self) -> commands::ChangeRequest {
        if let Some(after) = self.rename {
            return commands::ChangeRequest::Rename(after);
        }
        if let Some([before, after]) = self.signature.as_deref() {
            return commands::ChangeRequest::Signature {
                before: before.clone(),
                after: after.clone(),
            };
        }
        commands::ChangeRequest::Delete
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("MINDMAP_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("mindmap={}", log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Mindmap v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Project root: {}", cli.root.display());

    match cli.command {
        Commands::Serve { port, host, open } => commands::serve(cli.root, host, port, open).await,
        Commands::Scan { json } => commands::scan(cli.root, json).await,
        Commands::Impact { node_id, change } => {
            commands::impact(cli.root, node_id, change.into_change()).await
        }
        Commands::Clear => commands::clear(cli.root),
        Commands::Version => {
            println!("Mindmap v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
