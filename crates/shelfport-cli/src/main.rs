//! Shelfport command line entry point.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use shelfport_cli::commands::{run_import, run_list, run_probe, ImportArgs};
use shelfport_cli::config::ShelfConfig;

#[derive(Parser)]
#[command(
    name = "shelfport",
    about = "Acquire publications from catalog links into a local library",
    version
)]
struct Cli {
    /// Library directory (defaults to $SHELFPORT_LIBRARY, ./.shelfport, or ~/.shelfport).
    #[arg(short, long, global = true)]
    library: Option<String>,

    /// Message locale (defaults to $SHELFPORT_LOCALE, or en-US).
    #[arg(long, global = true)]
    locale: Option<String>,

    /// HTTP timeout in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire a link and store it in the library.
    Import {
        /// Acquisition URL.
        url: String,

        /// Declared content type(s), `;`-separated.
        #[arg(long = "type")]
        content_type: Option<String>,

        /// Link title, used as the download label.
        #[arg(long)]
        title: Option<String>,

        /// Hashed LCP passphrase carried by the link.
        #[arg(long)]
        passphrase: Option<String>,

        /// Catalog publication JSON supplying tags and the feed blob.
        #[arg(long)]
        publication: Option<PathBuf>,
    },

    /// Resolve a link and print how it would be acquired.
    Probe {
        /// Acquisition URL.
        url: String,

        /// Declared content type(s), `;`-separated.
        #[arg(long = "type")]
        content_type: Option<String>,
    },

    /// List stored publications.
    List {
        /// Print full records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   shelfport completions bash > ~/.local/share/bash-completion/completions/shelfport
    ///   shelfport completions zsh > ~/.zfunc/_shelfport
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ShelfConfig::resolve(
        cli.library.as_deref(),
        cli.locale.as_deref(),
        cli.timeout_ms,
    );

    match cli.command {
        Commands::Import {
            url,
            content_type,
            title,
            passphrase,
            publication,
        } => {
            let args = ImportArgs {
                url,
                content_type,
                title,
                passphrase,
                publication,
            };
            if !run_import(&config, &args).await? {
                std::process::exit(1);
            }
        }

        Commands::Probe { url, content_type } => {
            run_probe(&config, &url, content_type.as_deref()).await?;
        }

        Commands::List { json } => {
            run_list(&config, json).await?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "shelfport", &mut std::io::stdout());
        }
    }

    Ok(())
}
