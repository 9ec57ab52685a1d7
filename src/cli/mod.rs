mod commands;
pub mod error;
pub mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::content::{ContentRepository, DocumentKind};
use crate::github::HttpTransport;
use crate::settings::{LocationOverrides, Settings, env_lookup};
use crate::store::{FileStore, get_store_path};
use crate::sync::{DEFAULT_PUBLISH_MESSAGE, SyncCoordinator, WorkingCopy};

use error::CliResult;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Edit and publish portfolio site content on GitHub", long_about = None)]
pub struct Cli {
    /// Directory holding the working copy (default: XDG data dir)
    #[arg(long, global = true, env = "FOLIO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the GitHub API URL (default: FOLIO_GITHUB_API_URL env or https://api.github.com)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check and save the repository to publish to
    Setup {
        /// Personal access token with repo scope
        #[arg(long)]
        token: Option<String>,
        /// Repository owner (user or organization)
        #[arg(long)]
        owner: Option<String>,
        /// Repository name
        #[arg(long)]
        repo: Option<String>,
        /// Branch to read and commit (default: main)
        #[arg(long)]
        branch: Option<String>,
    },
    /// Check access to the configured repository
    Validate,
    /// Remove the saved repository location
    Forget,
    /// Show sync status
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Replace the working copy with the repository's content
    Pull {
        #[arg(long)]
        json: bool,
    },
    /// Commit the working copy to the repository
    Publish {
        /// Commit message
        #[arg(short, long, default_value = DEFAULT_PUBLISH_MESSAGE)]
        message: String,
        #[arg(long)]
        json: bool,
    },
    /// Print a document from the working copy
    Show {
        document: DocumentArg,
        #[arg(long)]
        json: bool,
    },
    /// Replace a document in the working copy from a JSON file
    Edit {
        document: DocumentArg,
        /// JSON file holding the new document
        #[arg(long)]
        file: PathBuf,
    },
    /// Export both documents as one JSON bundle
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Discard local edits and return to the bundled defaults
    Reset,
    /// Regenerate data/*.js from content/*.json in a site checkout
    Generate {
        /// Site checkout root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DocumentArg {
    Projects,
    SiteConfig,
}

impl From<DocumentArg> for DocumentKind {
    fn from(arg: DocumentArg) -> Self {
        match arg {
            DocumentArg::Projects => DocumentKind::Projects,
            DocumentArg::SiteConfig => DocumentKind::SiteConfig,
        }
    }
}

/// Initialize tracing subscriber with env filter, writing to stderr
fn init_tracing(verbose: bool) {
    let default = if verbose { "folio=debug" } else { "folio=info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

pub async fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        // Show help when no command provided
        let _ = Cli::parse_from(["folio", "--help"]);
        return Ok(());
    };

    if let Commands::Generate { root } = &command {
        println!("{}", commands::content::generate(root)?);
        return Ok(());
    }

    let output = execute(command, cli.data_dir, cli.api_url).await?;
    println!("{}", output);
    Ok(())
}

async fn execute(
    command: Commands,
    data_dir: Option<PathBuf>,
    api_url: Option<String>,
) -> CliResult<String> {
    let store = FileStore::open(get_store_path(data_dir))?;

    let overrides = match &command {
        Commands::Setup {
            token,
            owner,
            repo,
            branch,
        } => LocationOverrides {
            token: token.clone(),
            owner: owner.clone(),
            repo: repo.clone(),
            branch: branch.clone(),
        },
        _ => LocationOverrides::default(),
    };
    let stored = WorkingCopy::new(&store).load_location()?;
    let settings = Settings::resolve(overrides, api_url, stored, env_lookup)?;
    let transport = HttpTransport::new(settings.location, settings.transport)?;
    let location = transport.location().clone();
    let mut coordinator = SyncCoordinator::new(ContentRepository::new(transport), store);

    match command {
        Commands::Setup { .. } => commands::setup::setup(&coordinator, &location).await,
        Commands::Validate => commands::setup::validate(&coordinator, &location).await,
        Commands::Forget => commands::setup::forget(&coordinator),
        Commands::Status { json } => commands::sync::status(&coordinator, json),
        Commands::Pull { json } => commands::sync::pull(&mut coordinator, json).await,
        Commands::Publish { message, json } => {
            commands::sync::publish(&mut coordinator, &message, json).await
        }
        Commands::Show { document, json } => {
            commands::content::show(&coordinator, document.into(), json)
        }
        Commands::Edit { document, file } => {
            commands::content::edit(&mut coordinator, document.into(), &file)
        }
        Commands::Export { output } => commands::content::export(&coordinator, output.as_deref()),
        Commands::Reset => commands::content::reset(&mut coordinator),
        Commands::Generate { root } => commands::content::generate(&root),
    }
}
