//! `dashctl` entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dash_core::MaterialCategory;
use dash_data::config::load_dotenv;
use dash_data::{FetcherConfig, PageClient, WidgetDataFetcher};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "dashctl", version, about = "Inspect, build and sync dashboard documents")]
struct Cli {
    /// Backend address, overrides DASH_API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token, overrides DASH_API_TOKEN
    #[arg(long, global = true)]
    token: Option<String>,

    /// Request timeout in seconds, overrides DASH_API_TIMEOUT_SECS
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the widget material catalog
    Materials {
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },

    /// List the prop keys a field mapping may target for a widget type
    Targets { widget_type: String },

    /// Resolve every widget's render props in an exported dashboard
    Resolve {
        file: PathBuf,

        /// JSON object of canned responses keyed by request URL
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },

    /// Create a dashboard export
    New {
        name: String,

        #[arg(long)]
        out: PathBuf,

        /// Widget types to add, in order
        #[arg(long = "add")]
        widgets: Vec<String>,
    },

    /// Download a page's dashboard into a file
    Pull {
        page_id: String,

        #[arg(long)]
        out: PathBuf,
    },

    /// Upload an exported dashboard as a page's config
    Push { page_id: String, file: PathBuf },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CategoryArg {
    Chart,
    List,
    Widget,
}

impl From<CategoryArg> for MaterialCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Chart => MaterialCategory::Chart,
            CategoryArg::List => MaterialCategory::List,
            CategoryArg::Widget => MaterialCategory::Widget,
        }
    }
}

impl Cli {
    /// Environment settings with command line overrides applied
    fn fetcher_config(&self) -> Result<FetcherConfig> {
        let mut config = FetcherConfig::from_env().context("invalid API settings in the environment")?;
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(token) = &self.token {
            config = config.with_token(token);
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config.validate().context("invalid API settings")?;
        Ok(config)
    }

    fn page_client(&self) -> Result<PageClient> {
        Ok(PageClient::http(self.fetcher_config()?)?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Materials { category } => {
            print!("{}", commands::list_materials(category.map(Into::into)));
        }
        Command::Targets { widget_type } => {
            print!("{}", commands::list_targets(widget_type)?);
        }
        Command::Resolve { file, fixtures } => {
            let fetcher = match fixtures {
                Some(path) => WidgetDataFetcher::new(Arc::new(commands::load_fixtures(path)?)),
                None => WidgetDataFetcher::http(cli.fetcher_config()?)?,
            };
            let resolved = commands::resolve_dashboard(file, fetcher).await?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        Command::New { name, out, widgets } => {
            let count = commands::create_dashboard(name, widgets, out)?;
            info!(path = %out.display(), widgets = count, "dashboard written");
        }
        Command::Pull { page_id, out } => {
            let client = cli.page_client()?;
            let count = commands::pull_page(&client, page_id, out).await?;
            info!(page_id = %page_id, path = %out.display(), widgets = count, "page pulled");
        }
        Command::Push { page_id, file } => {
            let client = cli.page_client()?;
            let version = commands::push_page(&client, page_id, file).await?;
            info!(page_id = %page_id, version, "page pushed");
        }
    }

    Ok(())
}
