use anyhow::{Context, Result};
use arxiv_pager::client::{checked_offset, Client};
use arxiv_pager::config::{find_config_file, get_config, load_config, AppConfig};
use arxiv_pager::models::{ArxivResult, Search, SortCriterion, SortOrder};
use arxiv_pager::utils::{render_plain, render_table};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// arxiv-pager - page through arXiv search results politely
#[derive(Parser, Debug)]
#[command(name = "arxiv-pager")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search arXiv with pagination, rate limiting and retries", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// One `id<TAB>title` line per result
    Plain,
}

/// Sort field for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SortField {
    /// Sort by relevance
    Relevance,
    /// Sort by last update
    Updated,
    /// Sort by submission date
    Submitted,
}

impl From<SortField> for SortCriterion {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Relevance => SortCriterion::Relevance,
            SortField::Updated => SortCriterion::LastUpdatedDate,
            SortField::Submitted => SortCriterion::SubmittedDate,
        }
    }
}

/// Sort order
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Order {
    /// Ascending order
    Asc,
    /// Descending order
    Desc,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortOrder::Ascending,
            Order::Desc => SortOrder::Descending,
        }
    }
}

/// What to search for
#[derive(Args, Debug)]
struct SearchArgs {
    /// Search query, e.g. 'ti:"quantum" AND au:smith'
    query: Option<String>,

    /// arXiv ID to fetch (repeatable)
    #[arg(long = "id", value_name = "ID")]
    ids: Vec<String>,

    /// Maximum number of results
    #[arg(long, short = 'm')]
    max_results: Option<usize>,

    /// Sort by field
    #[arg(long, value_enum, default_value_t = SortField::Relevance)]
    sort_by: SortField,

    /// Sort order
    #[arg(long, value_enum, default_value_t = Order::Desc)]
    sort_order: Order,
}

impl SearchArgs {
    fn to_search(&self) -> Search {
        let mut search = Search::new(self.query.clone().unwrap_or_default())
            .id_list(self.ids.iter().cloned())
            .sort_by(self.sort_by.into())
            .sort_order(self.sort_order.into());
        if let Some(max) = self.max_results {
            search = search.max_results(max);
        }
        search
    }
}

/// Client overrides; unset values come from the config file or defaults
#[derive(Args, Debug)]
struct ClientArgs {
    /// Results per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Seconds to wait between requests
    #[arg(long)]
    delay: Option<f64>,

    /// Retries per failed page
    #[arg(long)]
    retries: Option<u32>,
}

impl ClientArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(page_size) = self.page_size {
            config.client.page_size = page_size;
        }
        if let Some(delay) = self.delay {
            config.client.delay_seconds = delay;
        }
        if let Some(retries) = self.retries {
            config.client.num_retries = retries;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search and print results
    #[command(alias = "s")]
    Search {
        #[command(flatten)]
        search: SearchArgs,

        /// Skip this many results
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,

        #[command(flatten)]
        client: ClientArgs,
    },

    /// Print the request URL for one page without sending it
    Url {
        #[command(flatten)]
        search: SearchArgs,

        /// Index of the first result on the page
        #[arg(long, default_value_t = 0)]
        start: usize,

        #[command(flatten)]
        client: ClientArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("arxiv_pager={}", env_filter)),
    ));
    if cli.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // Load configuration from file if specified or found in default locations
    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)?
    } else {
        get_config()?
    };

    match cli.command {
        Commands::Search {
            search,
            offset,
            client,
        } => {
            client.apply(&mut config);
            let offset = checked_offset(offset)?;
            let client = Client::with_http_config(config.client, &config.http)?;

            let mut stream = client.results_with_offset(&search.to_search(), offset)?;
            let mut results = Vec::new();
            let mut failure = None;
            while let Some(result) = stream.next().await {
                match result {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            print_results(&results, cli.output)?;
            if let Some(e) = failure {
                return Err(e).context(format!(
                    "Search stopped after {} results",
                    results.len()
                ));
            }
            tracing::info!(
                "{} results from {} pages ({} entries skipped)",
                results.len(),
                stream.pages_fetched(),
                stream.skipped()
            );
        }
        Commands::Url {
            search,
            start,
            client,
        } => {
            client.apply(&mut config);
            let page_size = config.client.page_size;
            let client = Client::with_http_config(config.client, &config.http)?;
            println!("{}", client.format_url(&search.to_search(), start, page_size));
        }
    }

    Ok(())
}

fn print_results(results: &[ArxivResult], format: OutputFormat) -> Result<()> {
    let format = match format {
        OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Table,
        OutputFormat::Auto => OutputFormat::Json,
        other => other,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(results)?),
        OutputFormat::Plain => {
            if !results.is_empty() {
                println!("{}", render_plain(results));
            }
        }
        _ if results.is_empty() => println!("No results."),
        _ => println!("{}", render_table(results)),
    }
    Ok(())
}
