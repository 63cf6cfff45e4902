use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use leetscrape::api::client::{LeetCodeClient, browser_session};
use leetscrape::config::Config;
use leetscrape::pipeline::{self, FetchOptions};
use leetscrape::select::Selection;
use leetscrape::store::{OutputStore, SnapshotRef, TransformOutputs};

const DEFAULT_RANGE: (u64, u64) = (2200, 2210);

#[derive(Parser)]
#[command(name = "leetscrape", about = "Fetch LeetCode problems and export them as JSON and CSV")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Directory for snapshots and exports (overrides config)
    #[arg(long, global = true)]
    output_dir: Option<String>,
    /// LEETCODE_SESSION cookie value
    #[arg(long, global = true)]
    session: Option<String>,
    /// csrftoken cookie value
    #[arg(long, global = true)]
    csrf: Option<String>,
    /// Delay between detail requests in milliseconds (minimum 1000)
    #[arg(long, global = true)]
    delay_ms: Option<u64>,
    /// Number of raw snapshots to keep, 0 keeps all
    #[arg(long, global = true)]
    keep: Option<usize>,
    /// Import LeetCode cookies from the local browser
    #[arg(long, global = true)]
    browser_cookies: bool,
}

#[derive(Args)]
struct SelectionArgs {
    /// Fetch problems whose frontend id is within LOW..=HIGH
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"], conflicts_with = "latest")]
    range: Option<Vec<u64>>,
    /// Fetch the N most recently added problems
    #[arg(short = 'n', long)]
    latest: Option<usize>,
}

impl SelectionArgs {
    fn selection(&self) -> Selection {
        match (&self.range, self.latest) {
            (Some(range), _) if range.len() == 2 => Selection::Range {
                low: range[0],
                high: range[1],
            },
            (_, Some(n)) => Selection::Latest(n),
            _ => Selection::Range {
                low: DEFAULT_RANGE.0,
                high: DEFAULT_RANGE.1,
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch problem details and save a raw snapshot
    Fetch(SelectionArgs),
    /// Turn a raw snapshot into canonical JSON and CSV
    Transform {
        /// Snapshot to transform (default: the one named by the marker file)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Fetch and transform in one pipeline
    Run(SelectionArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli.common)?;
    let store = OutputStore::new(config.output_path());

    match cli.command {
        Commands::Fetch(args) => {
            let client = client_for(&config)?;
            let outcome =
                pipeline::fetch_pass(&client, args.selection(), &store, fetch_options(&config))
                    .await?;
            match outcome.snapshot {
                Some(snapshot) => println!(
                    "Fetched {} of {} problems ({} skipped), saved to {}",
                    outcome.report.details.len(),
                    outcome.selected,
                    outcome.report.skipped.len(),
                    snapshot.path.display()
                ),
                None => println!("Nothing fetched."),
            }
        }
        Commands::Transform { input } => {
            let outputs = match input {
                Some(path) => vec![pipeline::transform_pass(&store, &SnapshotRef::new(path))?],
                None => pipeline::transform_latest(&store)?,
            };
            outputs.iter().for_each(print_outputs);
        }
        Commands::Run(args) => {
            let client = client_for(&config)?;
            match pipeline::run(&client, args.selection(), &store, fetch_options(&config)).await? {
                Some(outputs) => print_outputs(&outputs),
                None => println!("Nothing fetched."),
            }
        }
    }

    Ok(())
}

fn resolve_config(args: &CommonArgs) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(ref dir) = args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(ref session) = args.session {
        config.leetcode_session = Some(session.clone());
    }
    if let Some(ref csrf) = args.csrf {
        config.csrf_token = Some(csrf.clone());
    }
    if let Some(delay) = args.delay_ms {
        config.request_delay_ms = delay;
    }
    if let Some(keep) = args.keep {
        config.keep_recent = keep;
    }
    config.browser_cookies |= args.browser_cookies;

    if config.browser_cookies && !config.is_authenticated() {
        match browser_session() {
            Ok((session, csrf)) => {
                config.leetcode_session = session.or(config.leetcode_session.take());
                config.csrf_token = csrf.or(config.csrf_token.take());
            }
            Err(err) => warn!(error = %err, "continuing without browser cookies"),
        }
    }
    Ok(config)
}

fn client_for(config: &Config) -> Result<LeetCodeClient> {
    if config.is_authenticated() {
        info!("using authenticated session");
    } else {
        info!("running anonymously, company tags will be empty");
    }
    LeetCodeClient::new(config.leetcode_session.as_deref(), config.csrf_token.as_deref())
}

fn fetch_options(config: &Config) -> FetchOptions {
    FetchOptions {
        delay: config.request_delay(),
        keep_recent: config.keep_recent,
    }
}

fn print_outputs(outputs: &TransformOutputs) {
    println!("Generated {}", outputs.json.display());
    match outputs.csv {
        Some(ref csv) => println!("Generated {}", csv.display()),
        None => println!("No records, CSV not written"),
    }
    if !outputs.rejected.is_empty() {
        println!("Skipped {} unreadable snapshot records", outputs.rejected.len());
    }
}
