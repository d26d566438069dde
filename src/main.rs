//! wiki-dl command-line interface
//!
//! `wiki-dl [QUERY]` searches Wikipedia and saves each matching page's
//! reference list to its own text file. The hidden `worker` subcommand is the
//! child-process half of the process-pool strategy: it handles exactly one
//! identifier and prints its outcome as a single JSON line on stdout.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use url::Url;

use wiki_dl::{BatchRunner, CollisionPolicy, Config, Strategy, worker};

#[derive(Parser)]
#[command(
    name = "wiki-dl",
    version,
    about = "Save Wikipedia reference lists to text files, concurrently"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Process one identifier and print its outcome as JSON (internal)
    #[command(hide = true)]
    Worker(WorkerArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Search query; prompted for interactively when omitted
    query: Option<String>,

    /// Execution strategy
    #[arg(long, value_enum, default_value = "sequential")]
    strategy: StrategyArg,

    /// Worker count for the pooled strategies
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Run every strategy over the same identifiers and report each duration
    #[arg(long, conflicts_with = "strategy")]
    compare: bool,

    /// Output directory (default: ./wiki_dl)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// MediaWiki API endpoint (default: English Wikipedia)
    #[arg(long)]
    endpoint: Option<Url>,

    /// Disambiguate colliding file names instead of overwriting
    #[arg(long)]
    disambiguate: bool,
}

#[derive(Args)]
struct WorkerArgs {
    /// Identifier to process
    identifier: String,

    #[arg(long)]
    endpoint: Url,

    #[arg(long)]
    user_agent: Option<String>,

    #[arg(long)]
    output_dir: PathBuf,

    #[arg(long, default_value = "txt")]
    extension: String,

    #[arg(long)]
    disambiguate: bool,

    #[arg(long)]
    follow_redirects: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Sequential,
    ThreadPool,
    ProcessPool,
}

impl StrategyArg {
    fn to_strategy(self, max_workers: usize) -> Strategy {
        match self {
            Self::Sequential => Strategy::Sequential,
            Self::ThreadPool => Strategy::ThreadPool { max_workers },
            Self::ProcessPool => Strategy::ProcessPool { max_workers },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Worker(args)) => run_worker(args).await,
        None => run_batch(cli.run).await,
    }
}

/// Child-process half of the process-pool strategy
async fn run_worker(args: WorkerArgs) -> ExitCode {
    // Logs go to stderr; stdout carries exactly one JSON outcome line
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::default();
    config.api.endpoint = args.endpoint;
    if let Some(user_agent) = args.user_agent {
        config.api.user_agent = user_agent;
    }
    config.api.exact_match = !args.follow_redirects;
    config.output.dir = args.output_dir;
    config.output.extension = args.extension;
    config.output.collision = if args.disambiguate {
        CollisionPolicy::Disambiguate
    } else {
        CollisionPolicy::Overwrite
    };

    let outcome = worker::execute(&config, &args.identifier).await;
    match serde_json::to_string(&outcome) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_batch(args: RunArgs) -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let mut config = Config::default();
    if let Some(dir) = args.output_dir {
        config.output.dir = dir;
    }
    if let Some(endpoint) = args.endpoint {
        config.api.endpoint = endpoint;
    }
    if args.disambiguate {
        config.output.collision = CollisionPolicy::Disambiguate;
    }

    let query = match args.query {
        Some(query) => query,
        None => match prompt_for_query() {
            Ok(query) => query,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let runner = match BatchRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // A failed search is fatal: without identifiers there is no batch
    let identifiers = match runner.search(&query).await {
        Ok(identifiers) => identifiers,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if identifiers.is_empty() {
        println!("No pages matched the query.");
        return ExitCode::SUCCESS;
    }

    let strategies = if args.compare {
        vec![
            Strategy::Sequential,
            Strategy::ThreadPool {
                max_workers: args.workers,
            },
            Strategy::ProcessPool {
                max_workers: args.workers,
            },
        ]
    } else {
        vec![args.strategy.to_strategy(args.workers)]
    };

    for strategy in strategies {
        match runner.run(&identifiers, strategy).await {
            Ok(report) => {
                println!(
                    "{strategy}: {} succeeded, {} failed in {:.2?}",
                    report.succeeded(),
                    report.failed(),
                    report.elapsed
                );
            }
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn prompt_for_query() -> std::io::Result<String> {
    println!("Search for references from Wikipedia pages");
    print!("Enter: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
