use std::{process::ExitCode, sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use proxyrace::{
    Candidate, CandidateSource, HttpProbe, ProbeConfig, ProxyListSource, StaticSource,
};
use reqwest::{Client, StatusCode};
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_LIST_URL: &str = "https://free-proxy-list.net";
const DEFAULT_TARGET: &str = "https://www.google.com";

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log probe progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Subcommand)]
enum Commands {
    /// Probe every candidate proxy at once and print the first healthy one.
    Race(RaceArgs),
    /// Print the candidates that would be raced, without probing them.
    List(SourceArgs),
}

#[derive(Args, Clone)]
struct SourceArgs {
    /// page listing proxies as `<td>ip</td><td>port</td>` table rows
    #[arg(long, env = "PROXYRACE_LIST_URL", default_value = DEFAULT_LIST_URL)]
    list_url: Url,
    /// race these proxies instead of fetching the list (repeatable)
    #[arg(long = "candidate")]
    candidates: Vec<String>,
    /// seconds allowed for fetching the proxy list
    #[arg(long, env = "PROXYRACE_FETCH_TIMEOUT", default_value_t = 15)]
    fetch_timeout: u64,
}

#[derive(Args, Clone)]
struct RaceArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// url requested through each proxy to judge its health
    #[arg(long, env = "PROXYRACE_TARGET", default_value = DEFAULT_TARGET)]
    target: Url,
    /// status code the target must answer with
    #[arg(long, env = "PROXYRACE_EXPECT_STATUS", default_value_t = 200)]
    expect_status: u16,
    /// seconds each probe may take
    #[arg(long, env = "PROXYRACE_TIMEOUT", default_value_t = 10)]
    timeout: u64,
}

impl RaceArgs {
    fn probe_config(&self) -> anyhow::Result<ProbeConfig> {
        let status = StatusCode::from_u16(self.expect_status)
            .with_context(|| format!("invalid status code {}", self.expect_status))?;
        Ok(ProbeConfig::through_proxy(self.target.clone())
            .with_expected_status(status)
            .with_timeout(Duration::from_secs(self.timeout)))
    }
}

fn make_robust_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).trust_dns(true).build()
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "proxyrace=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn fetch_candidates(args: &SourceArgs) -> anyhow::Result<Vec<Candidate>> {
    let candidates = if args.candidates.is_empty() {
        let client = make_robust_client(Duration::from_secs(args.fetch_timeout))?;
        ProxyListSource::new(args.list_url.clone(), client)
            .fetch_candidates()
            .await
    } else {
        StaticSource::new(args.candidates.iter().cloned())
            .fetch_candidates()
            .await
    };
    Ok(candidates.map_err(proxyrace::Error::from)?)
}

async fn main_helper(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Race(args) => {
            let probe = Arc::new(HttpProbe::new(args.probe_config()?));
            let candidates = fetch_candidates(&args.source).await?;
            tracing::info!(count = candidates.len(), "racing candidates");
            let winner = proxyrace::race(candidates, probe)
                .await
                .map_err(proxyrace::Error::from)?;
            println!("{}", winner);
        }
        Commands::List(args) => {
            for candidate in fetch_candidates(&args).await? {
                println!("{}", candidate);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(main_helper(cli.command)));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
