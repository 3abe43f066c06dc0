use std::{path::PathBuf, process::exit, sync::Arc, time::Duration};

use cfg_if::cfg_if;
use chain_miner::{
    config::load_config_file,
    manager::{CoreManager, MinerSettings},
    reporter::StatusReporter,
    restful::{ChainAuthority, ChainStore},
    session::Session,
};
use clap::Parser;
use shared::{log::init_log, utils::RetryPolicy};
use tokio::{signal, sync::mpsc::unbounded_channel};
use tracing::*;

cfg_if! {
    if #[cfg(feature = "build-version")] {
        include!(concat!(env!("OUT_DIR"), "/version.rs"));
    } else {
        pub const VERSION: &str = "unknown";
    }
}

#[derive(Parser, Debug)]
#[command(about, version)]
struct Args {
    #[arg(
        long,
        value_name = "URL",
        help = "Chain authority base url",
        default_value = "http://localhost:5000"
    )]
    endpoint: String,

    #[arg(long, value_name = "PATH", help = "Miner config file", default_value = "config.json")]
    config: PathBuf,

    #[arg(long, value_name = "WORKERS", help = "The number of search threads per round")]
    workers: Option<usize>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Length of one search round, hash rate is reported after each [default: 30]"
    )]
    interval: Option<u64>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Wait between failed chain fetches",
        default_value = "10"
    )]
    backoff: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_log("chain_miner=debug");

    let args = Args::parse();

    let config = match load_config_file(&args.config) {
        Ok(config) => config,
        Err(err) if err.needs_operator() => {
            println!("{err}");
            exit(0);
        }
        Err(err) => anyhow::bail!(err),
    };

    let defaults = MinerSettings::default();
    let settings = MinerSettings {
        max_workers: args.workers.or(config.max_workers).unwrap_or(defaults.max_workers),
        report_interval: args
            .interval
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or(defaults.report_interval),
    };

    info!(
        "VERSION: {VERSION}, workers: {}, user: {}/{}, authority: {}",
        settings.max_workers, config.username, config.client_id, args.endpoint
    );

    let store: Arc<dyn ChainStore> = Arc::new(ChainAuthority::new(&args.endpoint)?);

    let (hashrate_tx, hashrate_rx) = unbounded_channel();
    let reporter = StatusReporter::new(store.clone(), config.username, config.client_id);
    let reporter_handle = reporter.start(hashrate_rx);

    let session = Session::new(store, CoreManager::new(settings, hashrate_tx))
        .with_fetch_policy(RetryPolicy::forever(Duration::from_secs(args.backoff)));

    let result = tokio::select! {
        res = session.run() => res,
        _ = signal::ctrl_c() => {
            info!("ctrl+c received, abandoning running workers");
            Ok(())
        }
    };
    reporter_handle.abort();

    // losing a solved block is fatal, surface it with a non-zero exit
    result.map_err(|err| {
        error!("{err}");
        anyhow::anyhow!(err)
    })
}
