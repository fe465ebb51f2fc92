use clap::Parser;
use log::info;

use crudbench::api::BenchApi;
use crudbench::conf::Config;
use crudbench::core::{CliArgs, setup_logging};
use crudbench::service::BenchService;

fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = CliArgs::parse();
    info!(args; "crudbench started.");

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .max_blocking_threads(config.pool.max_workers.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let service = BenchService::new(&config).await?;
        BenchApi::new(service).serve(&config.server.addr()).await
    })?;
    Ok(())
}
