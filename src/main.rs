mod campaigns;
mod cli;
mod constants;
mod geo;
mod geocode;
mod location;
mod nbts;
mod server;
#[cfg(test)]
mod test_support;

use anyhow::Context;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = cli::Args::parse();

    server::run(args).await.context("serve failed")
}
