use anyhow::Context;
use clap::Parser;
use powchain_core::scheduler::NodeTasks;
use powchain_core::Blockchain;
use powchain_node::{api, client::HttpPeerClient, config::Args};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let client =
        HttpPeerClient::new(args.peer_timeout()).context("building the peer HTTP client")?;
    let chain = Arc::new(Blockchain::new(
        args.reward_address(),
        args.chain_config(),
        client,
    ));

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;
    info!(
        reward_address = chain.reward_address(),
        difficulty = chain.config().difficulty,
        "powchain-node listening on http://{}",
        args.listen
    );

    let tasks = NodeTasks::start(
        Arc::clone(&chain),
        Arc::new(args.discovery()),
        args.schedule(),
        !args.no_mine,
    );

    axum::serve(listener, api::router(chain))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("serving HTTP")?;

    tasks.shutdown().await;
    Ok(())
}
