//! Deploys local directories to the static hosting platform.

mod args;
mod config;

use std::sync::Arc;

use clap::Parser;
use staticship_api::Client;
use staticship_deploy::{DeployContext, DeployInput, DeployOptions, Deployer};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::Args;
use config::DeployerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,staticship=debug")),
        )
        .init();

    let args = Args::parse();
    let config = DeployerConfig::load()?;
    info!(api_url = %config.api_url, "starting deploy");

    let client = Client::new(&config.api_key)?.with_base_url(config.api_url.clone());
    let ctx = Arc::new(DeployContext::with_client(Arc::new(client)));
    let mut deployer = Deployer::new(ctx);

    if let Some(mut events) = deployer.take_events() {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                info!(?event, "deploy progress");
            }
        });
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    let options = DeployOptions {
        flatten: !args.preserve_dirs,
        spa_detect: config.spa_detect && !args.no_spa,
        labels: args.labels,
        via: config.via,
        cancel: Some(cancel),
    };

    let deployment = deployer
        .deploy(DeployInput::Paths(args.paths), &options)
        .await?;
    println!("{}", serde_json::to_string_pretty(&deployment)?);
    Ok(())
}
