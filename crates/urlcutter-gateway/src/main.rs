use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use urlcutter_gateway::cli::Cli;
use urlcutter_gateway::{shutdown_signal, telemetry, App, AppState};
use urlcutter_shortener::ShortenerService;
use urlcutter_storage::{RedbRepository, StoreSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format);

    info!(
        listen_addr = %cli.listen,
        db_path = %cli.db_path.display(),
        collection = %cli.collection,
        "starting urlcutter"
    );

    let settings = StoreSettings::builder()
        .path(cli.db_path.clone())
        .collection(cli.collection.clone())
        .build();
    let repository = Arc::new(
        RedbRepository::with_settings(settings).context("failed to open url database")?,
    );

    let served = run(&cli, Arc::clone(&repository)).await;

    match Arc::try_unwrap(repository) {
        Ok(repository) => repository.close().context("failed to close url database")?,
        Err(_) => warn!("url database still referenced at shutdown"),
    }

    served
}

async fn run(cli: &Cli, repository: Arc<RedbRepository>) -> anyhow::Result<()> {
    let state = AppState::new(Arc::new(ShortenerService::with_shared(repository)));

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    info!(listen_addr = %listener.local_addr()?, "serving http");

    App::serve(listener, state, shutdown_signal())
        .await
        .context("http server failed")?;

    info!("server stopped");
    Ok(())
}
