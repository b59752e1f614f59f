use std::sync::Arc;

use anyhow::Context;

use bookshelf_gateway::Gateway;
use bookshelf_kernel::session::SessionStore;
use bookshelf_kernel::settings::Settings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        endpoint = %settings.client.endpoint,
        "bookshelf-app bootstrap starting"
    );

    let session = Arc::new(SessionStore::open(&settings.storage.session_path));
    if session.token().is_some() {
        tracing::info!(remembered = session.remember(), "restored existing session");
    }

    Gateway::install(
        Gateway::from_settings(&settings, Arc::clone(&session))
            .context("failed to configure gateway")?,
    );

    tracing::info!("bookshelf-app bootstrap complete");
    Ok(())
}
