use anyhow::Result;

use pawnlog::config::Settings;
use pawnlog::{logging, App};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;
    settings.validate().map_err(anyhow::Error::msg)?;

    let log_path = logging::init_logging()?;
    tracing::info!("Logging to {}", log_path.display());

    App::new(&settings).await?.run().await
}
