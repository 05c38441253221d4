use anyhow::Result;
use dotenv::dotenv;
use log::info;

use garrulax::bootstrap::setup::init_logger;
use garrulax::config::SERVER_CONFIG;
use garrulax::state::AppState;

#[rocket::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    init_logger();

    let state = AppState::from_config(&SERVER_CONFIG)?;
    info!(
        "Serving photo backend (original bucket '{}', derived bucket '{}')",
        SERVER_CONFIG.original_bucket, SERVER_CONFIG.derived_bucket
    );

    garrulax::build_rocket(state).launch().await?;
    Ok(())
}
