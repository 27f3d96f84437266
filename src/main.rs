use std::env;
use std::net::TcpListener;

use anyhow::Context;
use tracing::{error, info};

use blog_api::configuration::Settings;
use blog_api::{database, observability, startup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init dotenv
    dotenvy::dotenv().ok();

    let json_logs = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let subscriber = observability::get_subscriber("info", json_logs);
    observability::init_subscriber(subscriber);

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let db = database::init_connection_pool(&settings)
        .await
        .context("Could not open the database")?;
    database::run_migrations(&db)
        .await
        .context("Could not migrate the database")?;

    let listener = TcpListener::bind(&settings.listen_on)
        .with_context(|| format!("Could not listen on {}", settings.listen_on))?;
    info!("Listening on {}", settings.listen_on);

    startup::startup(settings, db, listener).await?;

    Ok(())
}
