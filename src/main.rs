use std::sync::Arc;

use bill_reminder_server::config::Config;
use bill_reminder_server::sms::{MessageGateway, TwilioGateway};
use bill_reminder_server::{AppState, app};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let gateway: Option<Arc<dyn MessageGateway>> = match config.twilio.clone() {
        Some(twilio) => Some(Arc::new(TwilioGateway::new(twilio)?)),
        None => {
            tracing::warn!("SMS gateway not configured, reminder dispatch will fail");
            None
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(config, gateway);

    // Fail early if the owner database cannot be opened
    state.user_db().await?;

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server running on http://{}", bind_address);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
