//! Recurring bill and gift tracker with SMS due-date reminders.

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod bills;
pub mod budget;
pub mod config;
pub mod constants;
pub mod database;
pub mod dispatcher;
pub mod error;
pub mod gifts;
pub mod models;
pub mod profile;
pub mod reminders;
pub mod sms;
pub mod status;
pub mod utils;

use config::Config;
use database::{Db, get_user_db};
use error::AppError;
use sms::MessageGateway;

/// Shared handler context. The owner and data path come from `config`; the
/// gateway is absent when no credentials were configured.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Option<Arc<dyn MessageGateway>>,
}

impl AppState {
    pub fn new(config: Config, gateway: Option<Arc<dyn MessageGateway>>) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
        }
    }

    pub async fn user_db(&self) -> Result<Db, AppError> {
        get_user_db(&self.config.data_path, &self.config.owner_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to open owner database: {}", e);
                AppError::Database(constants::ERR_DATABASE_ACCESS.to_string())
            })
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/bills", get(bills::get_bills).post(bills::post_bill))
        .route("/bills/summary", get(bills::get_bill_summary))
        .route(
            "/bills/{id}",
            get(bills::get_bill_by_id)
                .put(bills::put_bill)
                .delete(bills::delete_bill_by_id),
        )
        .route("/bills/{id}/paid", post(bills::post_bill_paid))
        .route("/bills/{id}/unpaid", post(bills::post_bill_unpaid))
        .route("/gifts", get(gifts::get_gifts).post(gifts::post_gift))
        .route("/gifts/upcoming", get(gifts::get_upcoming_gifts))
        .route("/gifts/budget", get(gifts::get_gift_budget))
        .route(
            "/gifts/{id}",
            get(gifts::get_gift_by_id)
                .put(gifts::put_gift)
                .delete(gifts::delete_gift_by_id),
        )
        .route("/gifts/{id}/purchased", post(gifts::post_gift_purchased))
        .route("/gifts/{id}/unpurchased", post(gifts::post_gift_unpurchased))
        .route("/profile", get(profile::get_profile_settings))
        .route("/profile/phone", put(profile::put_phone_number))
        .route("/profile/notifications", put(profile::put_notifications))
        .route("/profile/test-message", post(profile::post_test_message))
        .route("/reminders/dispatch", post(dispatcher::post_dispatch))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
