//! Reminder dispatch: one pass over the owner's bills, sending at most one
//! reminder per bill per calendar day.
//!
//! `last_reminder_sent` is written only after the gateway accepted the
//! message. If that write fails the send still counts as a success, and a
//! later run on the same day may remind again.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{Json, extract::State};
use time::{Date, OffsetDateTime, UtcOffset};
use tracing::{info, warn};

use crate::AppState;
use crate::bills;
use crate::constants::{ERR_GATEWAY_NOT_CONFIGURED, ERR_PHONE_NOT_CONFIGURED};
use crate::database::Db;
use crate::error::{AppError, Result};
use crate::models::{Bill, DispatchReport, ReminderResult, UserProfile};
use crate::profile;
use crate::reminders::reminder_for;
use crate::sms::MessageGateway;

/// Record-store operations the dispatcher depends on, scoped to one owner.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn load_profile(&self) -> Result<Option<UserProfile>>;

    async fn load_bills(&self, today: Date) -> Result<Vec<Bill>>;

    async fn record_reminder_sent(&self, bill_id: &str, at: OffsetDateTime) -> Result<()>;
}

/// [`ReminderStore`] backed by the owner's libsql database.
pub struct LibsqlStore {
    db: Db,
}

impl LibsqlStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReminderStore for LibsqlStore {
    async fn load_profile(&self) -> Result<Option<UserProfile>> {
        profile::find_profile(&self.db).await
    }

    async fn load_bills(&self, today: Date) -> Result<Vec<Bill>> {
        bills::list_bills(&self.db, today).await
    }

    async fn record_reminder_sent(&self, bill_id: &str, at: OffsetDateTime) -> Result<()> {
        bills::record_reminder_sent(&self.db, bill_id, at).await
    }
}

pub struct Dispatcher<S> {
    store: S,
    gateway: Option<Arc<dyn MessageGateway>>,
}

impl<S: ReminderStore> Dispatcher<S> {
    pub fn new(store: S, gateway: Option<Arc<dyn MessageGateway>>) -> Self {
        Self { store, gateway }
    }

    /// Runs one dispatch pass as of `now`.
    ///
    /// Missing gateway credentials, an unverified phone, or a failed profile
    /// or bill fetch abort the run. A failed send only marks that bill's result.
    pub async fn run(&self, now: OffsetDateTime) -> Result<DispatchReport> {
        let gateway = self
            .gateway
            .as_deref()
            .ok_or_else(|| AppError::Config(ERR_GATEWAY_NOT_CONFIGURED.to_string()))?;

        let destination = self
            .store
            .load_profile()
            .await?
            .and_then(|p| p.verified_destination())
            .ok_or_else(|| AppError::NotConfigured(ERR_PHONE_NOT_CONFIGURED.to_string()))?;

        // Markers come back from the store in UTC, so the run's day must be a UTC day too
        let now = now.to_offset(UtcOffset::UTC);
        let today = now.date();
        let bills = self.store.load_bills(today).await?;

        let mut results = Vec::new();
        for bill in &bills {
            let decision = reminder_for(bill, today);
            let Some(template) = decision.template else {
                continue;
            };

            let message = template.render(bill);
            let result = match gateway.send_message(&destination, &message).await {
                Ok(_) => {
                    if let Err(e) = self.store.record_reminder_sent(&bill.id, now).await {
                        warn!(
                            "Reminder for bill {} sent but not recorded, it may be sent again: {}",
                            bill.id, e
                        );
                    }
                    ReminderResult {
                        bill_id: bill.id.clone(),
                        bill_name: bill.name.clone(),
                        days_until_due: decision.days_until_due,
                        success: true,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!("Failed to send reminder for bill {}: {}", bill.id, e);
                    ReminderResult {
                        bill_id: bill.id.clone(),
                        bill_name: bill.name.clone(),
                        days_until_due: decision.days_until_due,
                        success: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }

        let sent = results.iter().filter(|r| r.success).count() as u32;
        let report = DispatchReport {
            success: true,
            processed_count: results.len() as u32,
            sent,
            failed: results.len() as u32 - sent,
            results,
        };

        info!(
            "Reminder run for {}: {} bills checked, {} sent, {} failed",
            today,
            bills.len(),
            report.sent,
            report.failed
        );
        Ok(report)
    }
}

/// Dispatch trigger, meant to be called on a schedule (e.g. once a day).
pub async fn post_dispatch(State(state): State<AppState>) -> Result<Json<DispatchReport>> {
    let db = state.user_db().await?;
    let dispatcher = Dispatcher::new(LibsqlStore::new(db), state.gateway.clone());
    let report = dispatcher.run(OffsetDateTime::now_utc()).await?;
    Ok(Json(report))
}
