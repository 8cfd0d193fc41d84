#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bill_reminder_server::AppState;
use bill_reminder_server::bills::create_bill;
use bill_reminder_server::config::Config;
use bill_reminder_server::database::{Db, get_user_db};
use bill_reminder_server::dispatcher::{LibsqlStore, ReminderStore};
use bill_reminder_server::error::{AppError, Result};
use bill_reminder_server::models::{Bill, BillCategory, CreateBillPayload, UserProfile};
use bill_reminder_server::profile::save_profile;
use bill_reminder_server::sms::{MessageGateway, SentMessage, SmsError};
use tempfile::{TempDir, tempdir};
use time::macros::{date, datetime};
use time::{Date, Duration, OffsetDateTime};
use uuid::Uuid;

// Fixed reference day so date arithmetic in tests never depends on the wall clock
pub const TODAY: Date = date!(2026 - 10 - 18);
pub const NOW: OffsetDateTime = datetime!(2026-10-18 09:30:00 UTC);

pub fn days_from_today(days: i64) -> Date {
    TODAY + Duration::days(days)
}

pub async fn setup_test_environment() -> (String, String, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let data_path = temp_dir
        .path()
        .to_str()
        .expect("Failed to convert path to string")
        .to_string();
    let owner_id = Uuid::new_v4().to_string();

    get_user_db(&data_path, &owner_id).await.unwrap_or_else(|e| {
        panic!(
            "Failed to initialize database for owner {} at {}: {}",
            owner_id, data_path, e
        )
    });

    (data_path, owner_id, temp_dir)
}

pub async fn setup_test_db() -> (Db, TempDir) {
    let (data_path, owner_id, temp_dir) = setup_test_environment().await;
    let db = get_user_db(&data_path, &owner_id)
        .await
        .unwrap_or_else(|e| panic!("Failed to open database for {}: {}", owner_id, e));
    (db, temp_dir)
}

/// Application state pointing at the environment from `setup_test_environment`.
pub fn test_state(data_path: &str, owner_id: &str) -> AppState {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: "0".to_string(),
        data_path: data_path.to_string(),
        owner_id: owner_id.to_string(),
        twilio: None,
    };
    AppState::new(config, None)
}

pub fn bill_payload(name: &str, amount: f64, due_date: Date, sms_enabled: bool) -> CreateBillPayload {
    CreateBillPayload {
        name: name.to_string(),
        amount,
        due_date,
        category: BillCategory::Utilities,
        sms_enabled,
    }
}

pub async fn create_test_bill(
    db: &Db,
    name: &str,
    amount: f64,
    due_in_days: i64,
    sms_enabled: bool,
) -> Bill {
    create_bill(
        db,
        bill_payload(name, amount, days_from_today(due_in_days), sms_enabled),
        TODAY,
    )
    .await
    .unwrap_or_else(|e| panic!("Failed to insert test bill '{}': {}", name, e))
}

/// In-memory bill for pure policy tests.
pub fn sample_bill(due_in_days: i64) -> Bill {
    let due_date = days_from_today(due_in_days);
    Bill {
        id: Uuid::new_v4().to_string(),
        name: "Electric".to_string(),
        amount: 125.5,
        due_date,
        category: BillCategory::Utilities,
        status: bill_reminder_server::status::calculate_status(due_date, None, TODAY),
        sms_enabled: true,
        payment_date: None,
        last_reminder_sent: None,
    }
}

pub async fn save_verified_phone(db: &Db) {
    save_profile(
        db,
        &UserProfile {
            phone_number: "(555) 123-4567".to_string(),
            country_code: "+1".to_string(),
            phone_verified: true,
            notifications_enabled: true,
        },
    )
    .await
    .expect("Failed to save test profile");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    pub to: String,
    pub body: String,
}

/// Records every send. Bodies containing `fail_on` are rejected.
#[derive(Default)]
pub struct MockGateway {
    pub sent: Mutex<Vec<SentSms>>,
    pub fail_on: Option<String>,
}

impl MockGateway {
    pub fn failing_on(needle: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_on: Some(needle.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<SentSms> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageGateway for MockGateway {
    async fn send_message(&self, to: &str, body: &str) -> std::result::Result<SentMessage, SmsError> {
        if self.fail_on.as_deref().is_some_and(|n| body.contains(n)) {
            return Err(SmsError::Rejected {
                status: 400,
                message: "The 'To' number is not a valid phone number.".to_string(),
            });
        }
        self.sent.lock().unwrap().push(SentSms {
            to: to.to_string(),
            body: body.to_string(),
        });
        Ok(SentMessage {
            id: Some(format!("SM{}", Uuid::new_v4().simple())),
            to: to.to_string(),
        })
    }
}

pub fn gateway(mock: &Arc<MockGateway>) -> Option<Arc<dyn MessageGateway>> {
    Some(mock.clone() as Arc<dyn MessageGateway>)
}

/// Delegates to the real store but refuses to record reminders.
pub struct UnrecordedStore(pub LibsqlStore);

#[async_trait]
impl ReminderStore for UnrecordedStore {
    async fn load_profile(&self) -> Result<Option<UserProfile>> {
        self.0.load_profile().await
    }

    async fn load_bills(&self, today: Date) -> Result<Vec<Bill>> {
        self.0.load_bills(today).await
    }

    async fn record_reminder_sent(&self, _bill_id: &str, _at: OffsetDateTime) -> Result<()> {
        Err(AppError::Database("disk I/O error".to_string()))
    }
}

/// Store whose bill query always fails.
pub struct UnreachableStore;

#[async_trait]
impl ReminderStore for UnreachableStore {
    async fn load_profile(&self) -> Result<Option<UserProfile>> {
        Ok(Some(UserProfile {
            phone_number: "5551234567".to_string(),
            country_code: "+1".to_string(),
            phone_verified: true,
            notifications_enabled: true,
        }))
    }

    async fn load_bills(&self, _today: Date) -> Result<Vec<Bill>> {
        Err(AppError::Database("connection refused".to_string()))
    }

    async fn record_reminder_sent(&self, _bill_id: &str, _at: OffsetDateTime) -> Result<()> {
        Ok(())
    }
}
