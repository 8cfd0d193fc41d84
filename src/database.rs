use anyhow::Result;
use libsql::{Builder, Connection};
use std::{path::Path, sync::Arc};
use tokio::sync::RwLock;

const CREATE_BILLS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS bills (
    id                  TEXT    PRIMARY KEY,
    name                TEXT    NOT NULL,
    amount              REAL    NOT NULL,
    due_date            TEXT    NOT NULL,
    category            TEXT    NOT NULL,
    sms_enabled         INTEGER NOT NULL DEFAULT 0,
    payment_date        TEXT,
    last_reminder_sent  INTEGER,
    created_at          INTEGER NOT NULL,
    updated_at          INTEGER NOT NULL
);
"#;

const CREATE_GIFTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS gifts (
    id              TEXT    PRIMARY KEY,
    gift_name       TEXT    NOT NULL,
    recipient_name  TEXT    NOT NULL,
    amount          REAL    NOT NULL,
    event_type      TEXT    NOT NULL,
    event_date      TEXT    NOT NULL,
    purchased       INTEGER NOT NULL DEFAULT 0,
    purchase_date   TEXT,
    notes           TEXT,
    created_at      INTEGER NOT NULL,
    updated_at      INTEGER NOT NULL
);
"#;

// Single row: the owner's settings
const CREATE_PROFILE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS profile (
    id                     INTEGER PRIMARY KEY CHECK (id = 1),
    phone_number           TEXT    NOT NULL,
    country_code           TEXT    NOT NULL,
    phone_verified         INTEGER NOT NULL DEFAULT 0,
    notifications_enabled  INTEGER NOT NULL DEFAULT 1
);
"#;

const CREATE_BILLS_DUE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_bills_due_date ON bills (due_date)";
const CREATE_GIFTS_EVENT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_gifts_event_date ON gifts (event_date)";

pub type Db = Arc<RwLock<Connection>>;

/// Per-owner isolated DB (user_{id}.db), schema created on open
pub async fn get_user_db(data_dir: &str, owner_id: &str) -> Result<Db> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join(format!("user_{}.db", owner_id));
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;

    for statement in [
        CREATE_BILLS_TABLE,
        CREATE_GIFTS_TABLE,
        CREATE_PROFILE_TABLE,
        CREATE_BILLS_DUE_INDEX,
        CREATE_GIFTS_EVENT_INDEX,
    ] {
        conn.execute(statement, ()).await?;
    }

    tracing::debug!("Opened database for owner {}", owner_id);
    Ok(Arc::new(RwLock::new(conn)))
}
