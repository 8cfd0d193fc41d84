use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::AppState;
use crate::budget::summarize_bills;
use crate::constants::MAX_BILL_NAME_LENGTH;
use crate::database::Db;
use crate::error::{AppError, Result};
use crate::models::{
    Bill, BillCategory, BillStatus, BillSummary, CreateBillPayload, GetBillsQuery,
    UpdateBillPayload,
};
use crate::status::calculate_status;
use crate::utils::{
    db_error, db_error_with_context, optional_date, optional_timestamp, parse_date, today,
    validate_amount, validate_string_length,
};

const BILL_COLUMNS: &str =
    "id, name, amount, due_date, category, sms_enabled, payment_date, last_reminder_sent";

pub fn validate_bill_name(name: &str) -> Result<()> {
    validate_string_length(name, "Bill name", MAX_BILL_NAME_LENGTH)
}

pub fn validate_bill_amount(amount: f64) -> Result<()> {
    validate_amount(amount, "Bill amount")
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound {
        entity: "Bill",
        id: id.to_string(),
    }
}

/// Reads a bill row and projects its status as of `today`.
pub fn extract_bill_from_row(row: libsql::Row, today: Date) -> Result<Bill> {
    let invalid = |_| db_error_with_context("invalid bill data");

    let id: String = row.get(0).map_err(invalid)?;
    let name: String = row.get(1).map_err(invalid)?;
    let amount: f64 = row.get(2).map_err(invalid)?;
    let due_date: String = row.get(3).map_err(invalid)?;
    let category: String = row.get(4).map_err(invalid)?;
    let sms_enabled: i64 = row.get(5).map_err(invalid)?;
    let payment_date = optional_date(row.get_value(6).map_err(invalid)?)?;
    let last_reminder_sent = optional_timestamp(row.get_value(7).map_err(invalid)?)?;

    let due_date = parse_date(&due_date)?;
    let category = category
        .parse::<BillCategory>()
        .map_err(|e| db_error_with_context(&e))?;

    Ok(Bill {
        id,
        name,
        amount,
        due_date,
        category,
        status: calculate_status(due_date, payment_date, today),
        sms_enabled: sms_enabled != 0,
        payment_date,
        last_reminder_sent,
    })
}

async fn query_bills(
    db: &Db,
    sql: &str,
    params: impl libsql::params::IntoParams,
    today: Date,
) -> Result<Vec<Bill>> {
    let conn = db.read().await;
    let mut rows = conn
        .query(sql, params)
        .await
        .map_err(|_| db_error_with_context("failed to query bills"))?;

    let mut bills = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        bills.push(extract_bill_from_row(row, today)?);
    }
    Ok(bills)
}

pub async fn create_bill(db: &Db, payload: CreateBillPayload, today: Date) -> Result<Bill> {
    validate_bill_name(&payload.name)?;
    validate_bill_amount(payload.amount)?;

    let id = Uuid::new_v4().to_string();
    let name = payload.name.trim().to_string();
    let now = OffsetDateTime::now_utc().unix_timestamp();

    let conn = db.write().await;
    conn.execute(
        "INSERT INTO bills (id, name, amount, due_date, category, sms_enabled, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        (
            id.as_str(),
            name.as_str(),
            payload.amount,
            payload.due_date.to_string(),
            payload.category.as_str(),
            payload.sms_enabled as i64,
            now,
            now,
        ),
    )
    .await
    .map_err(|_| db_error_with_context("bill creation failed"))?;

    tracing::info!("Created bill {} ({})", id, name);

    Ok(Bill {
        id,
        name,
        amount: payload.amount,
        due_date: payload.due_date,
        category: payload.category,
        status: calculate_status(payload.due_date, None, today),
        sms_enabled: payload.sms_enabled,
        payment_date: None,
        last_reminder_sent: None,
    })
}

/// All bills, earliest due date first.
pub async fn list_bills(db: &Db, today: Date) -> Result<Vec<Bill>> {
    let sql = format!("SELECT {} FROM bills ORDER BY due_date ASC", BILL_COLUMNS);
    query_bills(db, &sql, (), today).await
}

pub async fn list_bills_by_category(
    db: &Db,
    category: BillCategory,
    today: Date,
) -> Result<Vec<Bill>> {
    let sql = format!(
        "SELECT {} FROM bills WHERE category = ? ORDER BY due_date ASC",
        BILL_COLUMNS
    );
    query_bills(db, &sql, [category.as_str()], today).await
}

/// Filters on the status projected for `today`, not on anything stored.
pub async fn list_bills_by_status(db: &Db, status: BillStatus, today: Date) -> Result<Vec<Bill>> {
    let bills = list_bills(db, today).await?;
    Ok(bills.into_iter().filter(|b| b.status == status).collect())
}

pub async fn get_bill(db: &Db, id: &str, today: Date) -> Result<Bill> {
    let sql = format!("SELECT {} FROM bills WHERE id = ?", BILL_COLUMNS);
    query_bills(db, &sql, [id], today)
        .await?
        .pop()
        .ok_or_else(|| not_found(id))
}

pub async fn update_bill(
    db: &Db,
    id: &str,
    payload: UpdateBillPayload,
    today: Date,
) -> Result<Bill> {
    if payload.name.is_none()
        && payload.amount.is_none()
        && payload.due_date.is_none()
        && payload.category.is_none()
        && payload.sms_enabled.is_none()
    {
        return Err(AppError::Validation(
            "At least one field must be provided for update".to_string(),
        ));
    }
    if let Some(name) = &payload.name {
        validate_bill_name(name)?;
    }
    if let Some(amount) = payload.amount {
        validate_bill_amount(amount)?;
    }

    let existing = get_bill(db, id, today).await?;
    let updated = Bill {
        name: payload
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name),
        amount: payload.amount.unwrap_or(existing.amount),
        due_date: payload.due_date.unwrap_or(existing.due_date),
        category: payload.category.unwrap_or(existing.category),
        sms_enabled: payload.sms_enabled.unwrap_or(existing.sms_enabled),
        ..existing
    };

    let conn = db.write().await;
    let affected = conn
        .execute(
            "UPDATE bills SET name = ?, amount = ?, due_date = ?, category = ?, sms_enabled = ?, updated_at = ?
             WHERE id = ?",
            (
                updated.name.as_str(),
                updated.amount,
                updated.due_date.to_string(),
                updated.category.as_str(),
                updated.sms_enabled as i64,
                OffsetDateTime::now_utc().unix_timestamp(),
                id,
            ),
        )
        .await
        .map_err(|_| db_error_with_context("bill update failed"))?;

    if affected == 0 {
        return Err(not_found(id));
    }

    Ok(updated.project(today))
}

async fn set_payment_date(db: &Db, id: &str, payment_date: Option<Date>) -> Result<()> {
    let conn = db.write().await;
    let affected = conn
        .execute(
            "UPDATE bills SET payment_date = ?, updated_at = ? WHERE id = ?",
            (
                crate::utils::date_value(payment_date),
                OffsetDateTime::now_utc().unix_timestamp(),
                id,
            ),
        )
        .await
        .map_err(|_| db_error_with_context("failed to update payment date"))?;

    if affected == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

/// Records payment on `today`. Leaves `last_reminder_sent` untouched.
pub async fn mark_bill_paid(db: &Db, id: &str, today: Date) -> Result<Bill> {
    set_payment_date(db, id, Some(today)).await?;
    get_bill(db, id, today).await
}

/// Clears the payment date so status falls back to the due date alone.
pub async fn mark_bill_unpaid(db: &Db, id: &str, today: Date) -> Result<Bill> {
    set_payment_date(db, id, None).await?;
    get_bill(db, id, today).await
}

pub async fn delete_bill(db: &Db, id: &str) -> Result<()> {
    let conn = db.write().await;
    let affected = conn
        .execute("DELETE FROM bills WHERE id = ?", [id])
        .await
        .map_err(|_| db_error_with_context("bill deletion failed"))?;

    if affected == 0 {
        return Err(not_found(id));
    }
    tracing::info!("Deleted bill {}", id);
    Ok(())
}

/// The only writer of `last_reminder_sent`.
pub async fn record_reminder_sent(db: &Db, id: &str, at: OffsetDateTime) -> Result<()> {
    let conn = db.write().await;
    let affected = conn
        .execute(
            "UPDATE bills SET last_reminder_sent = ? WHERE id = ?",
            (at.unix_timestamp(), id),
        )
        .await
        .map_err(|_| db_error_with_context("failed to record reminder"))?;

    if affected == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

// HTTP handlers

pub async fn get_bills(
    State(state): State<AppState>,
    Query(query): Query<GetBillsQuery>,
) -> Result<Json<Vec<Bill>>> {
    let db = state.user_db().await?;
    let today = today();

    let bills = match (query.category, query.status) {
        (Some(category), status) => list_bills_by_category(&db, category, today)
            .await?
            .into_iter()
            .filter(|b| status.is_none_or(|s| b.status == s))
            .collect(),
        (None, Some(status)) => list_bills_by_status(&db, status, today).await?,
        (None, None) => list_bills(&db, today).await?,
    };

    Ok(Json(bills))
}

pub async fn post_bill(
    State(state): State<AppState>,
    Json(payload): Json<CreateBillPayload>,
) -> Result<(StatusCode, Json<Bill>)> {
    let db = state.user_db().await?;
    let bill = create_bill(&db, payload, today()).await?;
    Ok((StatusCode::CREATED, Json(bill)))
}

pub async fn get_bill_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Bill>> {
    let db = state.user_db().await?;
    Ok(Json(get_bill(&db, &id, today()).await?))
}

pub async fn put_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBillPayload>,
) -> Result<Json<Bill>> {
    let db = state.user_db().await?;
    Ok(Json(update_bill(&db, &id, payload, today()).await?))
}

pub async fn delete_bill_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let db = state.user_db().await?;
    delete_bill(&db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn post_bill_paid(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Bill>> {
    let db = state.user_db().await?;
    Ok(Json(mark_bill_paid(&db, &id, today()).await?))
}

pub async fn post_bill_unpaid(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Bill>> {
    let db = state.user_db().await?;
    Ok(Json(mark_bill_unpaid(&db, &id, today()).await?))
}

pub async fn get_bill_summary(State(state): State<AppState>) -> Result<Json<BillSummary>> {
    let db = state.user_db().await?;
    let bills = list_bills(&db, today()).await?;
    Ok(Json(summarize_bills(&bills)))
}
