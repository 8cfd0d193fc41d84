use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::AppState;
use crate::budget::gift_budget;
use crate::constants::{MAX_GIFT_NAME_LENGTH, MAX_NOTES_LENGTH, MAX_RECIPIENT_NAME_LENGTH};
use crate::database::Db;
use crate::error::{AppError, Result};
use crate::models::{
    CreateGiftPayload, EventType, GetGiftsQuery, Gift, GiftBudget, UpdateGiftPayload,
};
use crate::utils::{
    date_value, db_error, db_error_with_context, optional_date, optional_text, parse_date,
    text_value, today, validate_amount, validate_string_length,
};

const GIFT_COLUMNS: &str =
    "id, gift_name, recipient_name, amount, event_type, event_date, purchased, purchase_date, notes";

pub fn validate_gift_name(name: &str) -> Result<()> {
    validate_string_length(name, "Gift name", MAX_GIFT_NAME_LENGTH)
}

pub fn validate_recipient_name(name: &str) -> Result<()> {
    validate_string_length(name, "Recipient name", MAX_RECIPIENT_NAME_LENGTH)
}

fn validate_notes(notes: &str) -> Result<()> {
    if notes.len() > MAX_NOTES_LENGTH {
        return Err(AppError::Validation(format!(
            "Notes must be less than {} characters",
            MAX_NOTES_LENGTH
        )));
    }
    Ok(())
}

/// Blank notes are stored as absent.
fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound {
        entity: "Gift",
        id: id.to_string(),
    }
}

pub fn extract_gift_from_row(row: libsql::Row) -> Result<Gift> {
    let invalid = |_| db_error_with_context("invalid gift data");

    let id: String = row.get(0).map_err(invalid)?;
    let gift_name: String = row.get(1).map_err(invalid)?;
    let recipient_name: String = row.get(2).map_err(invalid)?;
    let amount: f64 = row.get(3).map_err(invalid)?;
    let event_type: String = row.get(4).map_err(invalid)?;
    let event_date: String = row.get(5).map_err(invalid)?;
    let purchased: i64 = row.get(6).map_err(invalid)?;
    let purchase_date = optional_date(row.get_value(7).map_err(invalid)?)?;
    let notes = optional_text(row.get_value(8).map_err(invalid)?)?;

    Ok(Gift {
        id,
        gift_name,
        recipient_name,
        amount,
        event_type: event_type
            .parse::<EventType>()
            .map_err(|e| db_error_with_context(&e))?,
        event_date: parse_date(&event_date)?,
        purchased: purchased != 0,
        purchase_date,
        notes,
    })
}

async fn query_gifts(
    db: &Db,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Vec<Gift>> {
    let conn = db.read().await;
    let mut rows = conn
        .query(sql, params)
        .await
        .map_err(|_| db_error_with_context("failed to query gifts"))?;

    let mut gifts = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        gifts.push(extract_gift_from_row(row)?);
    }
    Ok(gifts)
}

/// A gift created as already purchased is stamped with `today` as its purchase date.
pub async fn create_gift(db: &Db, payload: CreateGiftPayload, today: Date) -> Result<Gift> {
    validate_gift_name(&payload.gift_name)?;
    validate_recipient_name(&payload.recipient_name)?;
    validate_amount(payload.amount, "Gift amount")?;
    if let Some(notes) = &payload.notes {
        validate_notes(notes)?;
    }

    let gift = Gift {
        id: Uuid::new_v4().to_string(),
        gift_name: payload.gift_name.trim().to_string(),
        recipient_name: payload.recipient_name.trim().to_string(),
        amount: payload.amount,
        event_type: payload.event_type,
        event_date: payload.event_date,
        purchased: payload.purchased,
        purchase_date: payload.purchased.then_some(today),
        notes: normalize_notes(payload.notes),
    };
    let now = OffsetDateTime::now_utc().unix_timestamp();

    let conn = db.write().await;
    conn.execute(
        "INSERT INTO gifts (id, gift_name, recipient_name, amount, event_type, event_date, purchased, purchase_date, notes, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            gift.id.as_str(),
            gift.gift_name.as_str(),
            gift.recipient_name.as_str(),
            gift.amount,
            gift.event_type.as_str(),
            gift.event_date.to_string(),
            gift.purchased as i64,
            date_value(gift.purchase_date),
            text_value(gift.notes.as_deref()),
            now,
            now,
        ),
    )
    .await
    .map_err(|_| db_error_with_context("gift creation failed"))?;

    tracing::info!("Created gift {} for {}", gift.id, gift.recipient_name);
    Ok(gift)
}

/// All gifts, earliest event first.
pub async fn list_gifts(db: &Db) -> Result<Vec<Gift>> {
    let sql = format!("SELECT {} FROM gifts ORDER BY event_date ASC", GIFT_COLUMNS);
    query_gifts(db, &sql, ()).await
}

pub async fn list_gifts_by_event_type(db: &Db, event_type: EventType) -> Result<Vec<Gift>> {
    let sql = format!(
        "SELECT {} FROM gifts WHERE event_type = ? ORDER BY event_date ASC",
        GIFT_COLUMNS
    );
    query_gifts(db, &sql, [event_type.as_str()]).await
}

pub async fn list_gifts_by_purchased(db: &Db, purchased: bool) -> Result<Vec<Gift>> {
    let sql = format!(
        "SELECT {} FROM gifts WHERE purchased = ? ORDER BY event_date ASC",
        GIFT_COLUMNS
    );
    query_gifts(db, &sql, [purchased as i64]).await
}

/// Unpurchased gifts whose event is today or later.
pub async fn list_upcoming_gifts(db: &Db, today: Date) -> Result<Vec<Gift>> {
    let sql = format!(
        "SELECT {} FROM gifts WHERE purchased = 0 AND event_date >= ? ORDER BY event_date ASC",
        GIFT_COLUMNS
    );
    query_gifts(db, &sql, [today.to_string()]).await
}

pub async fn get_gift(db: &Db, id: &str) -> Result<Gift> {
    let sql = format!("SELECT {} FROM gifts WHERE id = ?", GIFT_COLUMNS);
    query_gifts(db, &sql, [id])
        .await?
        .pop()
        .ok_or_else(|| not_found(id))
}

pub async fn update_gift(db: &Db, id: &str, payload: UpdateGiftPayload) -> Result<Gift> {
    if payload.gift_name.is_none()
        && payload.recipient_name.is_none()
        && payload.amount.is_none()
        && payload.event_type.is_none()
        && payload.event_date.is_none()
        && payload.notes.is_none()
    {
        return Err(AppError::Validation(
            "At least one field must be provided for update".to_string(),
        ));
    }
    if let Some(name) = &payload.gift_name {
        validate_gift_name(name)?;
    }
    if let Some(name) = &payload.recipient_name {
        validate_recipient_name(name)?;
    }
    if let Some(amount) = payload.amount {
        validate_amount(amount, "Gift amount")?;
    }
    if let Some(notes) = &payload.notes {
        validate_notes(notes)?;
    }

    let existing = get_gift(db, id).await?;
    let updated = Gift {
        gift_name: payload
            .gift_name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.gift_name),
        recipient_name: payload
            .recipient_name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.recipient_name),
        amount: payload.amount.unwrap_or(existing.amount),
        event_type: payload.event_type.unwrap_or(existing.event_type),
        event_date: payload.event_date.unwrap_or(existing.event_date),
        notes: match payload.notes {
            Some(notes) => normalize_notes(Some(notes)),
            None => existing.notes,
        },
        ..existing
    };

    let conn = db.write().await;
    let affected = conn
        .execute(
            "UPDATE gifts SET gift_name = ?, recipient_name = ?, amount = ?, event_type = ?, event_date = ?, notes = ?, updated_at = ?
             WHERE id = ?",
            (
                updated.gift_name.as_str(),
                updated.recipient_name.as_str(),
                updated.amount,
                updated.event_type.as_str(),
                updated.event_date.to_string(),
                text_value(updated.notes.as_deref()),
                OffsetDateTime::now_utc().unix_timestamp(),
                id,
            ),
        )
        .await
        .map_err(|_| db_error_with_context("gift update failed"))?;

    if affected == 0 {
        return Err(not_found(id));
    }
    Ok(updated)
}

async fn set_purchased(db: &Db, id: &str, purchase_date: Option<Date>) -> Result<Gift> {
    {
        let conn = db.write().await;
        let affected = conn
            .execute(
                "UPDATE gifts SET purchased = ?, purchase_date = ?, updated_at = ? WHERE id = ?",
                (
                    purchase_date.is_some() as i64,
                    date_value(purchase_date),
                    OffsetDateTime::now_utc().unix_timestamp(),
                    id,
                ),
            )
            .await
            .map_err(|_| db_error_with_context("failed to update purchase state"))?;

        if affected == 0 {
            return Err(not_found(id));
        }
    }
    get_gift(db, id).await
}

pub async fn mark_gift_purchased(db: &Db, id: &str, today: Date) -> Result<Gift> {
    set_purchased(db, id, Some(today)).await
}

pub async fn mark_gift_unpurchased(db: &Db, id: &str) -> Result<Gift> {
    set_purchased(db, id, None).await
}

pub async fn delete_gift(db: &Db, id: &str) -> Result<()> {
    let conn = db.write().await;
    let affected = conn
        .execute("DELETE FROM gifts WHERE id = ?", [id])
        .await
        .map_err(|_| db_error_with_context("gift deletion failed"))?;

    if affected == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

// HTTP handlers

pub async fn get_gifts(
    State(state): State<AppState>,
    Query(query): Query<GetGiftsQuery>,
) -> Result<Json<Vec<Gift>>> {
    let db = state.user_db().await?;

    let gifts = match (query.event_type, query.purchased) {
        (Some(event_type), purchased) => list_gifts_by_event_type(&db, event_type)
            .await?
            .into_iter()
            .filter(|g| purchased.is_none_or(|p| g.purchased == p))
            .collect(),
        (None, Some(purchased)) => list_gifts_by_purchased(&db, purchased).await?,
        (None, None) => list_gifts(&db).await?,
    };

    Ok(Json(gifts))
}

pub async fn get_upcoming_gifts(State(state): State<AppState>) -> Result<Json<Vec<Gift>>> {
    let db = state.user_db().await?;
    Ok(Json(list_upcoming_gifts(&db, today()).await?))
}

pub async fn get_gift_budget(State(state): State<AppState>) -> Result<Json<GiftBudget>> {
    let db = state.user_db().await?;
    let gifts = list_gifts(&db).await?;
    Ok(Json(gift_budget(&gifts, today())))
}

pub async fn post_gift(
    State(state): State<AppState>,
    Json(payload): Json<CreateGiftPayload>,
) -> Result<(StatusCode, Json<Gift>)> {
    let db = state.user_db().await?;
    let gift = create_gift(&db, payload, today()).await?;
    Ok((StatusCode::CREATED, Json(gift)))
}

pub async fn get_gift_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Gift>> {
    let db = state.user_db().await?;
    Ok(Json(get_gift(&db, &id).await?))
}

pub async fn put_gift(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateGiftPayload>,
) -> Result<Json<Gift>> {
    let db = state.user_db().await?;
    Ok(Json(update_gift(&db, &id, payload).await?))
}

pub async fn delete_gift_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let db = state.user_db().await?;
    delete_gift(&db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn post_gift_purchased(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Gift>> {
    let db = state.user_db().await?;
    Ok(Json(mark_gift_purchased(&db, &id, today()).await?))
}

pub async fn post_gift_unpurchased(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Gift>> {
    let db = state.user_db().await?;
    Ok(Json(mark_gift_unpurchased(&db, &id).await?))
}
