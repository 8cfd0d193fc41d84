use libsql::Value;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::constants::*;
use crate::error::AppError;

pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Current calendar day. Reminders and statuses are evaluated in UTC.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn db_error() -> AppError {
    AppError::Database(ERR_DATABASE_OPERATION.to_string())
}

pub fn db_error_with_context(context: &str) -> AppError {
    AppError::Database(format!("{}: {}", ERR_DATABASE_OPERATION, context))
}

pub fn validate_string_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "{} cannot be empty",
            field_name
        )));
    }
    if value.len() > max_length {
        return Err(AppError::Validation(format!(
            "{} must be less than {} characters",
            field_name, max_length
        )));
    }
    Ok(())
}

pub fn validate_amount(amount: f64, field_name: &str) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::Validation(format!(
            "{} must be a positive number",
            field_name
        )));
    }
    Ok(())
}

pub fn parse_date(value: &str) -> Result<Date, AppError> {
    Date::parse(value, DATE_FORMAT)
        .map_err(|_| db_error_with_context(&format!("invalid stored date '{}'", value)))
}

pub fn optional_date(value: Value) -> Result<Option<Date>, AppError> {
    match value {
        Value::Null => Ok(None),
        Value::Text(s) => parse_date(&s).map(Some),
        _ => Err(db_error_with_context("unexpected date column type")),
    }
}

pub fn optional_timestamp(value: Value) -> Result<Option<OffsetDateTime>, AppError> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(ts) => OffsetDateTime::from_unix_timestamp(ts)
            .map(Some)
            .map_err(|_| db_error_with_context("timestamp out of range")),
        _ => Err(db_error_with_context("unexpected timestamp column type")),
    }
}

pub fn optional_text(value: Value) -> Result<Option<String>, AppError> {
    match value {
        Value::Null => Ok(None),
        Value::Text(s) => Ok(Some(s)),
        _ => Err(db_error_with_context("unexpected text column type")),
    }
}

pub fn date_value(date: Option<Date>) -> Value {
    match date {
        Some(d) => Value::Text(d.to_string()),
        None => Value::Null,
    }
}

pub fn text_value(text: Option<&str>) -> Value {
    match text {
        Some(s) => Value::Text(s.to_string()),
        None => Value::Null,
    }
}
