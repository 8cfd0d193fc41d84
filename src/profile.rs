//! The owner's phone and notification settings.
//!
//! Settings live in the owner's database and are passed explicitly to whoever
//! needs them; there is no process-wide profile.

use axum::{Json, extract::State};

use crate::AppState;
use crate::constants::{
    DEFAULT_COUNTRY_CODE, ERR_GATEWAY_NOT_CONFIGURED, ERR_PHONE_NOT_CONFIGURED, MAX_E164_DIGITS,
    MIN_PHONE_DIGITS, TEST_MESSAGE,
};
use crate::database::Db;
use crate::error::{AppError, Result};
use crate::models::{NotificationsPayload, TestMessageResponse, UpdatePhonePayload, UserProfile};
use crate::sms::MessageGateway;
use crate::utils::{db_error, db_error_with_context};

impl Default for UserProfile {
    fn default() -> Self {
        UserProfile {
            phone_number: String::new(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            phone_verified: false,
            notifications_enabled: true,
        }
    }
}

impl UserProfile {
    pub fn e164(&self) -> String {
        format_to_e164(&self.country_code, &self.phone_number)
    }

    /// E.164 destination, only once the number has been verified.
    pub fn verified_destination(&self) -> Option<String> {
        let has_number = self.phone_number.chars().any(|c| c.is_ascii_digit());
        (has_number && self.phone_verified).then(|| self.e164())
    }
}

fn digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn validate_phone_number(country_code: &str, phone_number: &str) -> Result<()> {
    let phone_digits = digits(phone_number);

    if phone_digits.is_empty() {
        return Err(AppError::Validation("Phone number is required".to_string()));
    }
    if phone_digits.len() < MIN_PHONE_DIGITS {
        return Err(AppError::Validation(format!(
            "Phone number is too short (minimum {} digits)",
            MIN_PHONE_DIGITS
        )));
    }
    let country_digits = digits(country_code);
    if country_digits.is_empty() {
        return Err(AppError::Validation("Country code is required".to_string()));
    }
    if country_digits.len() + phone_digits.len() > MAX_E164_DIGITS {
        return Err(AppError::Validation(format!(
            "Phone number is too long (maximum {} digits total)",
            MAX_E164_DIGITS
        )));
    }
    if !phone_number
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
    {
        return Err(AppError::Validation(
            "Phone number contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// `+` followed by the country code digits and the subscriber digits.
pub fn format_to_e164(country_code: &str, phone_number: &str) -> String {
    format!("+{}{}", digits(country_code), digits(phone_number))
}

/// Display form, e.g. "+1 5551234567".
pub fn format_phone_number(country_code: &str, phone_number: &str) -> String {
    format!("{} {}", country_code, digits(phone_number))
}

/// Stored profile, or the defaults when nothing has been written yet.
pub async fn get_profile(db: &Db) -> Result<UserProfile> {
    Ok(find_profile(db).await?.unwrap_or_default())
}

pub async fn find_profile(db: &Db) -> Result<Option<UserProfile>> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT phone_number, country_code, phone_verified, notifications_enabled FROM profile WHERE id = 1",
            (),
        )
        .await
        .map_err(|_| db_error_with_context("failed to load profile"))?;

    let Some(row) = rows.next().await.map_err(|_| db_error())? else {
        return Ok(None);
    };
    let invalid = |_| db_error_with_context("invalid profile data");
    let phone_verified: i64 = row.get(2).map_err(invalid)?;
    let notifications_enabled: i64 = row.get(3).map_err(invalid)?;

    Ok(Some(UserProfile {
        phone_number: row.get(0).map_err(invalid)?,
        country_code: row.get(1).map_err(invalid)?,
        phone_verified: phone_verified != 0,
        notifications_enabled: notifications_enabled != 0,
    }))
}

/// Upserts the single profile row; the first write creates it.
pub async fn save_profile(db: &Db, profile: &UserProfile) -> Result<()> {
    let conn = db.write().await;
    conn.execute(
        "INSERT INTO profile (id, phone_number, country_code, phone_verified, notifications_enabled)
         VALUES (1, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            phone_number = excluded.phone_number,
            country_code = excluded.country_code,
            phone_verified = excluded.phone_verified,
            notifications_enabled = excluded.notifications_enabled",
        (
            profile.phone_number.as_str(),
            profile.country_code.as_str(),
            profile.phone_verified as i64,
            profile.notifications_enabled as i64,
        ),
    )
    .await
    .map_err(|_| db_error_with_context("failed to save profile"))?;
    Ok(())
}

/// Changing the number always resets verification.
pub async fn update_phone_number(
    db: &Db,
    country_code: &str,
    phone_number: &str,
) -> Result<UserProfile> {
    validate_phone_number(country_code, phone_number)?;

    let profile = UserProfile {
        country_code: format!("+{}", digits(country_code)),
        phone_number: phone_number.trim().to_string(),
        phone_verified: false,
        ..get_profile(db).await?
    };
    save_profile(db, &profile).await?;
    Ok(profile)
}

pub async fn set_notifications(db: &Db, enabled: bool) -> Result<UserProfile> {
    let profile = UserProfile {
        notifications_enabled: enabled,
        ..get_profile(db).await?
    };
    save_profile(db, &profile).await?;
    Ok(profile)
}

/// Sends the fixed test message to the stored number and, when the gateway
/// accepts it, marks the number as verified.
pub async fn send_test_message(
    db: &Db,
    gateway: Option<&dyn MessageGateway>,
) -> Result<TestMessageResponse> {
    let gateway =
        gateway.ok_or_else(|| AppError::Config(ERR_GATEWAY_NOT_CONFIGURED.to_string()))?;

    let profile = get_profile(db).await?;
    validate_phone_number(&profile.country_code, &profile.phone_number)
        .map_err(|_| AppError::NotConfigured(ERR_PHONE_NOT_CONFIGURED.to_string()))?;

    let to = profile.e164();
    let sent = gateway.send_message(&to, TEST_MESSAGE).await?;

    if !profile.phone_verified {
        save_profile(
            db,
            &UserProfile {
                phone_verified: true,
                ..profile
            },
        )
        .await?;
        tracing::info!("Phone number {} verified", to);
    }

    Ok(TestMessageResponse {
        success: true,
        message_id: sent.id,
        to: sent.to,
    })
}

// HTTP handlers

pub async fn get_profile_settings(State(state): State<AppState>) -> Result<Json<UserProfile>> {
    let db = state.user_db().await?;
    Ok(Json(get_profile(&db).await?))
}

pub async fn put_phone_number(
    State(state): State<AppState>,
    Json(payload): Json<UpdatePhonePayload>,
) -> Result<Json<UserProfile>> {
    let db = state.user_db().await?;
    let profile = update_phone_number(&db, &payload.country_code, &payload.phone_number).await?;
    Ok(Json(profile))
}

pub async fn put_notifications(
    State(state): State<AppState>,
    Json(payload): Json<NotificationsPayload>,
) -> Result<Json<UserProfile>> {
    let db = state.user_db().await?;
    Ok(Json(set_notifications(&db, payload.enabled).await?))
}

pub async fn post_test_message(
    State(state): State<AppState>,
) -> Result<Json<TestMessageResponse>> {
    let db = state.user_db().await?;
    let response = send_test_message(&db, state.gateway.as_deref()).await?;
    Ok(Json(response))
}
