use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Date, OffsetDateTime};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Paid,
    Overdue,
    DueSoon,
    Upcoming,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BillCategory {
    Utilities,
    RentMortgage,
    Insurance,
    Subscriptions,
    CreditCards,
    Loans,
    Other,
}

impl BillCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillCategory::Utilities => "utilities",
            BillCategory::RentMortgage => "rent_mortgage",
            BillCategory::Insurance => "insurance",
            BillCategory::Subscriptions => "subscriptions",
            BillCategory::CreditCards => "credit_cards",
            BillCategory::Loans => "loans",
            BillCategory::Other => "other",
        }
    }
}

impl FromStr for BillCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "utilities" => Ok(BillCategory::Utilities),
            "rent_mortgage" => Ok(BillCategory::RentMortgage),
            "insurance" => Ok(BillCategory::Insurance),
            "subscriptions" => Ok(BillCategory::Subscriptions),
            "credit_cards" => Ok(BillCategory::CreditCards),
            "loans" => Ok(BillCategory::Loans),
            "other" => Ok(BillCategory::Other),
            other => Err(format!("Unknown bill category: {}", other)),
        }
    }
}

impl fmt::Display for BillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bill as read from the store. `status` is projected from `due_date` and
/// `payment_date` on every read and never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bill {
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub due_date: Date,
    pub category: BillCategory,
    pub status: BillStatus,
    pub sms_enabled: bool,
    #[serde(with = "iso_date::option")]
    pub payment_date: Option<Date>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_reminder_sent: Option<OffsetDateTime>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateBillPayload {
    pub name: String,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub due_date: Date,
    pub category: BillCategory,
    #[serde(default)]
    pub sms_enabled: bool,
}

/// Payment state is deliberately absent: only the paid/unpaid toggles change it.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdateBillPayload {
    pub name: Option<String>,
    pub amount: Option<f64>,
    #[serde(default, with = "iso_date::option")]
    pub due_date: Option<Date>,
    pub category: Option<BillCategory>,
    pub sms_enabled: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
pub struct GetBillsQuery {
    pub category: Option<BillCategory>,
    pub status: Option<BillStatus>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub paid: u32,
    pub due_soon: u32,
    pub overdue: u32,
    pub upcoming: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BillSummary {
    pub total_bills: f64,
    pub total_paid: f64,
    pub remaining_balance: f64,
    pub progress_percentage: f64,
    pub total_count: u32,
    pub bills_by_status: StatusCounts,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Birthday,
    Christmas,
    Anniversary,
    Graduation,
    Wedding,
    BabyShower,
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Birthday => "birthday",
            EventType::Christmas => "christmas",
            EventType::Anniversary => "anniversary",
            EventType::Graduation => "graduation",
            EventType::Wedding => "wedding",
            EventType::BabyShower => "baby_shower",
            EventType::Other => "other",
        }
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "birthday" => Ok(EventType::Birthday),
            "christmas" => Ok(EventType::Christmas),
            "anniversary" => Ok(EventType::Anniversary),
            "graduation" => Ok(EventType::Graduation),
            "wedding" => Ok(EventType::Wedding),
            "baby_shower" => Ok(EventType::BabyShower),
            "other" => Ok(EventType::Other),
            other => Err(format!("Unknown event type: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Gift {
    pub id: String,
    pub gift_name: String,
    pub recipient_name: String,
    pub amount: f64,
    pub event_type: EventType,
    #[serde(with = "iso_date")]
    pub event_date: Date,
    pub purchased: bool,
    #[serde(with = "iso_date::option")]
    pub purchase_date: Option<Date>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateGiftPayload {
    pub gift_name: String,
    pub recipient_name: String,
    pub amount: f64,
    pub event_type: EventType,
    #[serde(with = "iso_date")]
    pub event_date: Date,
    #[serde(default)]
    pub purchased: bool,
    pub notes: Option<String>,
}

/// Purchase state is changed only through the purchased/unpurchased toggles.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdateGiftPayload {
    pub gift_name: Option<String>,
    pub recipient_name: Option<String>,
    pub amount: Option<f64>,
    pub event_type: Option<EventType>,
    #[serde(default, with = "iso_date::option")]
    pub event_date: Option<Date>,
    /// An empty string clears the notes.
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct GetGiftsQuery {
    pub event_type: Option<EventType>,
    pub purchased: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MonthGroup {
    /// e.g. "October 2026"
    pub month: String,
    pub gifts: Vec<Gift>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GiftBudget {
    pub total_budget: f64,
    pub purchased_amount: f64,
    pub remaining_budget: f64,
    pub upcoming_by_month: Vec<MonthGroup>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub phone_number: String,
    pub country_code: String,
    pub phone_verified: bool,
    pub notifications_enabled: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UpdatePhonePayload {
    pub country_code: String,
    pub phone_number: String,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct NotificationsPayload {
    pub enabled: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TestMessageResponse {
    pub success: bool,
    pub message_id: Option<String>,
    pub to: String,
}

/// Outcome of one attempted reminder within a dispatch run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReminderResult {
    pub bill_id: String,
    pub bill_name: String,
    pub days_until_due: i64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub success: bool,
    pub processed_count: u32,
    pub sent: u32,
    pub failed: u32,
    pub results: Vec<ReminderResult>,
}
