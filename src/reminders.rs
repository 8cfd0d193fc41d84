//! Reminder policy: a sparse three-point schedule (3 days, 1 day, same day).

use serde::Serialize;
use time::Date;

use crate::constants::{
    MESSAGE_SIGNATURE, ONE_DAY_REMINDER, SAME_DAY_REMINDER, THREE_DAY_REMINDER,
};
use crate::models::Bill;
use crate::status::{days_until, is_paid};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderTemplate {
    ThreeDay,
    OneDay,
    SameDay,
}

impl ReminderTemplate {
    pub fn for_days_until_due(days: i64) -> Option<Self> {
        match days {
            THREE_DAY_REMINDER => Some(ReminderTemplate::ThreeDay),
            ONE_DAY_REMINDER => Some(ReminderTemplate::OneDay),
            SAME_DAY_REMINDER => Some(ReminderTemplate::SameDay),
            _ => None,
        }
    }

    /// Message body for `bill`. Names are inserted verbatim.
    pub fn render(&self, bill: &Bill) -> String {
        match self {
            ReminderTemplate::ThreeDay => format!(
                "🔔 Reminder: Your bill \"{}\" (${:.2}) is due in 3 days on {}. {}",
                bill.name, bill.amount, bill.due_date, MESSAGE_SIGNATURE
            ),
            ReminderTemplate::OneDay => format!(
                "⚠️ URGENT: Your bill \"{}\" (${:.2}) is due TOMORROW ({})! {}",
                bill.name, bill.amount, bill.due_date, MESSAGE_SIGNATURE
            ),
            ReminderTemplate::SameDay => format!(
                "🚨 ALERT: Your bill \"{}\" (${:.2}) is due TODAY! {}",
                bill.name, bill.amount, MESSAGE_SIGNATURE
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderDecision {
    pub days_until_due: i64,
    /// `None` means no reminder goes out for this bill today.
    pub template: Option<ReminderTemplate>,
}

impl ReminderDecision {
    pub fn should_send(&self) -> bool {
        self.template.is_some()
    }
}

/// True when a reminder for `bill` was already recorded on `today`'s calendar day.
pub fn reminded_on(bill: &Bill, today: Date) -> bool {
    bill.last_reminder_sent
        .is_some_and(|sent| sent.date() == today)
}

pub fn reminder_for(bill: &Bill, today: Date) -> ReminderDecision {
    let days_until_due = days_until(bill.due_date, today);
    let suppressed = !bill.sms_enabled || is_paid(bill) || reminded_on(bill, today);

    ReminderDecision {
        days_until_due,
        template: if suppressed {
            None
        } else {
            ReminderTemplate::for_days_until_due(days_until_due)
        },
    }
}
