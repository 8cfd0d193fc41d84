//! Bill lifecycle status, derived from the due date and payment state.
//!
//! Status is a projection: it is recomputed on every read because the passage
//! of time changes it without any write occurring.

use time::Date;

use crate::constants::DUE_SOON_WINDOW_DAYS;
use crate::models::{Bill, BillStatus};

/// Whole calendar days from `today` until `date`. Negative when `date` is in the past.
///
/// Both the status calculator and the reminder policy count days with this
/// function so the two never drift apart around midnight.
pub fn days_until(date: Date, today: Date) -> i64 {
    (date - today).whole_days()
}

pub fn calculate_status(due_date: Date, payment_date: Option<Date>, today: Date) -> BillStatus {
    if payment_date.is_some() {
        return BillStatus::Paid;
    }

    let days_until_due = days_until(due_date, today);
    if days_until_due < 0 {
        BillStatus::Overdue
    } else if days_until_due <= DUE_SOON_WINDOW_DAYS {
        BillStatus::DueSoon
    } else {
        BillStatus::Upcoming
    }
}

pub fn is_paid(bill: &Bill) -> bool {
    bill.payment_date.is_some()
}

impl Bill {
    /// Status of this bill as of `today`, ignoring whatever `status` currently holds.
    pub fn status_on(&self, today: Date) -> BillStatus {
        calculate_status(self.due_date, self.payment_date, today)
    }

    /// Re-derives `status` for `today`.
    pub fn project(mut self, today: Date) -> Self {
        self.status = self.status_on(today);
        self
    }
}
