//! Pure projections over already-loaded bills and gifts.

use time::Date;

use crate::constants::UPCOMING_GIFT_WINDOW_DAYS;
use crate::models::{Bill, BillStatus, BillSummary, Gift, GiftBudget, MonthGroup, StatusCounts};
use crate::status::{days_until, is_paid};

/// Dashboard totals. Statuses are taken from the already-projected bills.
pub fn summarize_bills(bills: &[Bill]) -> BillSummary {
    let total_bills: f64 = bills.iter().map(|b| b.amount).sum();
    let total_paid: f64 = bills.iter().filter(|b| is_paid(b)).map(|b| b.amount).sum();
    let progress_percentage = if total_bills > 0.0 {
        total_paid / total_bills * 100.0
    } else {
        0.0
    };

    let mut counts = StatusCounts {
        paid: 0,
        due_soon: 0,
        overdue: 0,
        upcoming: 0,
    };
    for bill in bills {
        match bill.status {
            BillStatus::Paid => counts.paid += 1,
            BillStatus::DueSoon => counts.due_soon += 1,
            BillStatus::Overdue => counts.overdue += 1,
            BillStatus::Upcoming => counts.upcoming += 1,
        }
    }

    BillSummary {
        total_bills,
        total_paid,
        remaining_balance: total_bills - total_paid,
        progress_percentage,
        total_count: bills.len() as u32,
        bills_by_status: counts,
    }
}

/// Month-year label used to group upcoming events, e.g. "October 2026".
pub fn month_label(date: Date) -> String {
    format!("{} {}", date.month(), date.year())
}

/// Gift totals plus unpurchased events in the next 30 days grouped by month.
///
/// Groups and their members keep the order of `gifts`, which the store
/// returns sorted by event date.
pub fn gift_budget(gifts: &[Gift], today: Date) -> GiftBudget {
    let total_budget: f64 = gifts.iter().map(|g| g.amount).sum();
    let purchased_amount: f64 = gifts.iter().filter(|g| g.purchased).map(|g| g.amount).sum();

    let mut upcoming_by_month: Vec<MonthGroup> = Vec::new();
    let upcoming = gifts.iter().filter(|g| {
        let days = days_until(g.event_date, today);
        !g.purchased && (0..=UPCOMING_GIFT_WINDOW_DAYS).contains(&days)
    });

    for gift in upcoming {
        let month = month_label(gift.event_date);
        match upcoming_by_month.iter_mut().find(|group| group.month == month) {
            Some(group) => group.gifts.push(gift.clone()),
            None => upcoming_by_month.push(MonthGroup {
                month,
                gifts: vec![gift.clone()],
            }),
        }
    }

    GiftBudget {
        total_budget,
        purchased_amount,
        remaining_budget: total_budget - purchased_amount,
        upcoming_by_month,
    }
}
