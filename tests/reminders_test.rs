/*!
 * Reminder Policy Tests
 *
 * The policy fires only at 3, 1 and 0 days before the due date, only for
 * SMS-enabled unpaid bills, and at most once per calendar day.
 */

mod common;

use bill_reminder_server::reminders::{ReminderTemplate, reminder_for};
use common::*;
use time::macros::datetime;

#[test]
fn fires_only_on_schedule_days() {
    for days in -5..=10 {
        let decision = reminder_for(&sample_bill(days), TODAY);
        let expected = matches!(days, 3 | 1 | 0);
        assert_eq!(decision.should_send(), expected, "due in {} days", days);
        assert_eq!(decision.days_until_due, days);
    }
}

#[test]
fn selects_template_by_day_count() {
    assert_eq!(
        reminder_for(&sample_bill(3), TODAY).template,
        Some(ReminderTemplate::ThreeDay)
    );
    assert_eq!(
        reminder_for(&sample_bill(1), TODAY).template,
        Some(ReminderTemplate::OneDay)
    );
    assert_eq!(
        reminder_for(&sample_bill(0), TODAY).template,
        Some(ReminderTemplate::SameDay)
    );
}

#[test]
fn no_reminder_when_sms_disabled() {
    let mut bill = sample_bill(3);
    bill.sms_enabled = false;
    assert!(!reminder_for(&bill, TODAY).should_send());
}

#[test]
fn no_reminder_when_paid() {
    let mut bill = sample_bill(1);
    bill.payment_date = Some(days_from_today(-1));
    assert!(!reminder_for(&bill, TODAY).should_send());
}

#[test]
fn overdue_bill_gets_no_reminder() {
    let decision = reminder_for(&sample_bill(-2), TODAY);
    assert!(!decision.should_send());
    assert_eq!(decision.days_until_due, -2);
}

#[test]
fn suppressed_when_already_sent_today() {
    let mut bill = sample_bill(3);
    bill.last_reminder_sent = Some(datetime!(2026-10-18 00:00:01 UTC));
    assert!(!reminder_for(&bill, TODAY).should_send());

    bill.last_reminder_sent = Some(datetime!(2026-10-18 23:59:59 UTC));
    assert!(!reminder_for(&bill, TODAY).should_send());
}

#[test]
fn reminder_sent_yesterday_does_not_suppress() {
    let mut bill = sample_bill(1);
    bill.last_reminder_sent = Some(datetime!(2026-10-17 23:59:59 UTC));
    assert_eq!(
        reminder_for(&bill, TODAY).template,
        Some(ReminderTemplate::OneDay)
    );
}

#[test]
fn three_day_message_contents() {
    let bill = sample_bill(3);
    let message = ReminderTemplate::ThreeDay.render(&bill);

    assert!(message.contains("\"Electric\""));
    assert!(message.contains("125.50"));
    assert!(message.contains("due in 3 days"));
    assert!(message.contains("2026-10-21"));
}

#[test]
fn one_day_and_same_day_messages() {
    let bill = sample_bill(1);
    let tomorrow = ReminderTemplate::OneDay.render(&bill);
    assert!(tomorrow.contains("TOMORROW (2026-10-19)"));

    let today = ReminderTemplate::SameDay.render(&bill);
    assert!(today.contains("due TODAY"));
    assert!(today.contains("$125.50"));
}

#[test]
fn messages_carry_service_signature() {
    for (days, template, lead) in [
        (3, ReminderTemplate::ThreeDay, "🔔 Reminder:"),
        (1, ReminderTemplate::OneDay, "⚠️ URGENT:"),
        (0, ReminderTemplate::SameDay, "🚨 ALERT:"),
    ] {
        let message = template.render(&sample_bill(days));
        assert!(message.starts_with(lead), "{}", message);
        assert!(message.ends_with("- TxT M💰NEY"), "{}", message);
    }
}

#[test]
fn names_are_inserted_verbatim() {
    let mut bill = sample_bill(0);
    bill.name = "Rent & \"Fees\" <b>".to_string();
    let message = ReminderTemplate::SameDay.render(&bill);
    assert!(message.contains("Rent & \"Fees\" <b>"));
}
