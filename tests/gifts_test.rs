/*!
 * Gifts Integration Tests
 *
 * Gift CRUD, the purchased / purchase_date invariant kept by the toggles,
 * filters, and the budget aggregation with its 30-day month grouping.
 */

mod common;

use bill_reminder_server::budget::{gift_budget, month_label};
use bill_reminder_server::database::Db;
use bill_reminder_server::error::AppError;
use bill_reminder_server::gifts::{
    create_gift, delete_gift, get_gift, list_gifts, list_gifts_by_event_type,
    list_gifts_by_purchased, list_upcoming_gifts, mark_gift_purchased, mark_gift_unpurchased,
    update_gift,
};
use bill_reminder_server::models::{CreateGiftPayload, EventType, Gift, UpdateGiftPayload};
use common::*;
use time::macros::date;

fn gift_payload(name: &str, amount: f64, event_in_days: i64, purchased: bool) -> CreateGiftPayload {
    CreateGiftPayload {
        gift_name: name.to_string(),
        recipient_name: "Sam".to_string(),
        amount,
        event_type: EventType::Birthday,
        event_date: days_from_today(event_in_days),
        purchased,
        notes: None,
    }
}

async fn create_test_gift(db: &Db, name: &str, amount: f64, event_in_days: i64, purchased: bool) -> Gift {
    create_gift(db, gift_payload(name, amount, event_in_days, purchased), TODAY)
        .await
        .unwrap_or_else(|e| panic!("Failed to insert test gift '{}': {}", name, e))
}

#[tokio::test]
async fn create_and_read_back() {
    let (db, _temp_dir) = setup_test_db().await;
    let gift = create_gift(
        &db,
        CreateGiftPayload {
            notes: Some("  size M  ".to_string()),
            ..gift_payload("Sweater", 45.0, 10, false)
        },
        TODAY,
    )
    .await
    .expect("create gift");

    assert_eq!(gift.notes.as_deref(), Some("size M"));
    assert!(!gift.purchased);
    assert!(gift.purchase_date.is_none());

    let fetched = get_gift(&db, &gift.id).await.expect("gift exists");
    assert_eq!(fetched, gift);
}

#[tokio::test]
async fn created_purchased_gets_purchase_date() {
    let (db, _temp_dir) = setup_test_db().await;
    let gift = create_test_gift(&db, "Book", 20.0, 5, true).await;

    assert!(gift.purchased);
    assert_eq!(gift.purchase_date, Some(TODAY));
}

#[tokio::test]
async fn validation_rejects_before_write() {
    let (db, _temp_dir) = setup_test_db().await;

    let cases = [
        gift_payload(" ", 10.0, 1, false),
        CreateGiftPayload {
            recipient_name: String::new(),
            ..gift_payload("Mug", 10.0, 1, false)
        },
        gift_payload("Mug", 0.0, 1, false),
        CreateGiftPayload {
            notes: Some("n".repeat(1001)),
            ..gift_payload("Mug", 10.0, 1, false)
        },
    ];
    for payload in cases {
        assert!(matches!(
            create_gift(&db, payload, TODAY).await,
            Err(AppError::Validation(_))
        ));
    }
    assert!(list_gifts(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn purchase_toggles_keep_invariant() {
    let (db, _temp_dir) = setup_test_db().await;
    let gift = create_test_gift(&db, "Watch", 150.0, 12, false).await;

    let purchased = mark_gift_purchased(&db, &gift.id, TODAY).await.unwrap();
    assert!(purchased.purchased);
    assert_eq!(purchased.purchase_date, Some(TODAY));

    let unpurchased = mark_gift_unpurchased(&db, &gift.id).await.unwrap();
    assert!(!unpurchased.purchased);
    assert!(unpurchased.purchase_date.is_none());

    assert!(matches!(
        mark_gift_purchased(&db, "missing", TODAY).await,
        Err(AppError::NotFound { entity: "Gift", .. })
    ));
}

#[tokio::test]
async fn filters_and_ordering() {
    let (db, _temp_dir) = setup_test_db().await;
    create_test_gift(&db, "Later", 10.0, 40, false).await;
    create_test_gift(&db, "Past", 10.0, -3, false).await;
    create_test_gift(&db, "Bought", 10.0, 2, true).await;
    create_gift(
        &db,
        CreateGiftPayload {
            event_type: EventType::Christmas,
            ..gift_payload("Ornament", 12.0, 60, false)
        },
        TODAY,
    )
    .await
    .unwrap();

    let names = |gifts: Vec<Gift>| gifts.into_iter().map(|g| g.gift_name).collect::<Vec<_>>();

    assert_eq!(
        names(list_gifts(&db).await.unwrap()),
        vec!["Past", "Bought", "Later", "Ornament"]
    );
    assert_eq!(
        names(list_gifts_by_event_type(&db, EventType::Christmas).await.unwrap()),
        vec!["Ornament"]
    );
    assert_eq!(
        names(list_gifts_by_purchased(&db, true).await.unwrap()),
        vec!["Bought"]
    );
    assert_eq!(
        names(list_upcoming_gifts(&db, TODAY).await.unwrap()),
        vec!["Later", "Ornament"]
    );
}

#[tokio::test]
async fn update_and_clear_notes() {
    let (db, _temp_dir) = setup_test_db().await;
    let gift = create_gift(
        &db,
        CreateGiftPayload {
            notes: Some("wrap it".to_string()),
            ..gift_payload("Scarf", 25.0, 8, false)
        },
        TODAY,
    )
    .await
    .unwrap();

    let updated = update_gift(
        &db,
        &gift.id,
        UpdateGiftPayload {
            amount: Some(30.0),
            notes: Some(String::new()),
            ..Default::default()
        },
    )
    .await
    .expect("update gift");

    assert_eq!(updated.amount, 30.0);
    assert!(updated.notes.is_none());
    assert_eq!(updated.gift_name, "Scarf");
    assert_eq!(get_gift(&db, &gift.id).await.unwrap(), updated);

    assert!(matches!(
        update_gift(&db, &gift.id, UpdateGiftPayload::default()).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn delete_removes_gift() {
    let (db, _temp_dir) = setup_test_db().await;
    let gift = create_test_gift(&db, "Candle", 18.0, 3, false).await;

    delete_gift(&db, &gift.id).await.expect("delete gift");
    assert!(matches!(
        get_gift(&db, &gift.id).await,
        Err(AppError::NotFound { .. })
    ));
}

#[tokio::test]
async fn budget_totals() {
    let (db, _temp_dir) = setup_test_db().await;
    create_test_gift(&db, "Headphones", 50.0, 5, true).await;
    create_test_gift(&db, "Book", 30.0, 5, false).await;

    let budget = gift_budget(&list_gifts(&db).await.unwrap(), TODAY);
    assert_eq!(budget.total_budget, 80.0);
    assert_eq!(budget.purchased_amount, 50.0);
    assert_eq!(budget.remaining_budget, 30.0);
}

/// TODAY is 2026-10-18: +13 days crosses into November, +30 is the last day
/// of the window and +31 falls outside it.
#[tokio::test]
async fn upcoming_grouped_by_month() {
    let (db, _temp_dir) = setup_test_db().await;
    create_test_gift(&db, "Today", 10.0, 0, false).await;
    create_test_gift(&db, "Late October", 10.0, 13, false).await;
    create_test_gift(&db, "Early November", 10.0, 14, false).await;
    create_test_gift(&db, "Edge", 10.0, 30, false).await;
    create_test_gift(&db, "Too far", 10.0, 31, false).await;
    create_test_gift(&db, "Yesterday", 10.0, -1, false).await;
    create_test_gift(&db, "Bought", 10.0, 3, true).await;

    let budget = gift_budget(&list_gifts(&db).await.unwrap(), TODAY);
    let groups: Vec<(String, Vec<String>)> = budget
        .upcoming_by_month
        .into_iter()
        .map(|g| (g.month, g.gifts.into_iter().map(|x| x.gift_name).collect()))
        .collect();

    assert_eq!(
        groups,
        vec![
            (
                "October 2026".to_string(),
                vec!["Today".to_string(), "Late October".to_string()]
            ),
            (
                "November 2026".to_string(),
                vec!["Early November".to_string(), "Edge".to_string()]
            ),
        ]
    );
}

#[test]
fn month_labels() {
    assert_eq!(month_label(date!(2026 - 12 - 25)), "December 2026");
    assert_eq!(month_label(date!(2027 - 01 - 01)), "January 2027");
}
