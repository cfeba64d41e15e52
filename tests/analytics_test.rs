//! Donations analytics tests: aggregates and date ordering.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use inmed_site::dashboard::analytics;
use inmed_site::models::{Donation, DonationStats};
use inmed_site::store::MemoryStore;

fn donation(amount: i64, days_ago: i64) -> Donation {
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid date");
    Donation {
        id: Uuid::new_v4(),
        donor_name: None,
        donor_email: None,
        amount: Decimal::from(amount),
        currency: "ZAR".to_string(),
        donation_date: base - Duration::days(days_ago),
        status: "completed".to_string(),
        notes: None,
    }
}

#[test]
fn test_empty_set_has_zero_average() {
    let stats = DonationStats::from_donations(&[]);
    assert_eq!(stats.count, 0);
    assert_eq!(stats.total, Decimal::ZERO);
    assert_eq!(stats.average, Decimal::ZERO);
}

#[test]
fn test_total_count_and_average() {
    let stats = DonationStats::from_donations(&[donation(100, 1), donation(300, 2)]);
    assert_eq!(stats.total, Decimal::from(400));
    assert_eq!(stats.count, 2);
    assert_eq!(stats.average, Decimal::from(200));
    assert_eq!(stats.total_label(), "400.00");
}

#[test]
fn test_average_keeps_cents() {
    let stats = DonationStats::from_donations(&[donation(10, 0), donation(10, 0), donation(5, 0)]);
    assert_eq!(stats.average_label(), "8.33");
}

#[test]
fn test_missing_donor_details_have_fallbacks() {
    let d = donation(1500, 0);
    assert_eq!(d.donor_label(), "Anonymous");
    assert_eq!(d.email_label(), "N/A");
    assert_eq!(d.amount_label(), "ZAR 1 500.00");
}

#[actix_rt::test]
async fn test_report_lists_newest_donation_first() {
    let store = MemoryStore::new();
    store.add_donation(donation(50, 10)).await;
    store.add_donation(donation(75, 0)).await;
    store.add_donation(donation(25, 5)).await;

    let report = analytics::load(&store).await.expect("load failed");
    let amounts: Vec<Decimal> = report.donations.iter().map(|d| d.amount).collect();
    assert_eq!(amounts, vec![Decimal::from(75), Decimal::from(25), Decimal::from(50)]);
    assert_eq!(report.stats.total, Decimal::from(150));
    assert!(!report.is_empty());
}

#[actix_rt::test]
async fn test_store_failure_is_reported() {
    let store = MemoryStore::new();
    store.fail_next_read("connection refused").await;
    let err = analytics::load(&store).await.expect_err("read was set to fail");
    assert_eq!(err.to_string(), "connection refused");
}
