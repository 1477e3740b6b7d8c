use chrono::{TimeZone, Utc};
use price_feed::driver::{optional_price, parse_datetime, parse_price, parse_price_str, unix_timestamp};
use serde_json::json;

#[test]
fn test_parse_price_is_lenient() {
    assert_eq!(parse_price(&json!("1,125,050,000")), 1125050000.0);
    assert_eq!(parse_price(&json!(" 59,500.25 ")), 59500.25);
    assert_eq!(parse_price(&json!(2051.35)), 2051.35);
    assert_eq!(parse_price(&json!(-100)), -100.0);
    assert_eq!(parse_price(&json!(null)), 0.0);
    assert_eq!(parse_price(&json!("")), 0.0);
    assert_eq!(parse_price(&json!("n/a")), 0.0);
    assert_eq!(parse_price(&json!({"p": 1})), 0.0);
    assert_eq!(parse_price_str("NaN"), 0.0);
}

#[test]
fn test_optional_price_keeps_missing_apart() {
    assert_eq!(optional_price(&json!(null)), None);
    assert_eq!(optional_price(&json!({})["absent"]), None);
    assert_eq!(optional_price(&json!("")), Some(0.0));
    assert_eq!(optional_price(&json!("1,000")), Some(1000.0));
}

#[test]
fn test_parse_datetime_formats() {
    let expected = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    let formats = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

    assert_eq!(parse_datetime("2024-01-01 10:00:00", formats), Some(expected));
    assert_eq!(parse_datetime(" 2024/01/01 10:00:00 ", formats), Some(expected));
    assert_eq!(parse_datetime("2024-01-01T13:30:00+03:30", formats), Some(expected));
    assert_eq!(parse_datetime("2024-01-01T10:00:00Z", &[]), Some(expected));
    assert_eq!(parse_datetime("01.01.2024", formats), None);
}

#[test]
fn test_unix_timestamp_inputs() {
    let expected = Utc.timestamp_opt(1704103200, 0).unwrap();
    assert_eq!(unix_timestamp(&json!(1704103200)), Some(expected));
    assert_eq!(unix_timestamp(&json!("1704103200")), Some(expected));
    assert_eq!(unix_timestamp(&json!(1704103200.75)), Some(expected));
    assert_eq!(unix_timestamp(&json!(" 1704103200.5 ")), Some(expected));
    assert_eq!(unix_timestamp(&json!("yesterday")), None);
    assert_eq!(unix_timestamp(&json!(null)), None);
}
