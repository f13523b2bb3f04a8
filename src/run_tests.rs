#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_flag_value() {
    let a = args(&["add", "expense", "5", "Travel", "--date", "2025-01-02"]);
    assert_eq!(flag_value(&a, "--date"), Some("2025-01-02"));
    assert_eq!(flag_value(&a, "--desc"), None);
}

#[test]
fn test_flag_without_value() {
    let a = args(&["report", "--date"]);
    assert_eq!(flag_value(&a, "--date"), None);
}

#[test]
fn test_has_flag() {
    let a = args(&["report", "--json"]);
    assert!(has_flag(&a, "--json"));
    assert!(!has_flag(&a, "--all"));
}

#[test]
fn test_positionals_skip_flags_and_values() {
    let a = args(&[
        "add",
        "expense",
        "--desc",
        "lunch out",
        "12.50",
        "Food & Dining",
        "--json",
    ]);
    assert_eq!(positionals(&a), vec!["add", "expense", "12.50", "Food & Dining"]);
}

#[test]
fn test_parse_amount() {
    assert_eq!(parse_amount("12.50").unwrap(), dec!(12.50));
    assert_eq!(parse_amount("$1,250.00").unwrap(), dec!(1250));
    assert_eq!(parse_amount(" 0 ").unwrap(), dec!(0));
}

#[test]
fn test_parse_amount_rejects_bad_input() {
    assert!(parse_amount("abc").is_err());
    assert!(parse_amount("").is_err());
    assert!(parse_amount("-5").is_err());
}

#[test]
fn test_parse_date() {
    assert_eq!(
        parse_date("2025-01-05").unwrap(),
        NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
    );
    assert!(parse_date("01/05/2025").is_err());
    assert!(parse_date("2025-02-30").is_err());
}
