#![allow(clippy::unwrap_used)]

use super::*;
use crate::storage::MemoryStorage;
use rust_decimal_macros::dec;

fn data() -> FinanceData<MemoryStorage> {
    FinanceData::load(MemoryStorage::default())
}

fn run(data: &mut FinanceData<MemoryStorage>, list: &[&str]) -> Result<String> {
    let mut args = vec!["fintrack".to_string()];
    args.extend(list.iter().map(|s| s.to_string()));
    let mut out = Vec::new();
    as_cli(&args, data, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_add_transaction() {
    let mut d = data();
    let out = run(
        &mut d,
        &["add", "expense", "12.50", "food & dining", "--date", "2025-01-10", "--desc", "lunch"],
    )
    .unwrap();
    assert!(out.contains("Expense of $12.50 recorded on 2025-01-10"));

    let txn = &d.transactions()[0];
    assert_eq!(txn.category, "Food & Dining");
    assert_eq!(txn.amount, dec!(12.50));
    assert_eq!(txn.description, "lunch");
}

#[test]
fn test_add_defaults_to_today() {
    let mut d = data();
    run(&mut d, &["add", "income", "100", "Salary"]).unwrap();
    assert_eq!(d.transactions()[0].date, chrono::Local::now().date_naive());
}

#[test]
fn test_add_rejects_wrong_category_for_type() {
    let mut d = data();
    let err = run(&mut d, &["add", "income", "100", "Travel"]).unwrap_err();
    assert!(err.to_string().contains("Unknown income category"));
    assert!(d.transactions().is_empty());
}

#[test]
fn test_add_rejects_bad_type_and_amount() {
    let mut d = data();
    assert!(run(&mut d, &["add", "transfer", "100", "Salary"]).is_err());
    assert!(run(&mut d, &["add", "income", "-100", "Salary"]).is_err());
    assert!(run(&mut d, &["add", "income", "100"]).is_err());
    assert!(d.transactions().is_empty());
}

#[test]
fn test_delete_transaction() {
    let mut d = data();
    run(&mut d, &["add", "income", "100", "Salary"]).unwrap();
    let id = d.transactions()[0].id.clone();
    let out = run(&mut d, &["delete", &id]).unwrap();
    assert!(out.contains(&format!("Deleted income {id}")));
    assert!(d.transactions().is_empty());
}

#[test]
fn test_delete_unknown_transaction() {
    let mut d = data();
    let out = run(&mut d, &["delete", "42"]).unwrap();
    assert!(out.contains("No transaction with id 42"));
}

#[test]
fn test_list_empty() {
    let mut d = data();
    let out = run(&mut d, &["list"]).unwrap();
    assert!(out.contains("No transactions yet"));
}

#[test]
fn test_list_limits_rows() {
    let mut d = data();
    for _ in 0..3 {
        run(&mut d, &["add", "expense", "1", "Travel", "--date", "2025-01-01"]).unwrap();
    }
    let out = run(&mut d, &["list", "--limit", "2"]).unwrap();
    assert_eq!(out.matches("Travel").count(), 2);
    assert!(out.contains("1 more"));
}

#[test]
fn test_list_zero_limit_with_transactions() {
    let mut d = data();
    run(&mut d, &["add", "expense", "1", "Travel", "--date", "2025-01-01"]).unwrap();
    let out = run(&mut d, &["list", "--limit", "0"]).unwrap();
    assert!(!out.contains("No transactions yet"));
    assert!(!out.contains("Travel"));
    assert!(out.contains("1 more"));
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_budget_lifecycle() {
    let mut d = data();
    run(&mut d, &["add", "expense", "200", "Food & Dining", "--date", "2025-01-10"]).unwrap();

    let out = run(&mut d, &["budget", "add", "Food & Dining", "150", "--month", "2025-01"]).unwrap();
    assert!(out.contains("Budget for Food & Dining set to $150.00/month"));
    let id = d.budgets()[0].id.clone();

    let out = run(&mut d, &["budgets"]).unwrap();
    assert!(out.contains("$200.00/$150.00"));
    assert!(out.contains("over"));

    run(&mut d, &["budget", "set", &id, "--limit", "400"]).unwrap();
    assert_eq!(d.budgets()[0].monthly_limit, dec!(400));
    let out = run(&mut d, &["budgets"]).unwrap();
    assert!(out.contains("good"));

    run(&mut d, &["budget", "delete", &id]).unwrap();
    assert!(d.budgets().is_empty());
}

#[test]
fn test_budget_requires_expense_category() {
    let mut d = data();
    assert!(run(&mut d, &["budget", "add", "Salary", "100"]).is_err());
    assert!(d.budgets().is_empty());
}

#[test]
fn test_budget_rejects_zero_limit_and_bad_month() {
    let mut d = data();
    assert!(run(&mut d, &["budget", "add", "Travel", "0"]).is_err());
    assert!(run(&mut d, &["budget", "add", "Travel", "10", "--month", "2025-13"]).is_err());
    assert!(d.budgets().is_empty());
}

#[test]
fn test_budget_set_moves_period() {
    let mut d = data();
    run(&mut d, &["budget", "add", "Travel", "100", "--month", "2025-01"]).unwrap();
    let id = d.budgets()[0].id.clone();
    run(&mut d, &["budget", "set", &id, "--month", "2026-04"]).unwrap();
    assert_eq!(d.budgets()[0].period(), "2026-04");
}

#[test]
fn test_budget_set_requires_a_field() {
    let mut d = data();
    run(&mut d, &["budget", "add", "Travel", "100"]).unwrap();
    let id = d.budgets()[0].id.clone();
    assert!(run(&mut d, &["budget", "set", &id]).is_err());
}

#[test]
fn test_budget_set_unknown_id() {
    let mut d = data();
    let out = run(&mut d, &["budget", "set", "nope", "--limit", "5"]).unwrap();
    assert!(out.contains("No budget with id nope"));
}

#[test]
fn test_budgets_empty() {
    let mut d = data();
    let out = run(&mut d, &["budgets"]).unwrap();
    assert!(out.contains("No budgets set"));
}

// ── Reports ───────────────────────────────────────────────────

#[test]
fn test_report_text() {
    let mut d = data();
    run(&mut d, &["add", "income", "1000", "Salary"]).unwrap();
    run(&mut d, &["add", "expense", "200", "Food & Dining"]).unwrap();
    let out = run(&mut d, &["report"]).unwrap();
    assert!(out.contains("Income:    $1,000.00"));
    assert!(out.contains("Expenses:  $200.00"));
    assert!(out.contains("Balance:   $800.00"));
    assert!(out.contains("Food & Dining"));
    assert!(out.contains("Monthly Trend:"));
}

#[test]
fn test_report_with_huge_amounts() {
    let mut d = data();
    let max = rust_decimal::Decimal::MAX.to_string();
    run(&mut d, &["add", "income", &max, "Salary"]).unwrap();
    run(&mut d, &["add", "income", &max, "Salary"]).unwrap();
    run(&mut d, &["budget", "add", "Travel", &max]).unwrap();
    run(&mut d, &["add", "expense", &max, "Travel"]).unwrap();
    run(&mut d, &["add", "expense", &max, "Travel"]).unwrap();
    assert!(run(&mut d, &["report"]).unwrap().contains("Balance:   $0.00"));
    assert!(run(&mut d, &["budgets"]).unwrap().contains("over"));
}

#[test]
fn test_report_json() {
    let mut d = data();
    run(&mut d, &["add", "income", "1000", "Salary"]).unwrap();
    let out = run(&mut d, &["report", "--json"]).unwrap();
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["totalIncome"].as_f64(), Some(1000.0));
    assert_eq!(json["monthlyData"].as_array().unwrap().len(), 6);
}

// ── Misc ──────────────────────────────────────────────────────

#[test]
fn test_export_to_path() {
    let mut d = data();
    run(&mut d, &["add", "income", "1000", "Salary"]).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let out = run(&mut d, &["export", path.to_str().unwrap()]).unwrap();
    assert!(out.contains("Exported 1 transactions"));
    assert!(path.exists());
}

#[test]
fn test_categories() {
    let mut d = data();
    let out = run(&mut d, &["categories"]).unwrap();
    assert!(out.contains("income:"));
    assert!(out.contains("Other Expenses"));
}

#[test]
fn test_help_and_unknown() {
    let mut d = data();
    assert!(run(&mut d, &[]).unwrap().contains("Usage: fintrack"));
    assert!(run(&mut d, &["frobnicate"]).is_err());
}

#[test]
fn test_shellexpand() {
    assert_eq!(shellexpand("/tmp/out.csv"), "/tmp/out.csv");
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    assert_eq!(shellexpand("~/out.csv"), format!("{home}/out.csv"));
}
