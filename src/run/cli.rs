use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

use super::{flag_value, has_flag, parse_amount, parse_date, positionals};
use crate::models::{
    canonical_category, categories_for, parse_period, BudgetPatch, NewBudget, NewTransaction,
    TransactionType, EXPENSE_CATEGORIES,
};
use crate::report::BudgetStatus;
use crate::storage::Storage;
use crate::store::{FinanceData, RECENT_LIMIT};
use crate::util::{format_amount, progress_bar, truncate};

pub(crate) fn as_cli<S: Storage>(
    args: &[String],
    data: &mut FinanceData<S>,
    out: &mut impl Write,
) -> Result<()> {
    let command = args.get(1).map(String::as_str).unwrap_or("help");
    let rest = args.get(2..).unwrap_or_default();
    match command {
        "add" | "a" => cli_add(rest, data, out),
        "delete" | "rm" => cli_delete(rest, data, out),
        "list" | "ls" => cli_list(rest, data, out),
        "budget" => cli_budget(rest, data, out),
        "budgets" | "b" => cli_budgets(data, out),
        "report" | "r" => cli_report(rest, data, out),
        "export" => cli_export(rest, data, out),
        "categories" => cli_categories(out),
        "--help" | "-h" | "help" => print_usage(out),
        "--version" | "-V" | "version" => {
            writeln!(out, "fintrack {}", env!("CARGO_PKG_VERSION"))?;
            Ok(())
        }
        other => {
            print_usage(out)?;
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage(out: &mut impl Write) -> Result<()> {
    writeln!(out, "FinTrack — local-only personal finance tracker")?;
    writeln!(out)?;
    writeln!(out, "Usage: fintrack <command>")?;
    writeln!(out)?;
    writeln!(out, "Commands:")?;
    writeln!(out, "  add <income|expense> <amount> <category>   Record a transaction")?;
    writeln!(out, "    --date <YYYY-MM-DD>                      Transaction date (default: today)")?;
    writeln!(out, "    --desc <text>                            Description")?;
    writeln!(out, "  delete <id>                                Delete a transaction")?;
    writeln!(out, "  list [--limit N]                           List recent transactions")?;
    writeln!(out, "  budget add <category> <limit>              Create a monthly budget")?;
    writeln!(out, "    --month <YYYY-MM>                        Budget month (default: current)")?;
    writeln!(out, "  budget set <id> [--limit X] [--category C] [--month YYYY-MM]")?;
    writeln!(out, "                                             Update a budget")?;
    writeln!(out, "  budget delete <id>                         Delete a budget")?;
    writeln!(out, "  budgets                                    Show budgets with current usage")?;
    writeln!(out, "  report [--json]                            Totals, categories and 6-month trend")?;
    writeln!(out, "  export [path]                              Export transactions to CSV")?;
    writeln!(out, "  categories                                 List income and expense categories")?;
    writeln!(out, "  --help, -h                                 Show this help")?;
    writeln!(out, "  --version, -V                              Show version")?;
    Ok(())
}

fn print_events<S: Storage>(data: &mut FinanceData<S>, out: &mut impl Write) -> Result<()> {
    for event in data.take_events() {
        writeln!(out, "{event}")?;
    }
    Ok(())
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

// ── Transactions ──────────────────────────────────────────────

fn cli_add<S: Storage>(
    args: &[String],
    data: &mut FinanceData<S>,
    out: &mut impl Write,
) -> Result<()> {
    let pos = positionals(args);
    let [kind, amount, category] = pos.as_slice() else {
        anyhow::bail!(
            "Usage: fintrack add <income|expense> <amount> <category> [--date YYYY-MM-DD] [--desc text]"
        );
    };

    let kind = TransactionType::parse(kind)
        .ok_or_else(|| anyhow::anyhow!("Type must be 'income' or 'expense', got '{kind}'"))?;
    let amount = parse_amount(amount)?;
    let category = canonical_category(kind, category).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown {kind} category '{category}'. Choose one of: {}",
            categories_for(kind).join(", ")
        )
    })?;
    let date = match flag_value(args, "--date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let description = flag_value(args, "--desc").unwrap_or_default();

    let txn = data.add_transaction(
        NewTransaction::new(kind, amount, category.to_string(), date).with_description(description),
    );
    print_events(data, out)?;
    writeln!(
        out,
        "{} of {} recorded on {}",
        match txn.kind {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        },
        format_amount(txn.amount),
        txn.date
    )?;
    Ok(())
}

fn cli_delete<S: Storage>(
    args: &[String],
    data: &mut FinanceData<S>,
    out: &mut impl Write,
) -> Result<()> {
    let Some(id) = positionals(args).first().copied() else {
        anyhow::bail!("Usage: fintrack delete <id>");
    };
    if !data.delete_transaction(id) {
        writeln!(out, "No transaction with id {id}")?;
    }
    print_events(data, out)
}

fn cli_list<S: Storage>(
    args: &[String],
    data: &FinanceData<S>,
    out: &mut impl Write,
) -> Result<()> {
    let limit = match flag_value(args, "--limit") {
        Some(n) => n
            .parse::<usize>()
            .with_context(|| format!("Invalid limit: '{n}'"))?,
        None => RECENT_LIMIT,
    };

    if data.transactions().is_empty() {
        writeln!(out, "No transactions yet")?;
        return Ok(());
    }
    let recent = data.recent_transactions(limit);

    writeln!(
        out,
        "{:<14} {:<10} {:<8} {:<18} {:>12}  Description",
        "ID", "Date", "Type", "Category", "Amount"
    )?;
    writeln!(out, "{}", "─".repeat(80))?;
    for txn in recent {
        let signed = match txn.kind {
            TransactionType::Income => format!("+{}", format_amount(txn.amount)),
            TransactionType::Expense => format!("-{}", format_amount(txn.amount)),
        };
        writeln!(
            out,
            "{:<14} {:<10} {:<8} {:<18} {:>12}  {}",
            txn.id,
            txn.date.to_string(),
            txn.kind.as_str(),
            truncate(&txn.category, 18),
            signed,
            truncate(&txn.description, 30),
        )?;
    }
    if data.transactions().len() > recent.len() {
        writeln!(
            out,
            "… {} more (use --limit)",
            data.transactions().len() - recent.len()
        )?;
    }
    Ok(())
}

// ── Budgets ───────────────────────────────────────────────────

fn cli_budget<S: Storage>(
    args: &[String],
    data: &mut FinanceData<S>,
    out: &mut impl Write,
) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("add") => cli_budget_add(&args[1..], data, out),
        Some("set") => cli_budget_set(&args[1..], data, out),
        Some("delete") | Some("rm") => cli_budget_delete(&args[1..], data, out),
        _ => anyhow::bail!("Usage: fintrack budget <add|set|delete> ..."),
    }
}

fn expense_category(name: &str) -> Result<&'static str> {
    canonical_category(TransactionType::Expense, name).ok_or_else(|| {
        anyhow::anyhow!(
            "Budgets track expense categories. Choose one of: {}",
            EXPENSE_CATEGORIES.join(", ")
        )
    })
}

fn budget_limit(s: &str) -> Result<rust_decimal::Decimal> {
    let limit = parse_amount(s)?;
    if limit.is_zero() {
        anyhow::bail!("Monthly limit must be greater than zero");
    }
    Ok(limit)
}

fn period_arg(s: &str) -> Result<(u32, i32)> {
    parse_period(s).ok_or_else(|| anyhow::anyhow!("Invalid month '{s}', expected YYYY-MM"))
}

fn cli_budget_add<S: Storage>(
    args: &[String],
    data: &mut FinanceData<S>,
    out: &mut impl Write,
) -> Result<()> {
    let pos = positionals(args);
    let [category, limit] = pos.as_slice() else {
        anyhow::bail!("Usage: fintrack budget add <category> <limit> [--month YYYY-MM]");
    };
    let category = expense_category(category)?;
    let limit = budget_limit(limit)?;
    let (month, year) = match flag_value(args, "--month") {
        Some(m) => period_arg(m)?,
        None => period_arg(&today().format("%Y-%m").to_string())?,
    };

    let budget = data.add_budget(NewBudget::new(category.to_string(), limit, month, year));
    print_events(data, out)?;
    writeln!(
        out,
        "Budget for {} set to {}/month",
        budget.category,
        format_amount(budget.monthly_limit)
    )?;
    Ok(())
}

fn cli_budget_set<S: Storage>(
    args: &[String],
    data: &mut FinanceData<S>,
    out: &mut impl Write,
) -> Result<()> {
    let Some(id) = positionals(args).first().copied() else {
        anyhow::bail!("Usage: fintrack budget set <id> [--limit X] [--category C] [--month YYYY-MM]");
    };

    let mut patch = BudgetPatch::default();
    if let Some(limit) = flag_value(args, "--limit") {
        patch.monthly_limit = Some(budget_limit(limit)?);
    }
    if let Some(category) = flag_value(args, "--category") {
        patch.category = Some(expense_category(category)?.to_string());
    }
    if let Some(period) = flag_value(args, "--month") {
        let (month, year) = period_arg(period)?;
        patch = patch.with_period(month, year);
    }
    if patch.is_empty() {
        anyhow::bail!("Nothing to update: pass --limit, --category or --month");
    }

    if data.update_budget(id, patch).is_none() {
        writeln!(out, "No budget with id {id}")?;
    }
    print_events(data, out)
}

fn cli_budget_delete<S: Storage>(
    args: &[String],
    data: &mut FinanceData<S>,
    out: &mut impl Write,
) -> Result<()> {
    let Some(id) = positionals(args).first().copied() else {
        anyhow::bail!("Usage: fintrack budget delete <id>");
    };
    if !data.delete_budget(id) {
        writeln!(out, "No budget with id {id}")?;
    }
    print_events(data, out)
}

fn cli_budgets<S: Storage>(data: &FinanceData<S>, out: &mut impl Write) -> Result<()> {
    if data.budgets().is_empty() {
        writeln!(out, "No budgets set")?;
        writeln!(out, "Use `fintrack budget add <category> <limit>` to set a spending limit")?;
        return Ok(());
    }

    for view in &data.budget_views() {
        let marker = match view.status {
            BudgetStatus::Good => "ok",
            BudgetStatus::Warning => "!",
            BudgetStatus::Over => "!!",
        };
        writeln!(
            out,
            "{:<14} {:<18} {}  {}/{} {} {:.1}% used, {} remaining [{}] {}",
            view.budget.id,
            truncate(&view.budget.category, 18),
            view.budget.period(),
            format_amount(view.usage()),
            format_amount(view.budget.monthly_limit),
            progress_bar(view.progress(), 20),
            view.percent_used,
            format_amount(view.remaining),
            view.status,
            marker,
        )?;
    }
    Ok(())
}

// ── Reports ───────────────────────────────────────────────────

fn cli_report<S: Storage>(
    args: &[String],
    data: &FinanceData<S>,
    out: &mut impl Write,
) -> Result<()> {
    let report = data.generate_report_data();

    if has_flag(args, "--json") {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        writeln!(out, "{json}")?;
        return Ok(());
    }

    writeln!(out, "FinTrack — Financial Report")?;
    writeln!(out, "{}", "─".repeat(40))?;
    writeln!(out, "  Income:    {}", format_amount(report.total_income))?;
    writeln!(out, "  Expenses:  {}", format_amount(report.total_expenses))?;
    writeln!(out, "  Balance:   {}", format_amount(report.balance))?;

    for (title, breakdown) in [
        ("Expenses by Category", &report.expenses_by_category),
        ("Income by Category", &report.incomes_by_category),
    ] {
        if breakdown.is_empty() {
            continue;
        }
        writeln!(out)?;
        writeln!(out, "{title}:")?;
        for (name, amount) in breakdown {
            writeln!(out, "  {name:<24} {}", format_amount(*amount))?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Monthly Trend:")?;
    writeln!(out, "  {:<10} {:>14} {:>14}", "Month", "Income", "Expenses")?;
    for bucket in &report.monthly_data {
        writeln!(
            out,
            "  {:<10} {:>14} {:>14}",
            bucket.label,
            format_amount(bucket.income),
            format_amount(bucket.expenses)
        )?;
    }
    Ok(())
}

fn cli_export<S: Storage>(
    args: &[String],
    data: &FinanceData<S>,
    out: &mut impl Write,
) -> Result<()> {
    let path = positionals(args)
        .first()
        .map(|p| PathBuf::from(shellexpand(p)))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(format!("fintrack-export-{}.csv", today().format("%Y-%m-%d")))
        });

    let count = crate::export::export_to_csv(data.transactions(), &path)?;
    if count == 0 {
        writeln!(out, "No transactions to export")?;
    } else {
        writeln!(out, "Exported {count} transactions to {}", path.display())?;
    }
    Ok(())
}

fn cli_categories(out: &mut impl Write) -> Result<()> {
    for kind in [TransactionType::Income, TransactionType::Expense] {
        writeln!(out, "{kind}:")?;
        for name in categories_for(kind) {
            writeln!(out, "  {name}")?;
        }
    }
    Ok(())
}

fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
