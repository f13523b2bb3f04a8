use chrono::NaiveDate;

use crate::models::{Budget, BudgetPatch, NewBudget, NewTransaction, Transaction};
use crate::report::{self, BudgetView, ReportData};
use crate::storage::{self, Storage, BUDGETS_KEY, TRANSACTIONS_KEY};

/// Number of transactions shown in the "recent" list.
pub(crate) const RECENT_LIMIT: usize = 10;

/// Emitted by every mutation that changed state. The presentation layer
/// drains these with [`FinanceData::take_events`] and re-renders.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FinanceEvent {
    TransactionAdded(Transaction),
    TransactionDeleted(Transaction),
    BudgetAdded(Budget),
    BudgetUpdated(Budget),
    BudgetDeleted(Budget),
}

impl std::fmt::Display for FinanceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TransactionAdded(t) => write!(f, "Added {} {} ({})", t.kind, t.id, t.category),
            Self::TransactionDeleted(t) => write!(f, "Deleted {} {}", t.kind, t.id),
            Self::BudgetAdded(b) => write!(f, "Added budget {} ({} {})", b.id, b.category, b.period()),
            Self::BudgetUpdated(b) => write!(f, "Updated budget {} ({} {})", b.id, b.category, b.period()),
            Self::BudgetDeleted(b) => write!(f, "Deleted budget {}", b.id),
        }
    }
}

/// Time-based ids that stay unique when several records are created within
/// the same millisecond.
#[derive(Debug)]
struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    fn seeded<'a>(existing: impl Iterator<Item = &'a str>) -> Self {
        let last = existing
            .filter_map(|id| id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Self { last }
    }

    fn next(&mut self, now_millis: i64) -> String {
        let id = now_millis.max(self.last + 1);
        self.last = id;
        id.to_string()
    }
}

/// Owns the transaction and budget collections and writes each one back to
/// storage after it changes.
pub(crate) struct FinanceData<S: Storage> {
    storage: S,
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    ids: IdGenerator,
    events: Vec<FinanceEvent>,
}

impl<S: Storage> FinanceData<S> {
    pub(crate) fn load(storage: S) -> Self {
        let transactions: Vec<Transaction> = storage::load_collection(&storage, TRANSACTIONS_KEY);
        let budgets: Vec<Budget> = storage::load_collection(&storage, BUDGETS_KEY);
        tracing::info!(
            transactions = transactions.len(),
            budgets = budgets.len(),
            "loaded finance data"
        );
        let ids = IdGenerator::seeded(
            transactions
                .iter()
                .map(|t| t.id.as_str())
                .chain(budgets.iter().map(|b| b.id.as_str())),
        );
        Self {
            storage,
            transactions,
            budgets,
            ids,
            events: Vec::new(),
        }
    }

    // ── Transactions ──────────────────────────────────────────

    /// Most recent first.
    pub(crate) fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub(crate) fn recent_transactions(&self, limit: usize) -> &[Transaction] {
        &self.transactions[..limit.min(self.transactions.len())]
    }

    pub(crate) fn add_transaction(&mut self, new: NewTransaction) -> Transaction {
        let txn = new.into_transaction(self.fresh_id());
        tracing::debug!(id = %txn.id, kind = %txn.kind, amount = %txn.amount, "adding transaction");
        self.transactions.insert(0, txn.clone());
        self.persist_transactions();
        self.events.push(FinanceEvent::TransactionAdded(txn.clone()));
        txn
    }

    /// Remove a transaction. Unknown ids are ignored; returns whether
    /// anything was removed.
    pub(crate) fn delete_transaction(&mut self, id: &str) -> bool {
        let Some(pos) = self.transactions.iter().position(|t| t.id == id) else {
            return false;
        };
        let removed = self.transactions.remove(pos);
        tracing::debug!(id, "deleted transaction");
        self.persist_transactions();
        self.events.push(FinanceEvent::TransactionDeleted(removed));
        true
    }

    // ── Budgets ───────────────────────────────────────────────

    pub(crate) fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub(crate) fn add_budget(&mut self, new: NewBudget) -> Budget {
        let budget = new.into_budget(self.fresh_id());
        tracing::debug!(id = %budget.id, category = %budget.category, "adding budget");
        self.budgets.insert(0, budget.clone());
        self.persist_budgets();
        self.events.push(FinanceEvent::BudgetAdded(budget.clone()));
        budget
    }

    /// Merge `patch` into the budget with `id`. Returns the updated budget,
    /// or `None` when no budget matches.
    pub(crate) fn update_budget(&mut self, id: &str, patch: BudgetPatch) -> Option<Budget> {
        let budget = self.budgets.iter_mut().find(|b| b.id == id)?;
        budget.apply(patch);
        let updated = budget.clone();
        tracing::debug!(id, "updated budget");
        self.persist_budgets();
        self.events.push(FinanceEvent::BudgetUpdated(updated.clone()));
        Some(updated)
    }

    pub(crate) fn delete_budget(&mut self, id: &str) -> bool {
        let Some(pos) = self.budgets.iter().position(|b| b.id == id) else {
            return false;
        };
        let removed = self.budgets.remove(pos);
        tracing::debug!(id, "deleted budget");
        self.persist_budgets();
        self.events.push(FinanceEvent::BudgetDeleted(removed));
        true
    }

    // ── Derived views ─────────────────────────────────────────

    pub(crate) fn generate_report_data(&self) -> ReportData {
        self.report_as_of(chrono::Local::now().date_naive())
    }

    pub(crate) fn report_as_of(&self, today: NaiveDate) -> ReportData {
        report::generate_report(&self.transactions, today)
    }

    /// Every budget with usage recomputed from the current transactions.
    pub(crate) fn budget_views(&self) -> Vec<BudgetView> {
        self.budgets
            .iter()
            .map(|b| report::budget_view(b, &self.transactions))
            .collect()
    }

    pub(crate) fn take_events(&mut self) -> Vec<FinanceEvent> {
        std::mem::take(&mut self.events)
    }

    #[cfg(test)]
    pub(crate) fn into_storage(self) -> S {
        self.storage
    }

    // ── Internals ─────────────────────────────────────────────

    fn fresh_id(&mut self) -> String {
        self.ids.next(chrono::Utc::now().timestamp_millis())
    }

    fn persist_transactions(&mut self) {
        if let Err(e) =
            storage::save_collection(&mut self.storage, TRANSACTIONS_KEY, &self.transactions)
        {
            tracing::warn!(error = %e, "failed to persist transactions");
        }
    }

    fn persist_budgets(&mut self) {
        if let Err(e) = storage::save_collection(&mut self.storage, BUDGETS_KEY, &self.budgets) {
            tracing::warn!(error = %e, "failed to persist budgets");
        }
    }
}
