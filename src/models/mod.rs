mod budget;
mod category;
mod transaction;

pub use budget::{parse_period, Budget, BudgetPatch, NewBudget};
pub use category::{canonical_category, categories_for, EXPENSE_CATEGORIES};
pub use transaction::{NewTransaction, Transaction, TransactionType};
