use super::TransactionType;

pub const INCOME_CATEGORIES: &[&str] = &[
    "Salary",
    "Freelance",
    "Investment",
    "Business",
    "Gift",
    "Other Income",
];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Education",
    "Travel",
    "Other Expenses",
];

/// Categories offered for a transaction type.
pub fn categories_for(kind: TransactionType) -> &'static [&'static str] {
    match kind {
        TransactionType::Income => INCOME_CATEGORIES,
        TransactionType::Expense => EXPENSE_CATEGORIES,
    }
}

/// Find the canonical spelling of a category (case-insensitive) for a type.
pub fn canonical_category(kind: TransactionType, name: &str) -> Option<&'static str> {
    let lower = name.trim().to_lowercase();
    categories_for(kind)
        .iter()
        .find(|c| c.to_lowercase() == lower)
        .copied()
}
