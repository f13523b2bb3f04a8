use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub monthly_limit: Decimal,
    /// Two-digit month: "01" through "12"
    pub month: String,
    pub year: i32,
    /// Snapshot written at creation or by a patch. Reports recompute usage
    /// from transactions instead of reading this.
    #[serde(default)]
    pub current_usage: Decimal,
}

impl Budget {
    /// Month as a number, or `None` when the stored string is not 1-12.
    pub fn month_number(&self) -> Option<u32> {
        self.month
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|m| (1..=12).contains(m))
    }

    /// Format: "YYYY-MM"
    pub fn period(&self) -> String {
        format!("{}-{}", self.year, self.month)
    }

    pub(crate) fn apply(&mut self, patch: BudgetPatch) {
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(limit) = patch.monthly_limit {
            self.monthly_limit = limit;
        }
        if let Some(month) = patch.month {
            self.month = month;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(usage) = patch.current_usage {
            self.current_usage = usage;
        }
    }
}

/// Budget fields supplied by the caller; id and usage are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub category: String,
    pub monthly_limit: Decimal,
    pub month: String,
    pub year: i32,
}

impl NewBudget {
    pub fn new(category: String, monthly_limit: Decimal, month: u32, year: i32) -> Self {
        Self {
            category,
            monthly_limit,
            month: format!("{month:02}"),
            year,
        }
    }

    pub(crate) fn into_budget(self, id: String) -> Budget {
        Budget {
            id,
            category: self.category,
            monthly_limit: self.monthly_limit,
            month: self.month,
            year: self.year,
            current_usage: Decimal::ZERO,
        }
    }
}

/// Partial update for a budget. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetPatch {
    pub category: Option<String>,
    pub monthly_limit: Option<Decimal>,
    pub month: Option<String>,
    pub year: Option<i32>,
    pub current_usage: Option<Decimal>,
}

impl BudgetPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Move the budget to another month.
    pub fn with_period(mut self, month: u32, year: i32) -> Self {
        self.month = Some(format!("{month:02}"));
        self.year = Some(year);
        self
    }
}

/// Split a "YYYY-MM" period into its month (1-12) and year.
pub fn parse_period(s: &str) -> Option<(u32, i32)> {
    let (year, month) = s.trim().split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    (1..=12).contains(&month).then_some((month, year))
}
