use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const HIGH_SPENDING_THRESHOLD: f64 = 5000.0;
const MODERATE_SPENDING_THRESHOLD: f64 = 2000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub category: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewExpense<'a> {
    pub category: &'a str,
    pub amount: f64,
}

/// Server-computed totals. `categories` arrives as `[[name, amount], ...]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub total_spending: f64,
    #[serde(default)]
    pub categories: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    pub percent: f64,
}

impl ExpenseSummary {
    pub fn shares(&self) -> Vec<CategoryShare> {
        self.categories
            .iter()
            .map(|(category, amount)| CategoryShare {
                category: category.clone(),
                amount: *amount,
                percent: percent_of(*amount, self.total_spending),
            })
            .collect()
    }

    pub fn budget_status(&self) -> BudgetStatus {
        BudgetStatus::from_total(self.total_spending)
    }
}

/// Share of `total` taken by `amount`, in percent.
///
/// Returns 0 whenever the total is zero, negative or not finite.
pub fn percent_of(amount: f64, total: f64) -> f64 {
    if !total.is_finite() || total <= 0.0 || !amount.is_finite() {
        return 0.0;
    }
    let percent = amount / total * 100.0;
    if percent.is_finite() {
        percent
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    UnderControl,
    Moderate,
    High,
}

impl BudgetStatus {
    pub fn from_total(total: f64) -> Self {
        if total > HIGH_SPENDING_THRESHOLD {
            BudgetStatus::High
        } else if total > MODERATE_SPENDING_THRESHOLD {
            BudgetStatus::Moderate
        } else {
            BudgetStatus::UnderControl
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            BudgetStatus::High => "High spending detected! Consider reviewing your expenses.",
            BudgetStatus::Moderate => "Moderate spending. Keep tracking!",
            BudgetStatus::UnderControl => "Your spending is under control.",
        }
    }
}

/// Parses user-entered amount text. Only finite, positive numbers are accepted.
pub fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim().trim_start_matches('$');
    let amount: f64 = trimmed.parse().ok()?;
    if amount.is_finite() && amount > 0.0 {
        Some(amount)
    } else {
        None
    }
}

pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}
