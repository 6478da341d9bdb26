use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use super::generation::{RequestGeneration, Synced};
use super::SyncError;
use crate::api::{ApiClient, HttpTransport, Method, ReqwestTransport};
use crate::models::{parse_amount, Expense, ExpenseSummary, Loadable, NewExpense};

/// Expense list and server totals, always applied together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpenseSnapshot {
    pub expenses: Vec<Expense>,
    pub summary: ExpenseSummary,
}

pub struct ExpenseController<T: HttpTransport = ReqwestTransport> {
    api: ApiClient<T>,
    generation: RequestGeneration,
    held: Mutex<Loadable<ExpenseSnapshot>>,
}

impl<T: HttpTransport> ExpenseController<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            generation: RequestGeneration::new(),
            held: Mutex::new(Loadable::NotLoaded),
        }
    }

    fn held(&self) -> MutexGuard<'_, Loadable<ExpenseSnapshot>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches the list and the summary concurrently.
    ///
    /// Both must succeed before anything is applied; on failure the held
    /// snapshot stays as it was.
    pub async fn refresh(&self) -> Result<Synced<ExpenseSnapshot>, SyncError> {
        let ticket = self.generation.begin();
        let (expenses, summary) = futures::try_join!(
            self.api.get_json::<Vec<Expense>>("/expenses"),
            self.api.get_json::<ExpenseSummary>("/expenses/summary"),
        )?;
        let snapshot = ExpenseSnapshot { expenses, summary };

        let mut held = self.held();
        if !self.generation.is_current(ticket) {
            debug!("Discarding superseded expense snapshot");
            return Ok(Synced::Superseded);
        }
        debug!(
            "Loaded {} expenses, total {}",
            snapshot.expenses.len(),
            snapshot.summary.total_spending
        );
        *held = Loadable::Loaded(snapshot.clone());
        Ok(Synced::Applied(snapshot))
    }

    /// Validates operator input, records the expense, then refreshes.
    pub async fn create(
        &self,
        category: &str,
        amount_text: &str,
    ) -> Result<Synced<ExpenseSnapshot>, SyncError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(SyncError::EmptyInput("category"));
        }
        let amount = parse_amount(amount_text)
            .ok_or_else(|| SyncError::InvalidAmount(amount_text.trim().to_string()))?;

        let _: Value = self
            .api
            .send_json(
                "/expenses",
                Method::Post,
                Some(&NewExpense { category, amount }),
                true,
            )
            .await?;
        debug!("Recorded {} under {:?}", amount, category);
        self.refresh().await
    }

    pub fn snapshot(&self) -> Loadable<ExpenseSnapshot> {
        self.held().clone()
    }

    pub fn clear(&self) {
        self.generation.begin();
        *self.held() = Loadable::NotLoaded;
    }
}
