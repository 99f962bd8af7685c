//! In-memory transaction provider.
//!
//! Serves a [`Dataset`] loaded from JSON, paginating the transaction list the
//! same way the HTTP API does: pages of `page_size` items, `nextPage` set to
//! `page + 1` while items remain.  Approvals are written back into the
//! dataset so later fetches observe them.
//!
//! Used for offline runs (the demo dataset is compiled in) and as the data
//! backing of the test provider.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Employee, EmployeeId, Page, PageToken, Transaction, TransactionApi};
use crate::error::{ConfigError, FetchFailure};

const DEMO_DATASET: &str = include_str!("../../data/demo.json");

/// Default number of transactions per page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Employees and transactions served by a [`FixtureApi`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub employees: Vec<Employee>,
    pub transactions: Vec<Transaction>,
}

impl Dataset {
    /// The dataset bundled with the binary.
    pub fn demo() -> Result<Self, serde_json::Error> {
        serde_json::from_str(DEMO_DATASET)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

pub struct FixtureApi {
    label: String,
    dataset: Mutex<Dataset>,
    page_size: usize,
    latency: Duration,
}

impl FixtureApi {
    pub fn new(label: impl Into<String>, dataset: Dataset) -> Self {
        Self {
            label: label.into(),
            dataset: Mutex::new(dataset),
            page_size: DEFAULT_PAGE_SIZE,
            latency: Duration::ZERO,
        }
    }

    /// Read a dataset from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Dataset::from_json(&json).map_err(|source| ConfigError::Fixture {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), dataset))
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Delay every request by `latency`, to make loading states visible.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn dataset(&self) -> MutexGuard<'_, Dataset> {
        self.dataset.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Slice one page out of `transactions`.  Pure so the paging arithmetic
    /// can be tested without a runtime.
    pub fn paginate(
        transactions: &[Transaction],
        page: PageToken,
        page_size: usize,
    ) -> Result<Page<Transaction>, FetchFailure> {
        let start = page.0 as usize * page_size;
        if start > transactions.len() {
            return Err(FetchFailure::Unavailable(format!("invalid page {page}")));
        }
        let end = (start + page_size).min(transactions.len());
        let next_page = (end < transactions.len()).then(|| page.next());
        Ok(Page {
            data: transactions[start..end].to_vec(),
            next_page,
        })
    }
}

#[async_trait]
impl TransactionApi for FixtureApi {
    fn name(&self) -> &str {
        &self.label
    }

    async fn employees(&self) -> Result<Vec<Employee>, FetchFailure> {
        self.simulate_latency().await;
        Ok(self.dataset().employees.clone())
    }

    async fn paginated_transactions(
        &self,
        page: PageToken,
    ) -> Result<Page<Transaction>, FetchFailure> {
        self.simulate_latency().await;
        Self::paginate(&self.dataset().transactions, page, self.page_size)
    }

    async fn transactions_by_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Transaction>, FetchFailure> {
        self.simulate_latency().await;
        let dataset = self.dataset();
        if !dataset.employees.iter().any(|e| e.id == employee_id.as_str()) {
            return Err(FetchFailure::Unavailable(format!(
                "unknown employee {employee_id}"
            )));
        }
        Ok(dataset
            .transactions
            .iter()
            .filter(|t| t.employee.id == employee_id.as_str())
            .cloned()
            .collect())
    }

    async fn set_transaction_approval(
        &self,
        transaction_id: &str,
        approved: bool,
    ) -> Result<(), FetchFailure> {
        self.simulate_latency().await;
        let mut dataset = self.dataset();
        match dataset.transactions.iter_mut().find(|t| t.id == transaction_id) {
            Some(txn) => {
                txn.approved = approved;
                Ok(())
            }
            None => Err(FetchFailure::Unavailable(format!(
                "unknown transaction {transaction_id}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> FixtureApi {
        FixtureApi::new("demo", Dataset::demo().unwrap())
    }

    #[test]
    fn demo_dataset_parses() {
        let dataset = Dataset::demo().unwrap();
        assert!(!dataset.employees.is_empty());
        assert!(dataset.transactions.len() > DEFAULT_PAGE_SIZE);
        assert!(dataset.employees.iter().all(|e| !e.id.is_empty()));
    }

    #[test]
    fn paginate_reports_next_page_until_exhausted() {
        let txns = Dataset::demo().unwrap().transactions;
        let total = txns.len();

        let first = FixtureApi::paginate(&txns, PageToken::FIRST, 5).unwrap();
        assert_eq!(first.data.len(), 5);
        assert_eq!(first.next_page, Some(PageToken(1)));

        let last_index = (total - 1) / 5;
        let last = FixtureApi::paginate(&txns, PageToken(last_index as u32), 5).unwrap();
        assert!(last.is_exhausted());
        assert_eq!(last.data.len(), total - last_index * 5);
    }

    #[test]
    fn paginate_rejects_page_past_the_end() {
        let txns = Dataset::demo().unwrap().transactions;
        let result = FixtureApi::paginate(&txns, PageToken(1000), 5);
        assert!(matches!(result, Err(FetchFailure::Unavailable(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = FixtureApi::load(Path::new("/nonexistent/fixture.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let api = demo().with_page_size(0);
        assert_eq!(api.page_size, 1);
    }

    #[tokio::test]
    async fn transactions_by_employee_filters_on_id() {
        let api = demo();
        let id = EmployeeId::new(api.dataset().employees[0].id.clone()).unwrap();
        let txns = api.transactions_by_employee(&id).await.unwrap();
        assert!(!txns.is_empty());
        assert!(txns.iter().all(|t| t.employee.id == id.as_str()));
    }

    #[tokio::test]
    async fn unknown_employee_is_an_error() {
        let api = demo();
        let id = EmployeeId::new("nobody").unwrap();
        assert!(api.transactions_by_employee(&id).await.is_err());
    }

    #[tokio::test]
    async fn approval_is_persisted() {
        let api = demo();
        let id = api.dataset().transactions[0].id.clone();
        let before = api.dataset().transactions[0].approved;

        api.set_transaction_approval(&id, !before).await.unwrap();

        let page = api.paginated_transactions(PageToken::FIRST).await.unwrap();
        assert_eq!(page.data[0].approved, !before);
    }
}
