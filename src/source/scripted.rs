//! Test provider with request counting, fault injection and gating.
//!
//! Wraps a [`FixtureApi`] over the demo dataset.  A request key can be
//! *gated*: the request then parks on a [`Notify`] until the test calls
//! [`ScriptedApi::release`], which makes interleavings deterministic.
//!
//! Keys: `"employees"`, `"page:N"`, `"employee:ID"`, `"approval:ID"`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{
    Dataset, Employee, EmployeeId, FixtureApi, Page, PageToken, Transaction, TransactionApi,
};
use crate::error::FetchFailure;

pub struct ScriptedApi {
    inner: FixtureApi,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    failing: Mutex<HashSet<String>>,
    log: Mutex<Vec<String>>,
    pub page_requests: AtomicUsize,
    pub employee_requests: AtomicUsize,
    pub directory_requests: AtomicUsize,
}

impl ScriptedApi {
    /// Demo dataset, pages of 5.
    pub fn demo() -> Self {
        Self::with_dataset(Dataset::demo().unwrap())
    }

    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            inner: FixtureApi::new("scripted", dataset),
            gates: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            log: Mutex::new(Vec::new()),
            page_requests: AtomicUsize::new(0),
            employee_requests: AtomicUsize::new(0),
            directory_requests: AtomicUsize::new(0),
        }
    }

    /// Park requests for `key` until released.
    pub fn gate(&self, key: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), Arc::new(Notify::new()));
    }

    /// Let one parked (or the next) request for `key` through.
    pub fn release(&self, key: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(key) {
            gate.notify_one();
        }
    }

    pub fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }

    /// Keys of every request issued so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn dataset_page(&self, page: u32) -> Page<Transaction> {
        let txns = Dataset::demo().unwrap().transactions;
        FixtureApi::paginate(&txns, PageToken(page), super::DEFAULT_PAGE_SIZE).unwrap()
    }

    async fn enter(&self, key: String) -> Result<(), FetchFailure> {
        self.log.lock().unwrap().push(key.clone());
        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing.lock().unwrap().contains(&key) {
            return Err(FetchFailure::Unavailable(format!("{key} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionApi for ScriptedApi {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn employees(&self) -> Result<Vec<Employee>, FetchFailure> {
        self.directory_requests.fetch_add(1, Ordering::SeqCst);
        self.enter("employees".to_string()).await?;
        self.inner.employees().await
    }

    async fn paginated_transactions(
        &self,
        page: PageToken,
    ) -> Result<Page<Transaction>, FetchFailure> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        self.enter(format!("page:{page}")).await?;
        self.inner.paginated_transactions(page).await
    }

    async fn transactions_by_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Transaction>, FetchFailure> {
        self.employee_requests.fetch_add(1, Ordering::SeqCst);
        self.enter(format!("employee:{employee_id}")).await?;
        self.inner.transactions_by_employee(employee_id).await
    }

    async fn set_transaction_approval(
        &self,
        transaction_id: &str,
        approved: bool,
    ) -> Result<(), FetchFailure> {
        self.enter(format!("approval:{transaction_id}")).await?;
        self.inner
            .set_transaction_approval(transaction_id, approved)
            .await
    }
}
