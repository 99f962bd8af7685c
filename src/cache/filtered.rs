//! One employee's transactions.  Each fetch replaces the cache wholesale.

use std::sync::Arc;

use super::{DataSource, InFlight, StalePolicy};
use crate::error::{CoreError, FetchFailure};
use crate::source::{EmployeeId, Transaction, TransactionApi};

pub struct FilteredSource {
    source: DataSource<Vec<Transaction>>,
    api: Arc<dyn TransactionApi>,
}

/// A by-employee request that has been started but not yet settled.
pub struct PendingEmployee<'a> {
    in_flight: InFlight<'a, Vec<Transaction>>,
    api: &'a dyn TransactionApi,
    employee_id: EmployeeId,
}

impl PendingEmployee<'_> {
    pub fn employee_id(&self) -> &EmployeeId {
        &self.employee_id
    }

    pub fn applies(&self) -> bool {
        self.in_flight.applies()
    }

    pub async fn request(&self) -> Result<Vec<Transaction>, FetchFailure> {
        self.api.transactions_by_employee(&self.employee_id).await
    }

    pub fn settle(
        self,
        outcome: Result<Vec<Transaction>, FetchFailure>,
    ) -> Result<Option<Vec<Transaction>>, CoreError> {
        self.in_flight.settle(outcome, |_, transactions| transactions)
    }
}

impl FilteredSource {
    pub fn new(api: Arc<dyn TransactionApi>, policy: StalePolicy) -> Self {
        Self {
            source: DataSource::new("employee transactions", policy),
            api,
        }
    }

    pub fn cached(&self) -> Option<Vec<Transaction>> {
        self.source.cached()
    }

    pub fn is_loading(&self) -> bool {
        self.source.is_loading()
    }

    pub fn invalidate(&self) {
        self.source.invalidate();
    }

    pub(crate) fn update_cached(&self, f: impl FnOnce(&mut Vec<Transaction>)) -> bool {
        self.source.update_cached(f)
    }

    pub fn begin(&self, employee_id: EmployeeId) -> PendingEmployee<'_> {
        PendingEmployee {
            in_flight: self.source.begin(),
            api: self.api.as_ref(),
            employee_id,
        }
    }

    pub async fn fetch_by_id(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<Vec<Transaction>>, CoreError> {
        let pending = self.begin(employee_id.clone());
        let outcome = pending.request().await;
        pending.settle(outcome)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::scripted::ScriptedApi;

    fn filtered() -> (Arc<ScriptedApi>, FilteredSource) {
        let api = Arc::new(ScriptedApi::demo());
        let src = FilteredSource::new(api.clone(), StalePolicy::DiscardSuperseded);
        (api, src)
    }

    fn id(raw: &str) -> EmployeeId {
        EmployeeId::new(raw).unwrap()
    }

    #[tokio::test]
    async fn fetch_by_id_replaces_cache() {
        let (_api, src) = filtered();

        src.fetch_by_id(&id("e1")).await.unwrap();
        let second = src.fetch_by_id(&id("e2")).await.unwrap().unwrap();

        assert!(!second.is_empty());
        assert!(second.iter().all(|t| t.employee.id == "e2"));
    }

    #[tokio::test]
    async fn failure_keeps_previous_employee() {
        let (api, src) = filtered();
        src.fetch_by_id(&id("e1")).await.unwrap();
        api.fail("employee:e2");

        assert!(src.fetch_by_id(&id("e2")).await.is_err());

        let cached = src.cached().unwrap();
        assert!(cached.iter().all(|t| t.employee.id == "e1"));
        assert!(!src.is_loading());
    }
}
