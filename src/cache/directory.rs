//! The employee directory that feeds the filter picker.

use std::sync::Arc;

use super::{DataSource, StalePolicy};
use crate::error::CoreError;
use crate::source::{Employee, TransactionApi};

pub struct EmployeeDirectory {
    source: DataSource<Vec<Employee>>,
    api: Arc<dyn TransactionApi>,
}

impl EmployeeDirectory {
    pub fn new(api: Arc<dyn TransactionApi>, policy: StalePolicy) -> Self {
        Self {
            source: DataSource::new("employees", policy),
            api,
        }
    }

    pub fn cached(&self) -> Option<Vec<Employee>> {
        self.source.cached()
    }

    pub fn is_loaded(&self) -> bool {
        self.source.with_cached(|employees| employees.is_some())
    }

    pub fn is_loading(&self) -> bool {
        self.source.is_loading()
    }

    pub async fn fetch_all(&self) -> Result<(), CoreError> {
        self.source
            .fetch(self.api.employees(), |_, employees| employees)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::source::scripted::ScriptedApi;

    #[tokio::test]
    async fn fetch_all_loads_every_employee() {
        let api = Arc::new(ScriptedApi::demo());
        let dir = EmployeeDirectory::new(api.clone(), StalePolicy::DiscardSuperseded);
        assert!(!dir.is_loaded());

        dir.fetch_all().await.unwrap();

        assert_eq!(dir.cached().unwrap().len(), 4);
        assert_eq!(api.directory_requests.load(Ordering::SeqCst), 1);
        assert!(!dir.is_loading());
    }
}
