//! Transaction provider abstraction layer.
//!
//! This module defines the [`TransactionApi`] trait and the shared data types.
//! Concrete providers live in sub-modules: [`http`] talks to a running
//! transaction API, [`fixture`] serves an in-memory dataset.
//!
//! ## For contributors: adding a new provider
//!
//! 1. Create a new file in this directory (e.g. `sqlite.rs`).
//! 2. Define a struct and implement [`TransactionApi`] for it.
//! 3. Add `mod sqlite;` below and re-export your struct in the `pub use` block.
//! 4. Construct it in `main.rs` where the provider is chosen from the config.
//!
//! Caching, invalidation and view selection sit above this trait in
//! [`crate::cache`] and [`crate::coordinator`]; providers only move data.

mod fixture;
mod http;
#[cfg(test)]
pub mod scripted;
mod transaction;

pub use fixture::{Dataset, FixtureApi, DEFAULT_PAGE_SIZE};
pub use http::HttpApi;
pub use transaction::{Employee, EmployeeId, Page, PageToken, Transaction};

use async_trait::async_trait;

use crate::error::FetchFailure;

/// Trait that every transaction provider must implement.
///
/// Requests are issued from tokio tasks, so implementations must be
/// [`Send`] + [`Sync`].  Each call is one request: no caching, no retries.
#[async_trait]
pub trait TransactionApi: Send + Sync {
    /// Human-readable label shown in the status bar.
    fn name(&self) -> &str;

    /// The whole employee directory.
    async fn employees(&self) -> Result<Vec<Employee>, FetchFailure>;

    /// One page of the all-transactions feed.
    async fn paginated_transactions(&self, page: PageToken)
        -> Result<Page<Transaction>, FetchFailure>;

    /// Every transaction of one employee, unpaginated.
    async fn transactions_by_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Transaction>, FetchFailure>;

    /// Persist the approval flag of one transaction.
    async fn set_transaction_approval(
        &self,
        transaction_id: &str,
        approved: bool,
    ) -> Result<(), FetchFailure>;
}
