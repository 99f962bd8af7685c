//! Decides which transaction source is authoritative for display.
//!
//! [`ViewCoordinator`] owns the paginated feed and the per-employee source
//! and never exposes them for direct mutation.  Every intent first
//! invalidates the source it supersedes and only then starts the fetch on
//! its target, so at most one of the two caches is populated at any time.
//!
//! The displayed result, the "has more" flag and the [`ViewPhase`] are all
//! derived on read from the two caches; nothing derived is stored.
//!
//! ## Locking
//!
//! One step lock serialises the synchronous halves of every operation
//! (invalidate + fetch start, fetch settle) and every snapshot.  It is never
//! held across an `.await`, so requests themselves overlap freely.
//!
//! A settle that populates one source invalidates the other and retargets
//! the view.  With [`StalePolicy::DiscardSuperseded`] that never changes
//! anything; with [`StalePolicy::LastSettledWins`] it is what keeps a late
//! response from leaving both caches populated.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use crate::cache::{EmployeeDirectory, FilteredSource, PaginatedFeedSource, StalePolicy};
use crate::error::CoreError;
use crate::source::{Employee, EmployeeId, Transaction, TransactionApi};

/// What the user asked to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Employee(EmployeeId),
}

impl Selection {
    /// The sentinel (empty) id selects everything.
    pub fn from_id(employee_id: &str) -> Self {
        match EmployeeId::new(employee_id) {
            Ok(id) => Selection::Employee(id),
            Err(_) => Selection::All,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewPhase {
    #[default]
    Uninitialized,
    LoadingAll,
    ShowingAll,
    LoadingFiltered,
    ShowingFiltered,
}

/// Everything the rendering layer reads, captured under one lock.
#[derive(Debug, Clone, Default)]
pub struct ViewSnapshot {
    pub phase: ViewPhase,
    pub selection: Option<Selection>,
    /// The transactions to display.  `None` while nothing is cached.
    pub transactions: Option<Vec<Transaction>>,
    pub has_more: bool,
    pub view_more_visible: bool,
    pub view_more_enabled: bool,
    pub employees: Option<Vec<Employee>>,
    pub employees_loading: bool,
}

#[derive(Debug, Default)]
struct Progress {
    bootstrapped: bool,
    target: Option<Selection>,
}

pub struct ViewCoordinator {
    paginated: PaginatedFeedSource,
    filtered: FilteredSource,
    directory: Arc<EmployeeDirectory>,
    api: Arc<dyn TransactionApi>,
    progress: Mutex<Progress>,
}

impl ViewCoordinator {
    pub fn new(
        api: Arc<dyn TransactionApi>,
        directory: Arc<EmployeeDirectory>,
        policy: StalePolicy,
    ) -> Self {
        Self {
            paginated: PaginatedFeedSource::new(api.clone(), policy),
            filtered: FilteredSource::new(api.clone(), policy),
            directory,
            api,
            progress: Mutex::new(Progress::default()),
        }
    }

    fn step(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- derived state -------------------------------------------------------

    /// The paginated feed wins only because the filtered cache is always
    /// invalidated before the feed is fetched.
    fn active_result_locked(&self) -> Option<Vec<Transaction>> {
        self.paginated
            .with_cached(|page| page.map(|p| p.data.clone()))
            .or_else(|| self.filtered.cached())
    }

    fn phase_locked(&self, progress: &Progress) -> ViewPhase {
        match progress.target {
            None => ViewPhase::Uninitialized,
            Some(Selection::All) if self.paginated.is_loading() => ViewPhase::LoadingAll,
            Some(Selection::All) => ViewPhase::ShowingAll,
            Some(Selection::Employee(_)) if self.filtered.is_loading() => {
                ViewPhase::LoadingFiltered
            }
            Some(Selection::Employee(_)) => ViewPhase::ShowingFiltered,
        }
    }

    pub fn active_result(&self) -> Option<Vec<Transaction>> {
        let _step = self.step();
        self.active_result_locked()
    }

    /// Only the paginated feed can have more; an invalidated feed has none.
    pub fn has_more(&self) -> bool {
        let _step = self.step();
        self.paginated.has_more()
    }

    /// The feed settled with data: it is now the only populated source.
    fn feed_settled(&self, progress: &mut Progress) {
        if self.filtered.cached().is_some() {
            debug!("feed settled last, dropping employee transactions");
            self.filtered.invalidate();
        }
        progress.target = Some(Selection::All);
    }

    /// An employee fetch settled with data: the feed gives way.
    fn employee_settled(&self, progress: &mut Progress, employee_id: EmployeeId) {
        if self.paginated.with_cached(|page| page.is_some()) {
            debug!("employee transactions settled last, dropping feed");
            self.paginated.invalidate();
        }
        progress.target = Some(Selection::Employee(employee_id));
    }

    pub fn phase(&self) -> ViewPhase {
        let progress = self.step();
        self.phase_locked(&progress)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let progress = self.step();
        let transactions = self.active_result_locked();
        let has_more = self.paginated.has_more();
        ViewSnapshot {
            phase: self.phase_locked(&progress),
            selection: progress.target.clone(),
            view_more_visible: transactions.is_some() && has_more,
            view_more_enabled: !self.paginated.is_loading(),
            transactions,
            has_more,
            employees: self.directory.cached(),
            employees_loading: self.directory.is_loading(),
        }
    }

    // -- intents -------------------------------------------------------------

    /// Show the whole feed, restarting from page 1.
    pub async fn select_all(&self) -> Result<(), CoreError> {
        let pending = {
            let mut progress = self.step();
            progress.target = Some(Selection::All);
            self.filtered.invalidate();
            self.paginated.begin_first()
        };
        info!("showing all transactions");

        let outcome = pending.request().await;
        let mut progress = self.step();
        let applies = pending.applies();
        if pending.settle(outcome)?.is_some() && applies {
            self.feed_settled(&mut progress);
        }
        Ok(())
    }

    /// Show one employee's transactions.  The sentinel id shows everything.
    pub async fn select_employee(&self, employee_id: &str) -> Result<(), CoreError> {
        match Selection::from_id(employee_id) {
            Selection::All => self.select_all().await,
            Selection::Employee(id) => self.show_employee(id).await,
        }
    }

    async fn show_employee(&self, employee_id: EmployeeId) -> Result<(), CoreError> {
        info!("showing transactions of employee {employee_id}");
        let pending = {
            let mut progress = self.step();
            progress.target = Some(Selection::Employee(employee_id.clone()));
            self.paginated.invalidate();
            self.filtered.begin(employee_id)
        };

        let outcome = pending.request().await;
        let employee_id = pending.employee_id().clone();
        let mut progress = self.step();
        let applies = pending.applies();
        if pending.settle(outcome)?.is_some() && applies {
            self.employee_settled(&mut progress, employee_id);
        }
        Ok(())
    }

    /// Map a picker event onto an intent.  `None` means the picker closed
    /// without a choice.
    pub async fn apply_selection(&self, selection: Option<&Employee>) -> Result<(), CoreError> {
        match selection {
            None => {
                debug!("selection closed without a choice");
                Ok(())
            }
            Some(employee) => self.select_employee(&employee.id).await,
        }
    }

    /// Append the next page of the feed.
    ///
    /// Ignored unless the feed is the active source, has more pages and is
    /// not already loading.
    pub async fn load_more(&self) -> Result<(), CoreError> {
        let pending = {
            let _step = self.step();
            if !self.paginated.has_more() || self.paginated.is_loading() {
                debug!("load more ignored: feed inactive, exhausted or busy");
                return Ok(());
            }
            match self.paginated.begin_next() {
                Some(pending) => pending,
                None => return Ok(()),
            }
        };
        info!("loading page {}", pending.page());

        let outcome = pending.request().await;
        let mut progress = self.step();
        let applies = pending.applies();
        if pending.settle(outcome)?.is_some() && applies {
            self.feed_settled(&mut progress);
        }
        Ok(())
    }

    /// First-use transition: load the employee directory and the first page
    /// of the feed concurrently.
    ///
    /// Does nothing (returns `Ok(false)`) once bootstrapped, or when the
    /// directory is already loaded or loading.  A failure re-opens the
    /// guard while the directory is still empty, so the caller may retry.
    pub async fn bootstrap(&self) -> Result<bool, CoreError> {
        {
            let mut progress = self.step();
            if progress.bootstrapped || self.directory.is_loaded() || self.directory.is_loading() {
                debug!("bootstrap skipped");
                return Ok(false);
            }
            progress.bootstrapped = true;
        }
        info!("bootstrapping from {}", self.api.name());

        let (employees, transactions) = tokio::join!(self.directory.fetch_all(), self.select_all());

        if employees.is_err() || transactions.is_err() {
            let mut progress = self.step();
            if !self.directory.is_loaded() {
                progress.bootstrapped = false;
            }
        }
        employees?;
        transactions?;
        Ok(true)
    }

    /// Persist an approval, then patch whichever cache shows the transaction.
    pub async fn set_approval(&self, transaction_id: &str, approved: bool) -> Result<(), CoreError> {
        self.api
            .set_transaction_approval(transaction_id, approved)
            .await
            .map_err(|failure| CoreError::fetch("transaction approval", failure))?;

        let patch = |transactions: &mut Vec<Transaction>| {
            for txn in transactions.iter_mut().filter(|t| t.id == transaction_id) {
                txn.approved = approved;
            }
        };
        let _step = self.step();
        self.paginated.update_cached(|page| patch(&mut page.data));
        self.filtered.update_cached(patch);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
