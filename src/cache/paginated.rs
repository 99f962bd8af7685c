//! The "all transactions" feed.
//!
//! Caches one [`Page`] whose `data` is every item fetched since the last
//! restart and whose `next_page` is the token from the most recent response.
//! A first-page fetch replaces the accumulation; a next-page fetch appends to
//! it, or starts from empty if the cache was invalidated while the request
//! was out.

use std::sync::Arc;

use log::debug;

use super::{DataSource, InFlight, StalePolicy};
use crate::error::{CoreError, FetchFailure};
use crate::source::{Page, PageToken, Transaction, TransactionApi};

pub struct PaginatedFeedSource {
    source: DataSource<Page<Transaction>>,
    api: Arc<dyn TransactionApi>,
}

/// A page request that has been started but not yet settled.
pub struct PendingPage<'a> {
    in_flight: InFlight<'a, Page<Transaction>>,
    api: &'a dyn TransactionApi,
    page: PageToken,
    restart: bool,
}

impl PendingPage<'_> {
    pub fn page(&self) -> PageToken {
        self.page
    }

    pub fn applies(&self) -> bool {
        self.in_flight.applies()
    }

    pub async fn request(&self) -> Result<Page<Transaction>, FetchFailure> {
        self.api.paginated_transactions(self.page).await
    }

    pub fn settle(
        self,
        outcome: Result<Page<Transaction>, FetchFailure>,
    ) -> Result<Option<Page<Transaction>>, CoreError> {
        let restart = self.restart;
        self.in_flight.settle(outcome, |previous, page| match previous {
            Some(mut accumulated) if !restart => {
                accumulated.data.extend(page.data);
                accumulated.next_page = page.next_page;
                accumulated
            }
            _ => page,
        })
    }
}

impl PaginatedFeedSource {
    pub fn new(api: Arc<dyn TransactionApi>, policy: StalePolicy) -> Self {
        Self {
            source: DataSource::new("paginated transactions", policy),
            api,
        }
    }

    pub fn cached(&self) -> Option<Page<Transaction>> {
        self.source.cached()
    }

    pub fn with_cached<R>(&self, f: impl FnOnce(Option<&Page<Transaction>>) -> R) -> R {
        self.source.with_cached(f)
    }

    pub fn is_loading(&self) -> bool {
        self.source.is_loading()
    }

    /// `true` iff a page has been fetched and it reported a next page.
    pub fn has_more(&self) -> bool {
        self.source
            .with_cached(|page| page.is_some_and(|p| !p.is_exhausted()))
    }

    pub fn invalidate(&self) {
        self.source.invalidate();
    }

    pub(crate) fn update_cached(&self, f: impl FnOnce(&mut Page<Transaction>)) -> bool {
        self.source.update_cached(f)
    }

    /// Start a request for page 1 that will replace the accumulation.
    pub fn begin_first(&self) -> PendingPage<'_> {
        PendingPage {
            in_flight: self.source.begin(),
            api: self.api.as_ref(),
            page: PageToken::FIRST,
            restart: true,
        }
    }

    /// Start a request for the stored next page.
    ///
    /// `None` when the feed is exhausted: nothing is requested.  An empty
    /// cache restarts from page 1.
    pub fn begin_next(&self) -> Option<PendingPage<'_>> {
        let next = self.source.with_cached(|cached| cached.map(|page| page.next_page));
        match next {
            None => Some(self.begin_first()),
            Some(None) => {
                debug!("{}: exhausted, not fetching", self.source.name());
                None
            }
            Some(Some(page)) => Some(PendingPage {
                in_flight: self.source.begin(),
                api: self.api.as_ref(),
                page,
                restart: false,
            }),
        }
    }

    pub async fn fetch_first(&self) -> Result<Option<Page<Transaction>>, CoreError> {
        let pending = self.begin_first();
        let outcome = pending.request().await;
        pending.settle(outcome)
    }

    /// Fetch and append the next page.  Returns the current cache untouched
    /// when exhausted.
    pub async fn fetch_next(&self) -> Result<Option<Page<Transaction>>, CoreError> {
        match self.begin_next() {
            Some(pending) => {
                let outcome = pending.request().await;
                pending.settle(outcome)
            }
            None => Ok(self.cached()),
        }
    }

    /// Advance the feed by one page: page 1 after an invalidation, the next
    /// page otherwise, nothing once exhausted.
    pub async fn fetch_all(&self) -> Result<Option<Page<Transaction>>, CoreError> {
        self.fetch_next().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
