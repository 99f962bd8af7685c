//! Cached, invalidatable wrappers around provider requests.
//!
//! [`DataSource`] is the generic piece: a cached value, a loading flag and an
//! invalidation generation.  The specialisations decide what a request is
//! and how its result merges into the cache:
//!
//! * [`PaginatedFeedSource`] appends pages to an accumulated [`Page`].
//! * [`FilteredSource`] replaces its cache with one employee's transactions.
//! * [`EmployeeDirectory`] replaces its cache with the employee list.
//!
//! A fetch is split in two halves so the coordinator can order them against
//! other mutations: [`DataSource::begin`] marks the source loading and
//! returns an [`InFlight`] guard, and [`InFlight::settle`] applies the
//! outcome.  Dropping the guard without settling still clears the loading
//! flag.
//!
//! [`Page`]: crate::source::Page

mod directory;
mod filtered;
mod paginated;

pub use directory::EmployeeDirectory;
pub use filtered::{FilteredSource, PendingEmployee};
pub use paginated::{PaginatedFeedSource, PendingPage};

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use crate::error::{CoreError, FetchFailure};

/// What to do with a result whose fetch was superseded while in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalePolicy {
    /// Drop it; the cache keeps whatever the newer operation left there.
    DiscardSuperseded,
    /// Apply it anyway.  Whichever fetch settles last owns the cache.
    LastSettledWins,
}

impl StalePolicy {
    pub fn from_discard_flag(discard_superseded: bool) -> Self {
        if discard_superseded {
            StalePolicy::DiscardSuperseded
        } else {
            StalePolicy::LastSettledWins
        }
    }
}

#[derive(Debug)]
struct SourceState<T> {
    cached: Option<T>,
    in_flight: usize,
    /// Advanced by every invalidation and every fetch start.
    generation: u64,
}

/// A cached resource with a loading flag and invalidation.
pub struct DataSource<T> {
    name: &'static str,
    policy: StalePolicy,
    state: Mutex<SourceState<T>>,
}

impl<T: Clone> DataSource<T> {
    pub fn new(name: &'static str, policy: StalePolicy) -> Self {
        Self {
            name,
            policy,
            state: Mutex::new(SourceState {
                cached: None,
                in_flight: 0,
                generation: 0,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn state(&self) -> MutexGuard<'_, SourceState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the cached value.  `None` when never fetched or invalidated.
    pub fn cached(&self) -> Option<T> {
        self.state().cached.clone()
    }

    /// Borrow the cached value without cloning it.
    pub fn with_cached<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.state().cached.as_ref())
    }

    pub fn is_loading(&self) -> bool {
        self.state().in_flight > 0
    }

    /// Forget the cached value.  In-flight fetches keep running.
    pub fn invalidate(&self) {
        let mut state = self.state();
        state.cached = None;
        state.generation += 1;
        debug!("{}: invalidated (generation {})", self.name, state.generation);
    }

    /// Patch a populated cache in place.  Returns whether anything was cached.
    pub fn update_cached(&self, f: impl FnOnce(&mut T)) -> bool {
        match self.state().cached.as_mut() {
            Some(value) => {
                f(value);
                true
            }
            None => false,
        }
    }

    /// Start a fetch: mark the source loading and capture its generation.
    pub fn begin(&self) -> InFlight<'_, T> {
        let mut state = self.state();
        state.in_flight += 1;
        state.generation += 1;
        debug!("{}: fetch started (generation {})", self.name, state.generation);
        InFlight {
            source: self,
            generation: state.generation,
            settled: false,
        }
    }

    /// Run one request through the cache.
    ///
    /// `merge` receives the current cached value (if any) and the response
    /// and produces the new cached value.  On failure the cache is left
    /// untouched.  Returns the cached value after settling.
    pub async fn fetch<R, Fut, M>(&self, request: Fut, merge: M) -> Result<Option<T>, CoreError>
    where
        Fut: Future<Output = Result<R, FetchFailure>>,
        M: FnOnce(Option<T>, R) -> T,
    {
        let in_flight = self.begin();
        let outcome = request.await;
        in_flight.settle(outcome, merge)
    }
}

/// A started fetch.  Clears its share of the loading flag when dropped.
pub struct InFlight<'a, T: Clone> {
    source: &'a DataSource<T>,
    generation: u64,
    settled: bool,
}

impl<T: Clone> InFlight<'_, T> {
    /// Whether settling now would write a successful result into the cache.
    pub fn applies(&self) -> bool {
        self.source.policy == StalePolicy::LastSettledWins
            || self.source.state().generation == self.generation
    }

    /// Apply a request outcome and finish the fetch.
    ///
    /// The cache write and the loading-flag reset happen under one lock, so
    /// no reader sees a settled value while the source still reports loading.
    pub fn settle<R, M>(
        mut self,
        outcome: Result<R, FetchFailure>,
        merge: M,
    ) -> Result<Option<T>, CoreError>
    where
        M: FnOnce(Option<T>, R) -> T,
    {
        let source = self.source;
        let mut state = source.state();
        state.in_flight -= 1;
        self.settled = true;

        let response = match outcome {
            Ok(response) => response,
            Err(failure) => {
                warn!("{}: fetch failed: {failure}", source.name);
                return Err(CoreError::fetch(source.name, failure));
            }
        };

        let stale = state.generation != self.generation;
        if stale && source.policy == StalePolicy::DiscardSuperseded {
            debug!(
                "{}: discarding result of superseded fetch (generation {} < {})",
                source.name, self.generation, state.generation
            );
            return Ok(state.cached.clone());
        }
        if stale {
            debug!("{}: applying result of superseded fetch", source.name);
        }

        let previous = state.cached.take();
        state.cached = Some(merge(previous, response));
        debug!("{}: fetch settled", source.name);
        Ok(state.cached.clone())
    }
}

impl<T: Clone> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if !self.settled {
            self.source.state().in_flight -= 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
