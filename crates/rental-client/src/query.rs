//! Cached query state shared by the data hooks.
//!
//! A [`Query`] keeps the last fetched value together with loading and error
//! flags. Each fetch takes a [`FetchTicket`] stamped with the current
//! generation; invalidation, a newer fetch or a local data replacement bumps
//! the generation so a late result is dropped instead of overwriting newer
//! state. Readers never wait for a fetch: [`Query::snapshot`] only takes the
//! lock long enough to clone the state.

use std::fmt::Display;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

/// Observable state of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState<T> {
    /// Last successfully fetched (or locally replaced) value.
    pub data: Option<T>,
    /// A fetch is in flight.
    pub is_loading: bool,
    /// The most recent fetch failed.
    pub is_error: bool,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_error: false,
        }
    }
}

/// Proof that a fetch was started at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket {
    generation: u64,
}

#[derive(Debug)]
struct Inner<T> {
    state: QueryState<T>,
    generation: u64,
}

/// A cached query value guarded for concurrent use.
#[derive(Debug)]
pub struct Query<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: QueryState::default(),
                generation: 0,
            }),
        }
    }
}

impl<T: Clone> Query<T> {
    /// An empty, idle query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner<T>) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Clone the current state.
    #[must_use]
    pub fn snapshot(&self) -> QueryState<T> {
        self.with_inner(|inner| inner.state.clone())
    }

    /// Start a fetch, superseding any fetch already in flight.
    pub fn begin(&self) -> FetchTicket {
        self.with_inner(|inner| {
            inner.generation += 1;
            inner.state.is_loading = true;
            FetchTicket {
                generation: inner.generation,
            }
        })
    }

    /// Apply a fetch result if its ticket is still current.
    ///
    /// Success replaces the data and clears the error flag; failure sets the
    /// error flag and keeps the last data. Returns whether the result was
    /// applied.
    pub fn settle<E: Display>(&self, ticket: FetchTicket, result: Result<T, E>) -> bool {
        self.with_inner(|inner| {
            if inner.generation != ticket.generation {
                return false;
            }
            inner.state.is_loading = false;
            match result {
                Ok(data) => {
                    inner.state.data = Some(data);
                    inner.state.is_error = false;
                }
                Err(err) => {
                    warn!(error = %err, "query fetch failed");
                    inner.state.is_error = true;
                }
            }
            true
        })
    }

    /// Run `fetcher` under a fresh ticket and apply its result.
    pub async fn fetch<F, Fut, E>(&self, fetcher: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let ticket = self.begin();
        let result = fetcher().await;
        self.settle(ticket, result)
    }

    /// Mark the cached value stale; in-flight results are ignored.
    pub fn invalidate(&self) {
        self.with_inner(|inner| {
            inner.generation += 1;
            inner.state.is_loading = false;
        });
    }

    /// Replace the data locally and return the previous value.
    ///
    /// Used for optimistic updates and their rollback. In-flight fetches are
    /// superseded.
    pub fn replace_data(&self, data: Option<T>) -> Option<T> {
        self.with_inner(|inner| {
            inner.generation += 1;
            inner.state.is_loading = false;
            std::mem::replace(&mut inner.state.data, data)
        })
    }

    /// Derive new data from the current value under one lock.
    ///
    /// Concurrent local edits compose instead of overwriting each other.
    /// In-flight fetches are superseded.
    pub fn update_data(&self, f: impl FnOnce(Option<&T>) -> T) {
        self.with_inner(|inner| {
            inner.generation += 1;
            inner.state.is_loading = false;
            inner.state.data = Some(f(inner.state.data.as_ref()));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_lifecycle_updates_flags() {
        let query = Query::<u32>::new();
        let ticket = query.begin();
        assert!(query.snapshot().is_loading);

        assert!(query.settle::<String>(ticket, Ok(7)));
        assert_eq!(
            query.snapshot(),
            QueryState {
                data: Some(7),
                is_loading: false,
                is_error: false
            }
        );
    }

    #[test]
    fn failure_keeps_last_data() {
        let query = Query::<u32>::new();
        let first = query.begin();
        query.settle::<String>(first, Ok(1));

        let second = query.begin();
        query.settle(second, Err("offline"));
        let state = query.snapshot();
        assert_eq!(state.data, Some(1));
        assert!(state.is_error);
        assert!(!state.is_loading);
    }

    #[test]
    fn late_result_is_ignored() {
        let query = Query::<u32>::new();
        let stale = query.begin();
        let fresh = query.begin();

        assert!(query.settle::<String>(fresh, Ok(2)));
        assert!(!query.settle::<String>(stale, Ok(1)));
        assert_eq!(query.snapshot().data, Some(2));
    }

    #[test]
    fn invalidation_drops_in_flight_result() {
        let query = Query::<u32>::new();
        let ticket = query.begin();
        query.invalidate();

        assert!(!query.settle::<String>(ticket, Ok(5)));
        let state = query.snapshot();
        assert_eq!(state.data, None);
        assert!(!state.is_loading);
    }

    #[test]
    fn replace_data_returns_previous_value() {
        let query = Query::<u32>::new();
        assert_eq!(query.replace_data(Some(3)), None);
        assert_eq!(query.replace_data(None), Some(3));
    }

    #[tokio::test]
    async fn fetch_applies_async_result() {
        let query = Query::<Vec<u8>>::new();
        let applied = query.fetch(|| async { Ok::<_, String>(vec![1, 2]) }).await;
        assert!(applied);
        assert_eq!(query.snapshot().data, Some(vec![1, 2]));
    }

    #[test]
    fn update_data_composes_with_existing_value() {
        let query = Query::<u32>::new();
        query.update_data(|current| current.copied().unwrap_or_default() + 1);
        query.update_data(|current| current.copied().unwrap_or_default() * 10);
        assert_eq!(query.snapshot().data, Some(10));

        let stale = query.begin();
        query.update_data(|_| 7);
        assert!(!query.settle::<&str>(stale, Ok(99)));
        assert_eq!(query.snapshot().data, Some(7));
    }
}
