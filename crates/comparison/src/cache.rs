use api_client::error::ApiError;
use chrono::{DateTime, NaiveDateTime, Utc};
use core_types::ReportForm;
use futures::future::{BoxFuture, FutureExt, Shared, TryFutureExt};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Identifies one requestable unit of backend data.
///
/// This is the unit of caching, of in-flight deduplication and of failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// A Form 101 indicator for one bank over a period.
    Indicator {
        reg_number: String,
        ind_code: String,
        date_from: NaiveDateTime,
        date_to: NaiveDateTime,
    },
    /// A whole fixed-schema form for one bank as of a reporting date.
    Form {
        form: ReportForm,
        reg_number: String,
        dt: DateTime<Utc>,
    },
}

/// The failure shared by every caller that joined the same request.
pub type FetchError = Arc<ApiError>;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, FetchError>>>;

enum Entry<V> {
    InFlight {
        request_id: u64,
        fetch: SharedFetch<V>,
        started_at: Instant,
    },
    Ready { value: V, fetched_at: Instant },
}

impl<V> Entry<V> {
    fn age(&self) -> Duration {
        match self {
            Entry::InFlight { started_at, .. } => started_at.elapsed(),
            Entry::Ready { fetched_at, .. } => fetched_at.elapsed(),
        }
    }
}

/// A request cache with in-flight deduplication and a freshness window.
///
/// - A `Ready` entry younger than `stale_after` is returned without a request.
/// - A key already in flight is joined, never requested twice concurrently.
/// - Failures are not kept, so the next call for that key retries.
/// - A response only settles the entry that started it; an entry invalidated
///   or replaced in the meantime is left alone.
/// - Entries older than `stale_after` are evicted whenever a new request is
///   issued, or on `purge_expired`. This includes requests nobody awaits any more.
pub struct QueryCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    stale_after: Duration,
    next_request_id: AtomicU64,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(stale_after: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            stale_after,
            next_request_id: AtomicU64::new(0),
        }
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    // The lock is never held across an await, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached value for `key`, joins its in-flight request, or starts `fetch`.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ApiError>> + Send + 'static,
    {
        let (request_id, shared) = {
            let mut entries = self.lock();
            let existing = match entries.get(&key) {
                Some(Entry::Ready { value, fetched_at }) if fetched_at.elapsed() < self.stale_after => {
                    tracing::trace!(?key, "Cache hit.");
                    return Ok(value.clone());
                }
                Some(Entry::InFlight { request_id, fetch, .. }) => Some((*request_id, fetch.clone())),
                _ => None,
            };

            match existing {
                Some(joined) => {
                    tracing::trace!(?key, "Joining in-flight request.");
                    joined
                }
                None => {
                    Self::evict_expired(&mut entries, self.stale_after);
                    let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
                    let shared = fetch().map_err(Arc::new).boxed().shared();
                    tracing::debug!(?key, request_id, "Issuing request.");
                    entries.insert(
                        key.clone(),
                        Entry::InFlight {
                            request_id,
                            fetch: shared.clone(),
                            started_at: Instant::now(),
                        },
                    );
                    (request_id, shared)
                }
            }
        };

        let result = shared.await;

        let mut entries = self.lock();
        let owns_entry = matches!(
            entries.get(&key),
            Some(Entry::InFlight { request_id: current, .. }) if *current == request_id
        );
        if owns_entry {
            match &result {
                Ok(value) => {
                    entries.insert(
                        key,
                        Entry::Ready {
                            value: value.clone(),
                            fetched_at: Instant::now(),
                        },
                    );
                }
                Err(e) => {
                    tracing::debug!(?key, error = %e, "Request failed; not caching.");
                    entries.remove(&key);
                }
            }
        }

        result
    }

    fn evict_expired(entries: &mut HashMap<K, Entry<V>>, stale_after: Duration) {
        let before = entries.len();
        entries.retain(|_, entry| entry.age() < stale_after);
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted expired cache entries.");
        }
    }

    /// Drops every entry older than the freshness window.
    pub fn purge_expired(&self) {
        Self::evict_expired(&mut self.lock(), self.stale_after);
    }

    /// Forgets `key`. A request still in flight for it will not repopulate the entry.
    pub fn invalidate(&self, key: &K) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
