//! Conditional forecast cache
//!
//! Entries are keyed by location and replaced wholesale. An expired entry is
//! revalidated with `If-Modified-Since`; a 304 only moves its expiry forward.
//! At most one upstream fetch per key is in flight at a time, and every
//! caller that joined it gets the same result.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use shared::{ForecastDocument, ForecastSnapshot, StructuralError};
use tokio::sync::{watch, RwLock};

use crate::config::CacheConfig;
use crate::error::{AppError, AppResult};
use crate::external::{ForecastFetcher, UpstreamResponse};

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Stored forecast for one key
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub snapshot: Arc<ForecastSnapshot>,
    pub last_modified: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Result of looking a key up without touching upstream
#[derive(Debug)]
enum Lookup {
    Fresh(Arc<ForecastSnapshot>),
    Stale(CacheEntry),
    Miss,
}

type FlightOutcome = Option<AppResult<Arc<ForecastSnapshot>>>;
type FlightSlots = HashMap<String, (u64, watch::Receiver<FlightOutcome>)>;
type FlightMap = Mutex<FlightSlots>;

/// Role of one caller in a per-key refresh
enum Flight<'a> {
    Leader(FlightGuard<'a>, watch::Sender<FlightOutcome>),
    Follower(watch::Receiver<FlightOutcome>),
}

/// Unregisters the leader's flight when it finishes or is dropped mid-fetch
struct FlightGuard<'a> {
    flights: &'a FlightMap,
    key: String,
    id: u64,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut flights = lock_flights(self.flights);
        if flights.get(&self.key).is_some_and(|(id, _)| *id == self.id) {
            flights.remove(&self.key);
        }
    }
}

fn lock_flights(flights: &FlightMap) -> MutexGuard<'_, FlightSlots> {
    match flights.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Location-keyed forecast cache with upstream revalidation
pub struct ForecastCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    flights: FlightMap,
    next_flight: AtomicU64,
    default_ttl: Duration,
    revalidation_ttl: Duration,
    serve_stale_on_error: bool,
    clock: Arc<dyn Clock>,
}

impl ForecastCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            flights: Mutex::new(HashMap::new()),
            next_flight: AtomicU64::new(0),
            default_ttl: Duration::seconds(config.default_ttl_secs),
            revalidation_ttl: Duration::seconds(config.revalidation_ttl_secs),
            serve_stale_on_error: config.serve_stale_on_error,
            clock,
        }
    }

    /// Return the snapshot for `key`, contacting upstream only when needed.
    ///
    /// `build` turns a new upstream document into a snapshot; it runs only
    /// when upstream returned modified data. Concurrent callers for the same
    /// key join one refresh and all receive its outcome, error included.
    pub async fn get_or_refresh<F, B>(
        &self,
        key: &str,
        fetcher: &F,
        build: B,
    ) -> AppResult<Arc<ForecastSnapshot>>
    where
        F: ForecastFetcher + ?Sized,
        B: FnOnce(&ForecastDocument) -> Result<ForecastSnapshot, StructuralError>,
    {
        let mut build = Some(build);

        loop {
            if let Lookup::Fresh(snapshot) = self.lookup(key).await {
                tracing::debug!(key, "Forecast cache hit");
                return Ok(snapshot);
            }

            match self.join_flight(key) {
                Flight::Leader(guard, publisher) => {
                    let Some(build) = build.take() else {
                        return Err(AppError::Internal(
                            "forecast refresh started twice for one request".to_string(),
                        ));
                    };
                    let result = self.refresh(key, fetcher, build).await;
                    drop(guard);
                    // Followers hold receivers; with none left there is nobody to tell
                    let _ = publisher.send(Some(result.clone()));
                    return result;
                }
                Flight::Follower(mut outcome) => {
                    tracing::debug!(key, "Joining in-flight forecast refresh");
                    let shared = outcome
                        .wait_for(Option::is_some)
                        .await
                        .ok()
                        .and_then(|published| (*published).clone());
                    match shared {
                        Some(result) => return result,
                        // Leader was cancelled before publishing; try again
                        None => continue,
                    }
                }
            }
        }
    }

    async fn refresh<F, B>(
        &self,
        key: &str,
        fetcher: &F,
        build: B,
    ) -> AppResult<Arc<ForecastSnapshot>>
    where
        F: ForecastFetcher + ?Sized,
        B: FnOnce(&ForecastDocument) -> Result<ForecastSnapshot, StructuralError>,
    {
        // A flight that finished just before this one started may have stored it
        let stale = match self.lookup(key).await {
            Lookup::Fresh(snapshot) => return Ok(snapshot),
            Lookup::Stale(entry) => Some(entry),
            Lookup::Miss => None,
        };

        let if_modified_since = stale.as_ref().map(|e| e.last_modified);
        match stale {
            Some(_) => tracing::debug!(key, "Forecast cache entry expired, revalidating"),
            None => tracing::debug!(key, "Forecast cache miss"),
        }

        let outcome = match fetcher.fetch(if_modified_since).await {
            Ok(response) => self.apply(key, response, stale.as_ref(), build).await,
            Err(e) => Err(e),
        };

        match (outcome, stale) {
            (Ok(snapshot), _) => Ok(snapshot),
            (Err(e), Some(entry)) if self.serve_stale_on_error && is_fallback_eligible(&e) => {
                tracing::warn!(
                    key,
                    expired_at = %entry.expires_at,
                    "Serving stale forecast after refresh failure: {}",
                    e
                );
                Ok(entry.snapshot)
            }
            (Err(e), _) => {
                tracing::warn!(key, "Forecast refresh failed: {}", e);
                Err(e)
            }
        }
    }

    async fn apply<B>(
        &self,
        key: &str,
        response: UpstreamResponse,
        stale: Option<&CacheEntry>,
        build: B,
    ) -> AppResult<Arc<ForecastSnapshot>>
    where
        B: FnOnce(&ForecastDocument) -> Result<ForecastSnapshot, StructuralError>,
    {
        let now = self.clock.now();

        match response {
            UpstreamResponse::NotModified { freshness } => {
                let Some(previous) = stale else {
                    return Err(AppError::upstream(
                        "Upstream reported not modified but nothing is cached",
                    ));
                };
                let entry = CacheEntry {
                    key: key.to_string(),
                    snapshot: Arc::clone(&previous.snapshot),
                    last_modified: freshness.last_modified.unwrap_or(previous.last_modified),
                    expires_at: freshness.expires.unwrap_or(now + self.revalidation_ttl),
                };
                tracing::debug!(key, expires_at = %entry.expires_at, "Forecast not modified");
                let snapshot = Arc::clone(&entry.snapshot);
                self.store(entry).await;
                Ok(snapshot)
            }
            UpstreamResponse::Modified {
                document,
                freshness,
            } => {
                let snapshot = Arc::new(build(&document)?);
                let entry = CacheEntry {
                    key: key.to_string(),
                    snapshot: Arc::clone(&snapshot),
                    last_modified: freshness.last_modified.unwrap_or(now),
                    expires_at: freshness.expires.unwrap_or(now + self.default_ttl),
                };
                tracing::debug!(key, expires_at = %entry.expires_at, "Forecast stored");
                self.store(entry).await;
                Ok(snapshot)
            }
        }
    }

    async fn lookup(&self, key: &str) -> Lookup {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => Lookup::Fresh(Arc::clone(&entry.snapshot)),
            Some(entry) => Lookup::Stale(entry.clone()),
            None => Lookup::Miss,
        }
    }

    async fn store(&self, entry: CacheEntry) {
        let mut entries = self.entries.write().await;
        entries.insert(entry.key.clone(), entry);
    }

    /// Lead a new refresh for `key`, or follow the one already running
    fn join_flight(&self, key: &str) -> Flight<'_> {
        let mut flights = lock_flights(&self.flights);
        if let Some((_, outcome)) = flights.get(key) {
            return Flight::Follower(outcome.clone());
        }

        let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
        let (publisher, outcome) = watch::channel(None);
        flights.insert(key.to_string(), (id, outcome));
        Flight::Leader(
            FlightGuard {
                flights: &self.flights,
                key: key.to_string(),
                id,
            },
            publisher,
        )
    }

    /// Number of refreshes currently in flight
    pub fn in_flight(&self) -> usize {
        lock_flights(&self.flights).len()
    }

    /// Current entry for `key`, fresh or not
    pub async fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        tracing::debug!("Forecast cache cleared");
    }
}

fn is_fallback_eligible(error: &AppError) -> bool {
    matches!(error, AppError::Upstream { .. } | AppError::Structural(_))
}
