use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::currency::{CurrencyError, CurrencySettings, FallbackRates, RateProvider};
use crate::models::Currency;

pub const DEFAULT_CACHE_TTL_HOURS: u32 = 24;

/// A live exchange-rate feed. Every call may fail.
pub trait RateSource: Send + Sync {
    fn fetch(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<Decimal, CurrencyError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedRate {
    pub rate: Decimal,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRate {
    pub fn is_fresh(
        &self,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Rates keyed by currency pair, with the time each was fetched.
///
/// Entries are never evicted; expired ones stay available as last-known-good
/// values when the source fails.
#[derive(Debug)]
pub struct RateCache {
    ttl: Duration,
    entries: Mutex<HashMap<(Currency, Currency), CachedRate>>,
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(Duration::hours(i64::from(DEFAULT_CACHE_TTL_HOURS)))
    }
}

impl RateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The entry for a pair, fresh or not.
    pub fn get(
        &self,
        from: Currency,
        to: Currency,
    ) -> Option<CachedRate> {
        self.lock().get(&(from, to)).copied()
    }

    /// The rate for a pair if it was fetched less than `ttl` before `now`.
    pub fn get_fresh(
        &self,
        from: Currency,
        to: Currency,
        now: DateTime<Utc>,
    ) -> Option<Decimal> {
        self.get(from, to)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.rate)
    }

    pub fn insert(
        &self,
        from: Currency,
        to: Currency,
        rate: Decimal,
        fetched_at: DateTime<Utc>,
    ) {
        self.lock().insert((from, to), CachedRate { rate, fetched_at });
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave a half-written entry.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(Currency, Currency), CachedRate>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// [`RateProvider`] over a live [`RateSource`] with caching and fallbacks.
///
/// Lookup order: fresh cache entry, live fetch, stale cache entry, fallback
/// table. The last two emit a warning; the calculation carries on.
pub struct CachedRateProvider<S> {
    source: S,
    cache: RateCache,
    fallback: FallbackRates,
    clock: Clock,
}

impl<S: RateSource> CachedRateProvider<S> {
    pub fn new(
        source: S,
        cache: RateCache,
        fallback: FallbackRates,
    ) -> Self {
        Self {
            source,
            cache,
            fallback,
            clock: Box::new(Utc::now),
        }
    }

    pub fn from_settings(
        source: S,
        settings: &CurrencySettings,
    ) -> Result<Self, CurrencyError> {
        Ok(Self::new(
            source,
            RateCache::new(settings.cache_ttl()),
            settings.fallback()?,
        ))
    }

    /// Replaces the wall clock used to judge cache freshness.
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }
}

impl<S: RateSource> RateProvider for CachedRateProvider<S> {
    fn quote(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<Decimal, CurrencyError> {
        let now = (self.clock)();

        if let Some(rate) = self.cache.get_fresh(from, to, now) {
            debug!(%from, %to, %rate, "using cached exchange rate");
            return Ok(rate);
        }

        let fetched = self.source.fetch(from, to).and_then(|rate| {
            if rate > Decimal::ZERO {
                Ok(rate)
            } else {
                Err(CurrencyError::InvalidRate { from, to, rate })
            }
        });

        match fetched {
            Ok(rate) => {
                debug!(%from, %to, %rate, "fetched exchange rate");
                self.cache.insert(from, to, rate, now);
                Ok(rate)
            }
            Err(err) => {
                if let Some(stale) = self.cache.get(from, to) {
                    warn!(
                        %from,
                        %to,
                        error = %err,
                        fetched_at = %stale.fetched_at,
                        "exchange rate fetch failed, using stale cached rate"
                    );
                    return Ok(stale.rate);
                }
                if let Some(rate) = self.fallback.lookup(from, to) {
                    warn!(%from, %to, error = %err, %rate, "exchange rate fetch failed, using fallback rate");
                    return Ok(rate);
                }
                Err(CurrencyError::RateUnavailable { from, to })
            }
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for CachedRateProvider<S> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("CachedRateProvider")
            .field("source", &self.source)
            .field("cache", &self.cache)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}
