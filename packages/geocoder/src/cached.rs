//! Timeout and bounded cache around any [`ReverseGeocoder`].

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use quake_risk_event_models::GeoPoint;

use crate::{GeocodeError, ReverseGeocoder};

/// Points are cached at 1e-4 degree resolution (about 11 m).
type CacheKey = (i64, i64);

#[allow(clippy::cast_possible_truncation)]
fn cache_key(point: GeoPoint) -> CacheKey {
    (
        (point.latitude() * 10_000.0).round() as i64,
        (point.longitude() * 10_000.0).round() as i64,
    )
}

#[derive(Debug, Default)]
struct LookupCache {
    entries: BTreeMap<CacheKey, Option<String>>,
    order: VecDeque<CacheKey>,
}

/// Wraps a geocoder with a per-lookup timeout and a FIFO cache of
/// successful lookups.
///
/// Both found and not-found answers are cached. Errors and timeouts are
/// not, so a transient failure is retried on the next request.
#[derive(Debug)]
pub struct CachedGeocoder<G> {
    inner: G,
    timeout: Duration,
    capacity: usize,
    cache: Mutex<LookupCache>,
}

impl<G: ReverseGeocoder> CachedGeocoder<G> {
    /// Wraps `inner`. A `capacity` of zero disables caching.
    #[must_use]
    pub fn new(inner: G, timeout: Duration, capacity: usize) -> Self {
        Self {
            inner,
            timeout,
            capacity,
            cache: Mutex::new(LookupCache::default()),
        }
    }

    fn cached(&self, key: CacheKey) -> Option<Option<String>> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.entries.get(&key).cloned()
    }

    fn store(&self, key: CacheKey, value: Option<String>) {
        if self.capacity == 0 {
            return;
        }

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.entries.insert(key, value).is_none() {
            cache.order.push_back(key);
        }

        while cache.order.len() > self.capacity {
            if let Some(oldest) = cache.order.pop_front() {
                cache.entries.remove(&oldest);
            }
        }
    }
}

#[async_trait]
impl<G: ReverseGeocoder> ReverseGeocoder for CachedGeocoder<G> {
    async fn reverse_lookup(&self, point: GeoPoint) -> Result<Option<String>, GeocodeError> {
        let key = cache_key(point);
        if let Some(hit) = self.cached(key) {
            return Ok(hit);
        }

        let name = tokio::time::timeout(self.timeout, self.inner.reverse_lookup(point))
            .await
            .map_err(|_| GeocodeError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            })??;

        self.store(key, name.clone());
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGeocoder {
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl FakeGeocoder {
        fn new(delay: Duration, fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
                fail,
            }
        }
    }

    #[async_trait]
    impl ReverseGeocoder for FakeGeocoder {
        async fn reverse_lookup(&self, point: GeoPoint) -> Result<Option<String>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(GeocodeError::RateLimited);
            }
            Ok(Some(format!("{:.1},{:.1}", point.latitude(), point.longitude())))
        }
    }

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[tokio::test]
    async fn caches_repeated_lookups() {
        let geocoder = CachedGeocoder::new(
            FakeGeocoder::new(Duration::ZERO, false),
            Duration::from_secs(1),
            8,
        );
        let first = geocoder.reverse_lookup(point(-6.2, 106.8)).await.unwrap();
        let second = geocoder.reverse_lookup(point(-6.2, 106.8)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn evicts_oldest_entry() {
        let geocoder = CachedGeocoder::new(
            FakeGeocoder::new(Duration::ZERO, false),
            Duration::from_secs(1),
            1,
        );
        geocoder.reverse_lookup(point(1.0, 1.0)).await.unwrap();
        geocoder.reverse_lookup(point(2.0, 2.0)).await.unwrap();
        geocoder.reverse_lookup(point(1.0, 1.0)).await.unwrap();
        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn slow_lookup_times_out() {
        let geocoder = CachedGeocoder::new(
            FakeGeocoder::new(Duration::from_millis(500), false),
            Duration::from_millis(10),
            8,
        );
        let result = geocoder.reverse_lookup(point(0.0, 0.0)).await;
        assert!(matches!(result, Err(GeocodeError::Timeout { timeout_ms: 10 })));
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let geocoder = CachedGeocoder::new(
            FakeGeocoder::new(Duration::ZERO, true),
            Duration::from_secs(1),
            8,
        );
        assert!(geocoder.reverse_lookup(point(0.0, 0.0)).await.is_err());
        assert!(geocoder.reverse_lookup(point(0.0, 0.0)).await.is_err());
        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 2);
    }
}
