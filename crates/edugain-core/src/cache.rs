//! Per-experiment cache of computed payloads.
//!
//! An entry is valid while the experiment's participation count is the one
//! it was computed at. Edits that keep the count unchanged are not detected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone)]
struct CacheEntry {
    participations: usize,
    payload: Arc<[u8]>,
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// Last computed payload of each experiment.
///
/// Requests for the same experiment are serialized: the check, the
/// recomputation and the write happen under that experiment's lock, so a
/// payload is computed at most once per participation count. Different
/// experiments never wait on each other.
#[derive(Debug, Default)]
pub struct ResultCache {
    slots: Mutex<HashMap<String, Slot>>,
    hits: AtomicU32,
    misses: AtomicU32,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, experiment_id: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(experiment_id.to_string()).or_default())
    }

    /// Serve the cached payload when it was computed at `participations`,
    /// otherwise run `compute` and store its output.
    ///
    /// A failed computation leaves the previous entry in place.
    pub fn get_or_compute<F, E>(
        &self,
        experiment_id: &str,
        participations: usize,
        compute: F,
    ) -> Result<Arc<[u8]>, E>
    where
        F: FnOnce() -> Result<Vec<u8>, E>,
    {
        let slot = self.slot(experiment_id);
        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = entry.as_ref() {
            if cached.participations == participations {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(experiment = experiment_id, participations, "cache hit");
                return Ok(Arc::clone(&cached.payload));
            }
            tracing::info!(
                experiment = experiment_id,
                cached = cached.participations,
                current = participations,
                "participation count changed, recomputing"
            );
        } else {
            tracing::debug!(experiment = experiment_id, participations, "cache miss");
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let payload: Arc<[u8]> = compute()?.into();
        *entry = Some(CacheEntry {
            participations,
            payload: Arc::clone(&payload),
        });
        Ok(payload)
    }

    /// Participation count the cached payload was computed at.
    pub fn cached_count(&self, experiment_id: &str) -> Option<usize> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.get(experiment_id)?;
        let entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        entry.as_ref().map(|e| e.participations)
    }

    /// Drop the entry of one experiment.
    pub fn invalidate(&self, experiment_id: &str) {
        let slot = self.slot(experiment_id);
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u32 {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    fn ok(bytes: &str) -> Result<Vec<u8>, String> {
        Ok(bytes.as_bytes().to_vec())
    }

    #[test]
    fn serves_cached_payload_for_same_count() {
        let cache = ResultCache::new();
        let first = cache.get_or_compute("1", 8, || ok("a")).unwrap();
        let second = cache
            .get_or_compute("1", 8, || -> Result<Vec<u8>, String> {
                panic!("must not recompute")
            })
            .unwrap();

        assert_eq!(&*first, b"a");
        assert_eq!(&*second, b"a");
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn count_change_recomputes() {
        let cache = ResultCache::new();
        cache.get_or_compute("1", 8, || ok("old")).unwrap();
        let fresh = cache.get_or_compute("1", 9, || ok("new")).unwrap();

        assert_eq!(&*fresh, b"new");
        assert_eq!(cache.cached_count("1"), Some(9));

        // Fewer participations also invalidate.
        let fewer = cache.get_or_compute("1", 7, || ok("fewer")).unwrap();
        assert_eq!(&*fewer, b"fewer");
    }

    #[test]
    fn experiments_are_independent() {
        let cache = ResultCache::new();
        cache.get_or_compute("1", 4, || ok("one")).unwrap();
        cache.get_or_compute("2", 4, || ok("two")).unwrap();

        assert_eq!(&*cache.get_or_compute("1", 4, || ok("x")).unwrap(), b"one");
        assert_eq!(&*cache.get_or_compute("2", 4, || ok("x")).unwrap(), b"two");
    }

    #[test]
    fn failed_computation_keeps_previous_entry() {
        let cache = ResultCache::new();
        cache.get_or_compute("1", 2, || ok("kept")).unwrap();

        let err = cache
            .get_or_compute("1", 3, || Err::<Vec<u8>, _>("store down".to_string()))
            .unwrap_err();
        assert_eq!(err, "store down");
        assert_eq!(cache.cached_count("1"), Some(2));
        assert_eq!(&*cache.get_or_compute("1", 2, || ok("x")).unwrap(), b"kept");
    }

    #[test]
    fn invalidate_forces_recompute() {
        let cache = ResultCache::new();
        cache.get_or_compute("1", 2, || ok("a")).unwrap();
        cache.invalidate("1");
        assert_eq!(cache.cached_count("1"), None);
        assert_eq!(&*cache.get_or_compute("1", 2, || ok("b")).unwrap(), b"b");
    }

    #[test]
    fn concurrent_requests_compute_once() {
        let cache = Arc::new(ResultCache::new());
        let computations = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let computations = Arc::clone(&computations);
                thread::spawn(move || {
                    cache
                        .get_or_compute("1", 5, || {
                            computations.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            ok("payload")
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(&*handle.join().unwrap(), b"payload");
        }
        assert_eq!(computations.load(Ordering::SeqCst), 1);
        assert_eq!(cache.hits(), 7);
    }
}
