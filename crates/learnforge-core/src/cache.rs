//! A single-value cache with explicit staleness.
//!
//! The API client keeps one of these per remote list. A value is served
//! while younger than the TTL; mutations call [`RevalidatingCache::invalidate`]
//! so the next read goes back to the server.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RevalidatingCache<T> {
    ttl: Duration,
    entry: Option<(Instant, T)>,
}

impl<T: Clone> RevalidatingCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value, if still fresh.
    pub fn get(&self) -> Option<T> {
        self.get_at(Instant::now())
    }

    fn get_at(&self, now: Instant) -> Option<T> {
        match &self.entry {
            Some((stored, value)) if now.saturating_duration_since(*stored) < self.ttl => {
                Some(value.clone())
            }
            _ => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.get().is_some()
    }

    pub fn store(&mut self, value: T) {
        self.entry = Some((Instant::now(), value));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_misses() {
        let cache: RevalidatingCache<u32> = RevalidatingCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(), None);
        assert!(!cache.is_fresh());
    }

    #[test]
    fn stored_value_is_served_until_stale() {
        let mut cache = RevalidatingCache::new(Duration::from_secs(60));
        cache.store(vec![1, 2, 3]);
        assert_eq!(cache.get(), Some(vec![1, 2, 3]));

        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(cache.get_at(later), None);
    }

    #[test]
    fn invalidate_forces_refetch() {
        let mut cache = RevalidatingCache::new(Duration::from_secs(60));
        cache.store("x".to_string());
        cache.invalidate();
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn zero_ttl_never_serves() {
        let mut cache = RevalidatingCache::new(Duration::ZERO);
        cache.store(1);
        assert_eq!(cache.get(), None);
    }
}
