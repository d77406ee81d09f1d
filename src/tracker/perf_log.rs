//! Process-wide performance counters and cache statistics.
//!
//! The log starts disabled with every value at zero. While disabled,
//! writes are ignored but reads keep returning accumulated values, so
//! it can be toggled at any time without losing data.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::util::{ScenePath, Token};

/// Hit/miss counts for one named cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    /// Hits over total lookups; zero when empty.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct PerfState {
    counters: BTreeMap<Token, f64>,
    caches: BTreeMap<Token, CacheStats>,
}

/// Named counters and cache statistics.
pub struct PerfLog {
    enabled: AtomicBool,
    state: Mutex<PerfState>,
}

static INSTANCE: PerfLog = PerfLog::new();

impl PerfLog {
    const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            state: parking_lot::const_mutex(PerfState {
                counters: BTreeMap::new(),
                caches: BTreeMap::new(),
            }),
        }
    }

    /// The process-wide log.
    pub fn instance() -> &'static PerfLog {
        &INSTANCE
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn update_counter(&self, name: &str, f: impl FnOnce(&mut f64)) {
        if !self.is_enabled() {
            return;
        }
        let mut state = self.state.lock();
        f(state.counters.entry(Token::new(name)).or_insert(0.0));
    }

    pub fn increment_counter(&self, name: &str) {
        self.update_counter(name, |v| *v += 1.0);
    }

    pub fn decrement_counter(&self, name: &str) {
        self.update_counter(name, |v| *v -= 1.0);
    }

    pub fn set_counter(&self, name: &str, value: f64) {
        self.update_counter(name, |v| *v = value);
    }

    pub fn add_counter(&self, name: &str, value: f64) {
        self.update_counter(name, |v| *v += value);
    }

    pub fn subtract_counter(&self, name: &str, value: f64) {
        self.update_counter(name, |v| *v -= value);
    }

    /// Current value; zero for unknown counters.
    pub fn counter(&self, name: &str) -> f64 {
        self.state.lock().counters.get(name).copied().unwrap_or(0.0)
    }

    /// Snapshot of all counters.
    pub fn counters(&self) -> BTreeMap<Token, f64> {
        self.state.lock().counters.clone()
    }

    /// Zero every counter. Works while disabled.
    pub fn reset_counters(&self) {
        let mut state = self.state.lock();
        for value in state.counters.values_mut() {
            *value = 0.0;
        }
    }

    pub fn add_cache_hit(&self, name: &str, id: &ScenePath, tag: &str) {
        if !self.is_enabled() {
            return;
        }
        tracing::trace!(cache = name, %id, tag, "cache hit");
        self.state.lock().caches.entry(Token::new(name)).or_default().hits += 1;
    }

    pub fn add_cache_miss(&self, name: &str, id: &ScenePath, tag: &str) {
        if !self.is_enabled() {
            return;
        }
        tracing::trace!(cache = name, %id, tag, "cache miss");
        self.state.lock().caches.entry(Token::new(name)).or_default().misses += 1;
    }

    pub fn cache_stats(&self, name: &str) -> CacheStats {
        self.state.lock().caches.get(name).copied().unwrap_or_default()
    }

    pub fn cache_hits(&self, name: &str) -> usize {
        self.cache_stats(name).hits
    }

    pub fn cache_misses(&self, name: &str) -> usize {
        self.cache_stats(name).misses
    }

    pub fn cache_hit_ratio(&self, name: &str) -> f64 {
        self.cache_stats(name).hit_ratio()
    }

    /// Names of every cache with recorded lookups, sorted.
    pub fn cache_names(&self) -> Vec<Token> {
        self.state.lock().caches.keys().cloned().collect()
    }

    /// Forget the statistics of one cache.
    pub fn reset_cache(&self, name: &str) {
        self.state.lock().caches.remove(name);
    }
}

/// Increment a counter on the global perf log.
#[macro_export]
macro_rules! perf_counter_incr {
    ($name:expr) => {
        $crate::tracker::PerfLog::instance().increment_counter($name)
    };
}

/// Decrement a counter on the global perf log.
#[macro_export]
macro_rules! perf_counter_decr {
    ($name:expr) => {
        $crate::tracker::PerfLog::instance().decrement_counter($name)
    };
}

/// Set a counter on the global perf log.
#[macro_export]
macro_rules! perf_counter_set {
    ($name:expr, $value:expr) => {
        $crate::tracker::PerfLog::instance().set_counter($name, $value)
    };
}

/// Add to a counter on the global perf log.
#[macro_export]
macro_rules! perf_counter_add {
    ($name:expr, $value:expr) => {
        $crate::tracker::PerfLog::instance().add_counter($name, $value)
    };
}

/// Subtract from a counter on the global perf log.
#[macro_export]
macro_rules! perf_counter_subtract {
    ($name:expr, $value:expr) => {
        $crate::tracker::PerfLog::instance().subtract_counter($name, $value)
    };
}
