//! Lightweight scope accounting for layer and functional entry points.
//!
//! Scopes compile to no-ops unless the `profiler` feature is enabled; with it
//! enabled, each guard records one call and its wall-clock duration into a
//! process-global registry drained by [`take_report`].

#[cfg(feature = "profiler")]
use std::collections::HashMap;
#[cfg(feature = "profiler")]
use std::sync::{Mutex, OnceLock};
#[cfg(feature = "profiler")]
use std::time::{Duration, Instant};

#[cfg_attr(not(feature = "profiler"), allow(dead_code))]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum ScopeKey {
    Layer {
        name: &'static str,
    },
    Functional {
        op: &'static str,
        implementation: &'static str,
    },
}

pub struct ScopeGuard {
    #[cfg(feature = "profiler")]
    key: Option<(ScopeKey, Instant)>,
}

impl ScopeGuard {
    #[inline(always)]
    fn new(key: ScopeKey) -> Self {
        #[cfg(feature = "profiler")]
        {
            ScopeGuard {
                key: Some((key, Instant::now())),
            }
        }
        #[cfg(not(feature = "profiler"))]
        {
            let _ = key;
            ScopeGuard {}
        }
    }
}

#[cfg(feature = "profiler")]
impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Some((key, start)) = self.key.take() {
            Profiler::instance().record(key, start.elapsed());
        }
    }
}

#[inline(always)]
pub fn layer_scope(name: &'static str) -> ScopeGuard {
    ScopeGuard::new(ScopeKey::Layer { name })
}

#[inline(always)]
pub fn functional_scope(op: &'static str, implementation: &'static str) -> ScopeGuard {
    ScopeGuard::new(ScopeKey::Functional { op, implementation })
}

#[cfg(feature = "profiler")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeStats {
    pub calls: u64,
    pub total: Duration,
}

#[cfg(feature = "profiler")]
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub name: String,
    pub stats: ScopeStats,
}

#[cfg(feature = "profiler")]
struct Profiler {
    scopes: Mutex<HashMap<ScopeKey, ScopeStats>>,
}

#[cfg(feature = "profiler")]
impl Profiler {
    fn instance() -> &'static Profiler {
        static INSTANCE: OnceLock<Profiler> = OnceLock::new();
        INSTANCE.get_or_init(|| Profiler {
            scopes: Mutex::new(HashMap::new()),
        })
    }

    fn record(&self, key: ScopeKey, elapsed: Duration) {
        let mut scopes = self.scopes.lock().expect("profiler registry poisoned");
        let entry = scopes.entry(key).or_default();
        entry.calls += 1;
        entry.total += elapsed;
    }
}

#[cfg(feature = "profiler")]
impl ScopeKey {
    fn label(&self) -> String {
        match *self {
            ScopeKey::Layer { name } => name.to_string(),
            ScopeKey::Functional { op, implementation } => format!("{op} [{implementation}]"),
        }
    }
}

/// Drains the accumulated per-scope statistics, most expensive first.
#[cfg(feature = "profiler")]
pub fn take_report() -> Vec<ReportRow> {
    let mut scopes = Profiler::instance()
        .scopes
        .lock()
        .expect("profiler registry poisoned");
    let mut rows: Vec<ReportRow> = scopes
        .drain()
        .map(|(key, stats)| ReportRow {
            name: key.label(),
            stats,
        })
        .collect();
    rows.sort_by(|a, b| b.stats.total.cmp(&a.stats.total));
    rows
}
