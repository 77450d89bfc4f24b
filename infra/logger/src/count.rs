//! Counts emitted events per level.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Relaxed per-level counters shared between the layer and the `Logger` guard.
#[derive(Debug, Default)]
pub struct LevelCounters {
    error: AtomicU64,
    warn: AtomicU64,
    info: AtomicU64,
    debug: AtomicU64,
    trace: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSnapshot {
    pub error: u64,
    pub warn: u64,
    pub info: u64,
    pub debug: u64,
    pub trace: u64,
}

impl LevelSnapshot {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.error + self.warn + self.info + self.debug + self.trace
    }
}

impl LevelCounters {
    fn record(&self, level: Level) {
        let counter = if level == Level::ERROR {
            &self.error
        } else if level == Level::WARN {
            &self.warn
        } else if level == Level::INFO {
            &self.info
        } else if level == Level::DEBUG {
            &self.debug
        } else {
            &self.trace
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> LevelSnapshot {
        LevelSnapshot {
            error: self.error.load(Ordering::Relaxed),
            warn: self.warn.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            debug: self.debug.load(Ordering::Relaxed),
            trace: self.trace.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.error.store(0, Ordering::Relaxed);
        self.warn.store(0, Ordering::Relaxed);
        self.info.store(0, Ordering::Relaxed);
        self.debug.store(0, Ordering::Relaxed);
        self.trace.store(0, Ordering::Relaxed);
    }
}

/// Layer that feeds [`LevelCounters`] from every event that passes the
/// installed filters.
#[derive(Debug)]
pub struct CountLayer {
    counters: Arc<LevelCounters>,
}

impl CountLayer {
    #[must_use]
    pub const fn new(counters: Arc<LevelCounters>) -> Self {
        Self { counters }
    }
}

impl<S: Subscriber> Layer<S> for CountLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.counters.record(*event.metadata().level());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_per_level() {
        let counters = LevelCounters::default();
        counters.record(Level::ERROR);
        counters.record(Level::WARN);
        counters.record(Level::WARN);
        counters.record(Level::INFO);
        counters.record(Level::DEBUG);
        counters.record(Level::TRACE);

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.error, 1);
        assert_eq!(snapshot.warn, 2);
        assert_eq!(snapshot.info, 1);
        assert_eq!(snapshot.debug, 1);
        assert_eq!(snapshot.trace, 1);
        assert_eq!(snapshot.total(), 6);
    }

    #[test]
    fn reset_zeroes_everything() {
        let counters = LevelCounters::default();
        counters.record(Level::INFO);
        counters.reset();
        assert_eq!(counters.snapshot().total(), 0);
    }
}
