//! Rate-limits low-severity events by admitting one in `n`.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{Level, Metadata, Subscriber, subscriber::Interest};
use tracing_subscriber::layer::{Context, Layer};

/// Global filter that lets `WARN` and `ERROR` through untouched and keeps
/// every `n`-th event below that.
///
/// `n <= 1` disables sampling. The shared counter is relaxed, so the admitted
/// events are evenly spread but not strictly ordered across threads.
#[derive(Debug)]
pub struct SampleFilter {
    every: u64,
    counter: AtomicU64,
}

impl SampleFilter {
    #[must_use]
    pub const fn new(every: u64) -> Self {
        Self { every, counter: AtomicU64::new(0) }
    }

    fn passes_unconditionally(&self, meta: &Metadata<'_>) -> bool {
        !meta.is_event() || *meta.level() <= Level::WARN || self.every <= 1
    }

    fn admit(&self) -> bool {
        self.counter.fetch_add(1, Ordering::Relaxed) % self.every == 0
    }
}

impl<S: Subscriber> Layer<S> for SampleFilter {
    fn register_callsite(&self, meta: &'static Metadata<'static>) -> Interest {
        if self.passes_unconditionally(meta) {
            Interest::always()
        } else {
            // Sampled callsites must re-run `enabled` for every event instead
            // of caching the first answer.
            Interest::sometimes()
        }
    }

    fn enabled(&self, meta: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        self.passes_unconditionally(meta) || self.admit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_one_in_n() {
        let filter = SampleFilter::new(5);
        let admitted = (0..100).filter(|_| filter.admit()).count();
        assert_eq!(admitted, 20);
    }

    #[test]
    fn first_event_is_always_admitted() {
        let filter = SampleFilter::new(1000);
        assert!(filter.admit());
        assert!(!filter.admit());
    }
}
