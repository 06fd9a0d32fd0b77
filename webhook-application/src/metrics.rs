use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    webhook_requests: AtomicU64,
    events_stored: AtomicU64,
    events_duplicate: AtomicU64,
    events_unstored: AtomicU64,
    requests_rejected: AtomicU64,
    requests_rate_limited: AtomicU64,
    counter_store_errors: AtomicU64,
}

impl Metrics {
    pub fn record_request(&self) {
        self.webhook_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stored(&self) {
        self.events_stored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.events_duplicate.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.events_unstored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.requests_rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_counter_error(&self) {
        self.counter_store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stored(&self) -> u64 {
        self.events_stored.load(Ordering::Relaxed)
    }

    pub fn duplicates(&self) -> u64 {
        self.events_duplicate.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.requests_rejected.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let requests = self.webhook_requests.load(Ordering::Relaxed);
        let stored = self.events_stored.load(Ordering::Relaxed);
        let duplicates = self.events_duplicate.load(Ordering::Relaxed);
        let unstored = self.events_unstored.load(Ordering::Relaxed);
        let rejected = self.requests_rejected.load(Ordering::Relaxed);
        let rate_limited = self.requests_rate_limited.load(Ordering::Relaxed);
        let counter_errors = self.counter_store_errors.load(Ordering::Relaxed);

        format!(
            "# TYPE webhook_requests_total counter\n\
webhook_requests_total {}\n\
# TYPE webhook_events_stored_total counter\n\
webhook_events_stored_total {}\n\
# TYPE webhook_events_duplicate_total counter\n\
webhook_events_duplicate_total {}\n\
# TYPE webhook_events_unstored_total counter\n\
webhook_events_unstored_total {}\n\
# TYPE webhook_requests_rejected_total counter\n\
webhook_requests_rejected_total {}\n\
# TYPE webhook_requests_rate_limited_total counter\n\
webhook_requests_rate_limited_total {}\n\
# TYPE webhook_counter_store_errors_total counter\n\
webhook_counter_store_errors_total {}\n",
            requests, stored, duplicates, unstored, rejected, rate_limited, counter_errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prometheus_output_reflects_counters() {
        let metrics = Metrics::default();
        metrics.record_request();
        metrics.record_request();
        metrics.record_stored();
        metrics.record_duplicate();
        metrics.record_rate_limited();

        let text = metrics.render_prometheus();
        assert!(text.contains("webhook_requests_total 2\n"));
        assert!(text.contains("webhook_events_stored_total 1\n"));
        assert!(text.contains("webhook_events_duplicate_total 1\n"));
        assert!(text.contains("webhook_requests_rate_limited_total 1\n"));
        assert!(text.contains("webhook_requests_rejected_total 0\n"));
    }
}
