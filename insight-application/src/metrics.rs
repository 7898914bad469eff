use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    analyze_requests: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    rate_limited: AtomicU64,
    ingest_events: AtomicU64,
    ingest_errors: AtomicU64,
    alerts_created: AtomicU64,
}

impl Metrics {
    pub fn record_analyze(&self, cache_hit: bool) {
        self.analyze_requests.fetch_add(1, Ordering::Relaxed);
        if cache_hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ingest(&self) {
        self.ingest_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ingest_error(&self) {
        self.ingest_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_alerts(&self, count: usize) {
        self.alerts_created
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let requests = self.analyze_requests.load(Ordering::Relaxed);
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let limited = self.rate_limited.load(Ordering::Relaxed);
        let events = self.ingest_events.load(Ordering::Relaxed);
        let errors = self.ingest_errors.load(Ordering::Relaxed);
        let alerts = self.alerts_created.load(Ordering::Relaxed);

        format!(
            "# TYPE insight_analyze_requests_total counter\n\
insight_analyze_requests_total {}\n\
# TYPE insight_analysis_cache_hits_total counter\n\
insight_analysis_cache_hits_total {}\n\
# TYPE insight_analysis_cache_misses_total counter\n\
insight_analysis_cache_misses_total {}\n\
# TYPE insight_rate_limited_total counter\n\
insight_rate_limited_total {}\n\
# TYPE insight_ingest_events_total counter\n\
insight_ingest_events_total {}\n\
# TYPE insight_ingest_errors_total counter\n\
insight_ingest_errors_total {}\n\
# TYPE insight_alerts_created_total counter\n\
insight_alerts_created_total {}\n",
            requests, hits, misses, limited, events, errors, alerts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_counters_in_prometheus_text_format() {
        let metrics = Metrics::default();
        metrics.record_analyze(true);
        metrics.record_analyze(false);
        metrics.record_alerts(3);
        let text = metrics.render_prometheus();
        assert!(text.contains("insight_analyze_requests_total 2\n"));
        assert!(text.contains("insight_analysis_cache_hits_total 1\n"));
        assert!(text.contains("insight_alerts_created_total 3\n"));
    }
}
