use opentelemetry::global;
use opentelemetry::metrics::Gauge;

/// The metrics surface of the matching coordinator.
/// The gauges are recorded synchronously after every mutation of the
/// corresponding state.
pub struct MatchingMetrics {
    current_offers: Gauge<u64>,
    launch_tokens: Gauge<u64>,
}

impl MatchingMetrics {
    pub fn new() -> Self {
        let meter = global::meter("berth.matching");
        let current_offers = meter
            .u64_gauge("berth.matching.current_offers")
            .with_description("The number of offers currently being processed.")
            .build();
        let launch_tokens = meter
            .u64_gauge("berth.matching.launch_tokens")
            .with_description("The current launch token balance.")
            .build();
        Self {
            current_offers,
            launch_tokens,
        }
    }

    pub fn record_current_offers(&self, value: usize) {
        // Ignore the measurement if conversion failed.
        if let Ok(value) = u64::try_from(value) {
            self.current_offers.record(value, &[]);
        }
    }

    pub fn record_launch_tokens(&self, value: u64) {
        self.launch_tokens.record(value, &[]);
    }
}
