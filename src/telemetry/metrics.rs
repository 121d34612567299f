//! Prometheus metrics

use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Snapshots fetched and queued by the poller
    SnapshotsPolled,
    /// Poller ticks abandoned on fetch or push failure
    PollFailures,
    /// Results forwarded to subscriber connections
    ResultsForwarded,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Inbound (snapshot) queue depth
    InboundQueueDepth,
    /// Outbound (results) queue depth
    OutboundQueueDepth,
    /// Currently connected subscriber count
    ConnectedClients,
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Depth endpoint fetch latency
    DepthFetch,
}

/// Increment a counter
pub fn increment(metric: CounterMetric) {
    let name = match metric {
        CounterMetric::SnapshotsPolled => "lobcast_snapshots_polled_total",
        CounterMetric::PollFailures => "lobcast_poll_failures_total",
        CounterMetric::ResultsForwarded => "lobcast_results_forwarded_total",
    };
    metrics::counter!(name).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let name = match metric {
        GaugeMetric::InboundQueueDepth => "lobcast_inbound_queue_depth",
        GaugeMetric::OutboundQueueDepth => "lobcast_outbound_queue_depth",
        GaugeMetric::ConnectedClients => "lobcast_connected_clients",
    };
    metrics::gauge!(name).set(value);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let name = match metric {
        LatencyMetric::DepthFetch => "lobcast_depth_fetch_latency_ms",
    };
    metrics::histogram!(name).record(duration.as_millis() as f64);
}
