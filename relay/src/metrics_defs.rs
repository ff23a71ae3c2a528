use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Inbound request duration in seconds. Tagged with the response status, or aborted when the client went away first.",
};

pub const REQUESTS_INFLIGHT: MetricDef = MetricDef {
    name: "requests.inflight",
    metric_type: MetricType::Gauge,
    description: "Number of requests currently being processed",
};

pub const SCROBBLES: MetricDef = MetricDef {
    name: "scrobbles",
    metric_type: MetricType::Counter,
    description: "Scrobble submissions. Tagged with outcome: ok, failed, transport_error, malformed_response.",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUEST_DURATION, REQUESTS_INFLIGHT, SCROBBLES];
