use prometheus::{
    Encoder, GaugeVec, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub accepts_total: IntCounterVec,
    pub active_status_checks: IntGauge,
    pub accept_latency_seconds: HistogramVec,
    pub room_members: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let accepts_total = IntCounterVec::new(
            Opts::new("accepts_total", "Total acceptance attempts by outcome"),
            &["outcome"],
        )
        .expect("valid accepts_total metric");

        let active_status_checks = IntGauge::new(
            "active_status_checks",
            "Currently scheduled order status checks",
        )
        .expect("valid active_status_checks metric");

        let accept_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "accept_latency_seconds",
                "Latency of acceptance resolution in seconds",
            ),
            &["outcome"],
        )
        .expect("valid accept_latency_seconds metric");

        let room_members = GaugeVec::new(
            Opts::new("room_members", "Current members per ride chat room"),
            &["room_id"],
        )
        .expect("valid room_members metric");

        registry
            .register(Box::new(accepts_total.clone()))
            .expect("register accepts_total");
        registry
            .register(Box::new(active_status_checks.clone()))
            .expect("register active_status_checks");
        registry
            .register(Box::new(accept_latency_seconds.clone()))
            .expect("register accept_latency_seconds");
        registry
            .register(Box::new(room_members.clone()))
            .expect("register room_members");

        Self {
            registry,
            accepts_total,
            active_status_checks,
            accept_latency_seconds,
            room_members,
        }
    }

    pub fn observe_accept(&self, outcome: &str, seconds: f64) {
        self.accepts_total.with_label_values(&[outcome]).inc();
        self.accept_latency_seconds
            .with_label_values(&[outcome])
            .observe(seconds);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
