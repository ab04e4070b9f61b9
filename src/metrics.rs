use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("throttle_requests_total", "Total number of requests").unwrap();
    pub static ref RESPONSE_TOTAL: Counter =
        register_counter!("throttle_responses_total", "Total number of responses").unwrap();
    pub static ref EXCEPTION_TOTAL: Counter =
        register_counter!("throttle_exceptions_total", "Responses that ended in a server error").unwrap();
    pub static ref REJECTED_TOTAL: Counter =
        register_counter!("throttle_rejected_total", "Requests over the per-client limit").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "throttle_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("throttle_tracked_clients", "Client windows currently held in memory").unwrap();
}
