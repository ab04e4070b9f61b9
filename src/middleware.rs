use axum::{
    extract::{ConnectInfo, Request, State},
    http::{StatusCode, header::USER_AGENT},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::time::Instant;

use crate::metrics::{EXCEPTION_TOTAL, REJECTED_TOTAL, REQUEST_LATENCY, REQUEST_TOTAL, RESPONSE_TOTAL};
use crate::pages;
use crate::state::AppState;

// Set on every request by the throttle - true means over the limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited(pub bool);

// User-Agent header of the request, or "unknown"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgent(pub String);

// Process-wide totals, read back from the prometheus counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestCounters {
    pub requests: u64,
    pub responses: u64,
    pub exceptions: u64,
}

pub fn counters() -> RequestCounters {
    RequestCounters {
        requests: REQUEST_TOTAL.get() as u64,
        responses: RESPONSE_TOTAL.get() as u64,
        exceptions: EXCEPTION_TOTAL.get() as u64,
    }
}

// Client identifier - peer IP when the server was started with connect info
pub fn client_id(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn count_requests(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    REQUEST_TOTAL.inc();
    tracing::info!(requests = counters().requests, path = %request.uri().path(), "request received");

    let response = next.run(request).await;

    RESPONSE_TOTAL.inc();
    tracing::info!(responses = counters().responses, status = response.status().as_u16(), "response sent");

    if response.status().is_server_error() {
        EXCEPTION_TOTAL.inc();
        tracing::error!(exceptions = counters().exceptions, status = response.status().as_u16(), "request ended in server error");
    }

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    response
}

pub async fn user_agent(mut request: Request, next: Next) -> Response {
    let agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::debug!(user_agent = %agent, "before handler");
    request.extensions_mut().insert(UserAgent(agent));
    let response = next.run(request).await;
    tracing::debug!("after handler");

    response
}

pub async fn throttle(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let client = client_id(&request);
    let allowed = state.throttle.check(&client, Instant::now());

    if !allowed {
        REJECTED_TOTAL.inc();
        tracing::debug!(client = %client, "client over request limit");
    }

    request.extensions_mut().insert(RateLimited(!allowed));
    next.run(request).await
}

// Turns the throttle mark into a fixed 429 page
pub async fn reject_rate_limited(request: Request, next: Next) -> Response {
    let limited = request
        .extensions()
        .get::<RateLimited>()
        .is_some_and(|RateLimited(limited)| *limited);

    if limited {
        let agent = request
            .extensions()
            .get::<UserAgent>()
            .map(|UserAgent(a)| a.as_str())
            .unwrap_or("unknown");
        tracing::warn!(client = %client_id(&request), user_agent = %agent, "Rate limit exceeded");
        return (StatusCode::TOO_MANY_REQUESTS, pages::too_many_requests()).into_response();
    }

    next.run(request).await
}
