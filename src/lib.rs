pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod pages;
pub mod rate_limit;
pub mod state;

pub use app::app;
pub use rate_limit::{ClientWindow, Throttle, ThrottleConfig};
pub use state::AppState;
