mod health;
mod metrics;
mod request_data;
mod upload;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use request_data::{ConcatParams, bio_handler, query_handler};
pub use upload::{upload_form_handler, upload_handler};
