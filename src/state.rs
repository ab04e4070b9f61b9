use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Args;
use crate::rate_limit::Throttle;

// app's shared state

#[derive(Clone)]
pub struct AppState {
    pub throttle: Arc<Throttle>,
    pub upload_dir: PathBuf,    // where uploads land
    pub max_upload_bytes: u64,  // bigger files get the size error page
}

impl AppState {
    pub fn from_args(args: &Args) -> Self {
        Self {
            throttle: Arc::new(Throttle::new(args.throttle())),
            upload_dir: args.upload_dir.clone(),
            max_upload_bytes: args.max_upload_bytes,
        }
    }
}
