use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::rate_limit::ThrottleConfig;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "request-throttle")]
#[command(about = "Per-client request throttling in front of the request data pages")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "THROTTLE_PORT", default_value_t = 8080)]
    pub port: u16,

    // Max requests per client inside one window
    #[arg(long, env = "THROTTLE_LIMIT", default_value_t = 30)]
    pub throttle_limit: u32,

    // Window length in seconds
    #[arg(long, env = "THROTTLE_RESET_SECS", default_value_t = 40)]
    pub throttle_reset: u64,

    // How often expired windows are swept, in seconds
    #[arg(long, env = "THROTTLE_SWEEP_SECS", default_value_t = 60)]
    pub sweep_interval: u64,

    // Where uploaded files are stored
    #[arg(long, env = "THROTTLE_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    // Largest accepted upload
    #[arg(long, env = "THROTTLE_MAX_UPLOAD_BYTES", default_value_t = 1024 * 1024)]
    pub max_upload_bytes: u64,
}

impl Args {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_interval == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::ZeroUploadLimit);
        }
        Ok(())
    }

    pub fn throttle(&self) -> ThrottleConfig {
        ThrottleConfig {
            limit: self.throttle_limit,
            reset_duration: Duration::from_secs(self.throttle_reset),
        }
    }

    pub fn sweep_every(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["request-throttle"]).unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.throttle(), ThrottleConfig::default());
        assert_eq!(args.sweep_every(), Duration::from_secs(60));
        assert_eq!(args.upload_dir, PathBuf::from("uploads"));
        assert_eq!(args.max_upload_bytes, 1_048_576);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "request-throttle",
            "--throttle-limit",
            "5",
            "--throttle-reset",
            "10",
        ])
        .unwrap();
        assert_eq!(args.throttle().limit, 5);
        assert_eq!(args.throttle().reset_duration, Duration::from_secs(10));
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let args = Args::try_parse_from(["request-throttle", "--sweep-interval", "0"]).unwrap();
        assert!(matches!(args.validate(), Err(ConfigError::ZeroSweepInterval)));
    }

    #[test]
    fn test_zero_upload_limit_rejected() {
        let args = Args::try_parse_from(["request-throttle", "--max-upload-bytes", "0"]).unwrap();
        assert!(matches!(args.validate(), Err(ConfigError::ZeroUploadLimit)));
    }
}
