use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::metrics::TRACKED_CLIENTS;

// Throttle settings - max requests per client inside one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    pub limit: u32,
    pub reset_duration: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            limit: 30,
            reset_duration: Duration::from_secs(40),
        }
    }
}

// Client window - tracks requests per IP/key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientWindow {
    pub count: u32,
    pub window_start: Instant,
}

impl ClientWindow {
    fn new(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    fn is_expired(&self, now: Instant, reset_duration: Duration) -> bool {
        now.saturating_duration_since(self.window_start) > reset_duration
    }
}

// Fixed window throttle keyed by client id.
// check() holds the shard lock for its key across lookup, reset and increment
pub struct Throttle {
    windows: DashMap<String, ClientWindow>,
    config: ThrottleConfig,
}

impl Throttle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    // Record one request and say if the client is still under the limit
    pub fn check(&self, client_id: &str, now: Instant) -> bool {
        let mut window = self
            .windows
            .entry(client_id.to_string())
            .or_insert_with(|| ClientWindow::new(now));

        // window expired..? start a fresh one
        if window.is_expired(now, self.config.reset_duration) {
            *window = ClientWindow::new(now);
        }

        window.count = window.count.saturating_add(1);
        window.count <= self.config.limit
    }

    pub fn window(&self, client_id: &str) -> Option<ClientWindow> {
        self.windows.get(client_id).map(|w| *w)
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    // Drop expired windows, returns how many were removed.
    // An evicted client just starts a fresh window on its next request
    pub fn sweep(&self, now: Instant) -> usize {
        let reset = self.config.reset_duration;
        let mut removed = 0;
        self.windows.retain(|_, w| {
            let keep = !w.is_expired(now, reset);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}

// Sweeper - evicts stale windows on every tick
pub fn spawn_sweeper(throttle: Arc<Throttle>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        tracing::info!(interval = ?every, "throttle sweeper started");

        loop {
            ticker.tick().await;

            let removed = throttle.sweep(Instant::now());
            let remaining = throttle.tracked_clients();
            TRACKED_CLIENTS.set(remaining as f64);

            if removed > 0 {
                tracing::debug!(removed, remaining, "evicted expired client windows");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn throttle(limit: u32, reset_secs: u64) -> Throttle {
        Throttle::new(ThrottleConfig {
            limit,
            reset_duration: Duration::from_secs(reset_secs),
        })
    }

    #[test]
    fn test_default_config() {
        let config = ThrottleConfig::default();
        assert_eq!(config.limit, 30);
        assert_eq!(config.reset_duration, Duration::from_secs(40));
    }

    #[test]
    fn test_allows_up_to_limit() {
        let t = throttle(5, 40);
        let now = Instant::now();
        for _ in 0..5 {
            assert!(t.check("10.0.0.1", now));
        }
        assert_eq!(t.window("10.0.0.1").unwrap().count, 5);
    }

    #[test]
    fn test_denies_over_limit() {
        let t = throttle(3, 40);
        let now = Instant::now();
        for _ in 0..3 {
            assert!(t.check("10.0.0.1", now));
        }
        assert!(!t.check("10.0.0.1", now));
        assert!(!t.check("10.0.0.1", now));
    }

    #[test]
    fn test_resets_after_window() {
        let t = throttle(2, 10);
        let t0 = Instant::now();
        assert!(t.check("a", t0));
        assert!(t.check("a", t0));
        assert!(!t.check("a", t0));

        // exactly reset_duration is still the same window
        assert!(!t.check("a", t0 + Duration::from_secs(10)));

        let later = t0 + Duration::from_millis(10_001);
        assert!(t.check("a", later));
        let window = t.window("a").unwrap();
        assert_eq!(window.count, 1);
        assert_eq!(window.window_start, later);
    }

    #[test]
    fn test_clients_are_isolated() {
        let t = throttle(1, 40);
        let now = Instant::now();
        assert!(t.check("1.1.1.1", now));
        assert!(!t.check("1.1.1.1", now));
        assert!(t.check("2.2.2.2", now));
        assert_eq!(t.window("2.2.2.2").unwrap().count, 1);
        assert_eq!(t.tracked_clients(), 2);
    }

    #[test]
    fn test_thirty_per_forty_seconds_scenario() {
        let t = throttle(30, 40);
        let t0 = Instant::now();

        for i in 0..30u64 {
            let at = t0 + Duration::from_millis(i * 1000 / 30);
            assert!(t.check("1.2.3.4", at), "call {} should pass", i + 1);
        }
        assert!(!t.check("1.2.3.4", t0 + Duration::from_secs(2)));

        assert!(t.check("1.2.3.4", t0 + Duration::from_secs(41)));
        assert_eq!(t.window("1.2.3.4").unwrap().count, 1);
    }

    #[test]
    fn test_zero_limit_denies_everything() {
        let t = throttle(0, 40);
        assert!(!t.check("x", Instant::now()));
    }

    #[test]
    fn test_earlier_instant_does_not_reset() {
        let t = throttle(1, 1);
        let t0 = Instant::now() + Duration::from_secs(5);
        assert!(t.check("x", t0));
        // clock handed in from before the window start counts as no time passed
        assert!(!t.check("x", Instant::now()));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let t = throttle(10, 40);
        let t0 = Instant::now();
        t.check("old", t0);
        t.check("fresh", t0 + Duration::from_secs(30));

        assert_eq!(t.sweep(t0 + Duration::from_secs(40)), 0);
        assert_eq!(t.sweep(t0 + Duration::from_secs(41)), 1);
        assert!(t.window("old").is_none());
        assert!(t.window("fresh").is_some());
        assert_eq!(t.tracked_clients(), 1);
    }

    #[test]
    fn test_config_is_kept() {
        let t = throttle(7, 12);
        assert_eq!(t.config().limit, 7);
        assert_eq!(t.config().reset_duration, Duration::from_secs(12));
    }

    #[test]
    fn test_sweep_count_ignores_concurrent_inserts() {
        let t = Arc::new(throttle(10, 40));
        let t0 = Instant::now();
        for i in 0..1000 {
            t.check(&format!("old-{}", i), t0);
        }

        let later = t0 + Duration::from_secs(41);
        let writer = {
            let t = Arc::clone(&t);
            thread::spawn(move || {
                for i in 0..1000 {
                    t.check(&format!("new-{}", i), later);
                }
            })
        };

        let removed = t.sweep(later);
        writer.join().unwrap();

        assert_eq!(removed, 1000);
        assert_eq!(t.tracked_clients(), 1000);
    }

    #[test]
    fn test_sweep_does_not_change_decisions() {
        let t = throttle(1, 10);
        let t0 = Instant::now();
        assert!(t.check("a", t0));
        assert!(!t.check("a", t0));

        let later = t0 + Duration::from_secs(11);
        t.sweep(later);
        assert!(t.check("a", later));
        assert!(!t.check("a", later));
    }

    #[test]
    fn test_concurrent_checks_count_every_request() {
        let t = Arc::new(throttle(50, 40));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let t = Arc::clone(&t);
                thread::spawn(move || (0..10).filter(|_| t.check("shared", now)).count())
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 50);
        assert_eq!(t.window("shared").unwrap().count, 80);
    }

    #[tokio::test]
    async fn test_sweeper_evicts_in_background() {
        let t = Arc::new(Throttle::new(ThrottleConfig {
            limit: 5,
            reset_duration: Duration::from_millis(10),
        }));
        t.check("gone", Instant::now());

        let handle = spawn_sweeper(Arc::clone(&t), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert_eq!(t.tracked_clients(), 0);
    }
}
