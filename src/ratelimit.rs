use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Spaces requests to the same host with a jittered minimum delay.
///
/// Vendor sites rate-limit and bot-detect; the delay between requests to one
/// host is a politeness requirement, not a correctness one. Boards on
/// different hosts are not held up by each other.
#[derive(Clone)]
pub struct HostPacer {
    /// Host -> earliest next allowed request
    reserved: Arc<Mutex<HashMap<String, Instant>>>,
    delay_min_ms: u64,
    delay_max_ms: u64,
}

impl HostPacer {
    pub fn new(delay_min_ms: u64, delay_max_ms: u64) -> Self {
        HostPacer {
            reserved: Arc::new(Mutex::new(HashMap::new())),
            delay_min_ms,
            delay_max_ms: delay_max_ms.max(delay_min_ms),
        }
    }

    /// The delay band the source sites tolerate (0.3-0.8s between hits)
    pub fn default_polite() -> Self {
        HostPacer::new(300, 800)
    }

    /// Wait until a request to `host` is allowed. Concurrent callers queue:
    /// each reserves the slot after the previous one's delay.
    pub async fn pause(&self, host: &str) {
        let wait = {
            let mut reserved = match self.reserved.lock() {
                Ok(r) => r,
                Err(poisoned) => poisoned.into_inner(),
            };
            let now = Instant::now();
            let delay = Duration::from_millis(self.random_delay_ms());
            let start = match reserved.get(host) {
                Some(&next) if next > now => next,
                _ => now,
            };
            reserved.insert(host.to_string(), start + delay);
            start.saturating_duration_since(now)
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    fn random_delay_ms(&self) -> u64 {
        let mut rng = rand::thread_rng();
        rng.gen_range(self.delay_min_ms..=self.delay_max_ms)
    }
}

/// Exponential backoff for fetch retries
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_ms: u64,
    max_ms: u64,
    max_retries: usize,
    current_retry: usize,
}

impl ExponentialBackoff {
    pub fn new(initial_ms: u64, max_ms: u64, max_retries: usize) -> Self {
        ExponentialBackoff {
            initial_ms,
            max_ms,
            max_retries,
            current_retry: 0,
        }
    }

    pub fn can_retry(&self) -> bool {
        self.current_retry < self.max_retries
    }

    /// Next backoff duration, or None once retries are exhausted
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if !self.can_retry() {
            return None;
        }
        let backoff_ms = self
            .initial_ms
            .saturating_mul(2u64.saturating_pow(self.current_retry as u32))
            .min(self.max_ms);
        self.current_retry += 1;
        Some(Duration::from_millis(backoff_ms))
    }

    /// Like `next_backoff` but with up to 25% random jitter added, so
    /// retries against the same host don't land in lockstep
    pub fn next_backoff_jittered(&mut self) -> Option<Duration> {
        let base = self.next_backoff()?;
        let mut rng = rand::thread_rng();
        let jitter_ms = rng.gen_range(0..=(base.as_millis() as u64 / 4).max(1));
        Some(base + Duration::from_millis(jitter_ms))
    }

    pub fn reset(&mut self) {
        self.current_retry = 0;
    }
}
