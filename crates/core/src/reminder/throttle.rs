//! Dispatch throttle
//!
//! Token bucket shared by all dispatches of a service. The bucket starts full
//! so a tick may burst up to its capacity, then refills continuously at
//! `per_minute / 60` tokens per second.

use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct DispatchThrottle {
    capacity: f64,
    tokens_per_sec: f64,
    state: Mutex<BucketState>,
}

impl DispatchThrottle {
    /// Bucket allowing `per_minute` dispatches per minute (minimum 1).
    pub fn per_minute(per_minute: u32) -> Self {
        let capacity = f64::from(per_minute.max(1));
        Self {
            capacity,
            tokens_per_sec: capacity / 60.0,
            state: Mutex::new(BucketState { tokens: capacity, last_refill: Instant::now() }),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    fn lock(&self) -> MutexGuard<'_, BucketState> {
        self.state.lock()
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(state.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            state.tokens = (state.tokens + elapsed * self.tokens_per_sec).min(self.capacity);
            state.last_refill = now;
        }
    }

    /// Take one token if available.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.lock();
        self.refill(&mut state);
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens currently available, rounded down
    pub fn available(&self) -> u32 {
        let mut state = self.lock();
        self.refill(&mut state);
        state.tokens.floor() as u32
    }

    /// Wait until a token is available and take it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.lock();
                self.refill(&mut state);
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                (1.0 - state.tokens) / self.tokens_per_sec
            };

            let wait = Duration::from_secs_f64(wait.max(0.001));
            debug!(wait_ms = wait.as_millis() as u64, "Dispatch throttled");
            tokio::time::sleep(wait).await;
        }
    }
}
