//! Polling helpers for state updated by background threads.

use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Default deadline for [`wait_until_default`].
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

/// Poll `condition` until it holds or `timeout` elapses. Returns whether it
/// held.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// [`wait_until`] with a generous deadline.
pub fn wait_until_default(condition: impl FnMut() -> bool) -> bool {
    wait_until(DEFAULT_WAIT, condition)
}
