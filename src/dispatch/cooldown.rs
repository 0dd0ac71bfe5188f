use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serenity::all::UserId;

/// Per-process tracker of (actor, command) cooldown windows.
///
/// The whole read-check-write sequence runs under one mutex guard so that
/// two in-flight checks for the same key can never both arm a window.
/// Entries are swept opportunistically when a new window is armed; `check`
/// never relies on the sweep because it re-validates expiry itself.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    entries: Mutex<HashMap<(UserId, String), Instant>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fused check-and-arm. Returns 0 and arms a fresh window when the key
    /// is absent or expired; otherwise returns the remaining whole seconds
    /// (rounded up) without touching the existing window, so a blocked
    /// attempt never extends or restarts the timer.
    pub fn check(&self, actor: UserId, command: &str, duration: Duration) -> u64 {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let key = (actor, command.to_owned());
        if let Some(expiry) = entries.get(&key)
            && *expiry > now
        {
            return ceil_seconds(expiry.duration_since(now));
        }
        entries.insert(key, now + duration);
        entries.retain(|_, expiry| *expiry > now);
        0
    }

    /// Whether a live window exists for the key, without arming one.
    pub fn is_armed(&self, actor: UserId, command: &str) -> bool {
        let now = Instant::now();
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(&(actor, command.to_owned()))
            .is_some_and(|expiry| *expiry > now)
    }

    #[cfg(test)]
    fn stored(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

fn ceil_seconds(remaining: Duration) -> u64 {
    (remaining.as_millis() as u64).div_ceil(1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};

    const ACTOR: UserId = UserId::new(1001);

    #[test]
    fn first_check_arms_and_passes() {
        let tracker = CooldownTracker::new();
        assert_eq!(tracker.check(ACTOR, "ping", Duration::from_secs(3)), 0);
        assert!(tracker.is_armed(ACTOR, "ping"));
    }

    #[test]
    fn second_check_reports_remaining_within_duration() {
        let tracker = CooldownTracker::new();
        assert_eq!(tracker.check(ACTOR, "ping", Duration::from_secs(10)), 0);
        let remaining = tracker.check(ACTOR, "ping", Duration::from_secs(10));
        assert!(remaining > 0);
        assert!(remaining <= 10);
    }

    #[test]
    fn blocked_attempts_never_extend_the_window() {
        let tracker = CooldownTracker::new();
        assert_eq!(tracker.check(ACTOR, "ping", Duration::from_millis(300)), 0);
        std::thread::sleep(Duration::from_millis(20));
        let first = tracker.check(ACTOR, "ping", Duration::from_millis(300));
        std::thread::sleep(Duration::from_millis(20));
        let second = tracker.check(ACTOR, "ping", Duration::from_millis(300));
        assert!(first > 0);
        assert!(second <= first);
        // After the original window elapses the key is free again, proving
        // the rejected attempts did not restart the timer.
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(tracker.check(ACTOR, "ping", Duration::from_millis(300)), 0);
    }

    #[test]
    fn window_cycles_after_expiry() {
        let tracker = CooldownTracker::new();
        assert_eq!(tracker.check(ACTOR, "ping", Duration::from_millis(40)), 0);
        std::thread::sleep(Duration::from_millis(60));
        assert!(!tracker.is_armed(ACTOR, "ping"));
        assert_eq!(tracker.check(ACTOR, "ping", Duration::from_millis(40)), 0);
    }

    #[test]
    fn keys_are_scoped_per_actor_and_command() {
        let tracker = CooldownTracker::new();
        assert_eq!(tracker.check(ACTOR, "ping", Duration::from_secs(5)), 0);
        assert_eq!(tracker.check(ACTOR, "info", Duration::from_secs(5)), 0);
        assert_eq!(
            tracker.check(UserId::new(2002), "ping", Duration::from_secs(5)),
            0
        );
    }

    #[test]
    fn rapid_concurrent_checks_arm_exactly_once() {
        let tracker = Arc::new(CooldownTracker::new());
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    tracker.check(ACTOR, "ping", Duration::from_secs(5))
                })
            })
            .collect();
        let passes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|remaining| *remaining == 0)
            .count();
        assert_eq!(passes, 1);
    }

    #[test]
    fn expired_entries_are_swept_on_arm() {
        let tracker = CooldownTracker::new();
        tracker.check(ACTOR, "ping", Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(30));
        tracker.check(ACTOR, "info", Duration::from_secs(5));
        assert_eq!(tracker.stored(), 1);
    }
}
