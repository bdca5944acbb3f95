use log::debug;
use std::time::{Duration, SystemTime};

/// Idle classification for a single tick.
///
/// `became_idle_at` is only set while `is_idle` is true. It is back-dated to
/// the instant input actually stopped, which is earlier than the tick that
/// noticed the idle period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdleState {
    pub is_idle: bool,
    pub became_idle_at: Option<SystemTime>,
}

/// Converts raw "time since last input" readings into an idle/active state
/// with hysteresis: idleness starts once the reading exceeds the enter
/// threshold and ends once it falls back to the exit threshold or below.
pub struct IdleDetector {
    enter_threshold: Duration,
    exit_threshold: Duration,
    state: IdleState,
}

impl IdleDetector {
    pub const DEFAULT_THRESHOLD: Duration = Duration::from_secs(120);

    pub fn new(enter_threshold: Duration, exit_threshold: Duration) -> Self {
        Self {
            enter_threshold,
            exit_threshold,
            state: IdleState::default(),
        }
    }

    /// Single-threshold detector: enter and exit share `threshold`.
    pub fn with_threshold(threshold: Duration) -> Self {
        Self::new(threshold, threshold)
    }

    pub fn state(&self) -> IdleState {
        self.state
    }

    /// Feed one idle-duration reading taken at `now`.
    pub fn update(&mut self, idle_duration: Duration, now: SystemTime) -> IdleState {
        if !self.state.is_idle && idle_duration > self.enter_threshold {
            self.state.is_idle = true;
            // The idle span already elapsed before this tick observed it;
            // back-date its start so callers know when input truly stopped.
            self.state.became_idle_at = Some(now.checked_sub(idle_duration).unwrap_or(now));
            debug!(
                "idle after {:.0}s without input",
                idle_duration.as_secs_f64()
            );
        } else if self.state.is_idle && idle_duration <= self.exit_threshold {
            self.state.is_idle = false;
            self.state.became_idle_at = None;
            debug!("active again");
        }
        self.state
    }
}

impl Default for IdleDetector {
    fn default() -> Self {
        Self::with_threshold(Self::DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn t(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs)
    }

    #[test]
    fn test_idle_hysteresis_sequence() {
        let mut detector = IdleDetector::with_threshold(Duration::from_secs(120));

        let readings = [119u64, 121, 60];
        let expected = [false, true, false];

        for (i, (&secs, &want)) in readings.iter().zip(expected.iter()).enumerate() {
            let state = detector.update(Duration::from_secs(secs), t(i as u64));
            assert_eq!(state.is_idle, want, "reading {} ({}s)", i, secs);
        }
    }

    #[test]
    fn test_became_idle_at_is_back_dated() {
        let mut detector = IdleDetector::with_threshold(Duration::from_secs(120));
        let now = t(500);

        let state = detector.update(Duration::from_secs(130), now);
        assert!(state.is_idle);
        assert_eq!(state.became_idle_at, Some(t(370)));
    }

    #[test]
    fn test_became_idle_at_cleared_on_exit() {
        let mut detector = IdleDetector::with_threshold(Duration::from_secs(120));

        detector.update(Duration::from_secs(130), t(0));
        let state = detector.update(Duration::from_secs(1), t(1));

        assert!(!state.is_idle);
        assert!(state.became_idle_at.is_none());
    }

    #[test]
    fn test_distinct_enter_and_exit_thresholds() {
        let mut detector =
            IdleDetector::new(Duration::from_secs(120), Duration::from_secs(60));

        // Crosses the enter threshold.
        assert!(detector.update(Duration::from_secs(121), t(0)).is_idle);
        // Between exit and enter: still idle, no flapping.
        assert!(detector.update(Duration::from_secs(100), t(1)).is_idle);
        // At or below the exit threshold: active again.
        assert!(!detector.update(Duration::from_secs(50), t(2)).is_idle);
    }

    #[test]
    fn test_reading_at_threshold_does_not_enter_idle() {
        let mut detector = IdleDetector::with_threshold(Duration::from_secs(120));
        let state = detector.update(Duration::from_secs(120), t(0));
        assert!(!state.is_idle);
    }
}
