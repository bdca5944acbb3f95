use crate::idle::IdleState;
use log::warn;
use serde::ser::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Identifier of whatever holds input focus during a span of time.
///
/// `NoFocus` renders as `"None"` (no window focused, or an unreadable title)
/// and `Idle` renders as `"Idle Period"`. Both are ordinary aggregation keys,
/// not errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FocusLabel {
    Window(String),
    NoFocus,
    Idle,
}

impl fmt::Display for FocusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusLabel::Window(title) => f.write_str(title),
            FocusLabel::NoFocus => f.write_str("None"),
            FocusLabel::Idle => f.write_str("Idle Period"),
        }
    }
}

impl Serialize for FocusLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One focus change: at `timestamp`, focus moved to `label`.
/// Entries are appended in strictly increasing timestamp order and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LogEntry {
    #[serde(serialize_with = "unix_secs")]
    pub timestamp: SystemTime,
    pub label: FocusLabel,
}

fn unix_secs<S: Serializer>(t: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
    let secs = t
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs_f64();
    serializer.serialize_f64(secs)
}

/// One row of a drained aggregate: accumulated minutes for a label,
/// rounded to two decimals.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AggregateEntry {
    pub label: String,
    pub minutes: f64,
}

impl AggregateEntry {
    fn new(label: Option<&FocusLabel>, total: Duration) -> Self {
        // The startup bucket (no window observed yet) reports as "None",
        // same as an unreadable title.
        let label = label.map_or_else(|| "None".to_string(), ToString::to_string);
        let minutes = (total.as_secs_f64() / 60.0 * 100.0).round() / 100.0;
        Self { label, minutes }
    }
}

impl fmt::Display for AggregateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.2} minutes", self.label, self.minutes)
    }
}

#[derive(Debug)]
struct TrackerState {
    /// `None` until the first transition is observed; that startup span is
    /// still a legitimate aggregation bucket.
    current: Option<FocusLabel>,
    last_change_at: SystemTime,
    log: Vec<LogEntry>,
    /// Index of the first log entry not yet returned by `drain_new_entries`.
    cursor: usize,
    totals: HashMap<Option<FocusLabel>, Duration>,
}

/// Time-attribution state machine.
///
/// `poll` is driven by a single periodic sampler; `drain_new_entries`,
/// `drain_aggregate` and `peek_aggregate` may be called from any thread.
/// All state sits behind one mutex so a reader never observes a transition
/// half-applied.
pub struct ActivityTracker {
    state: Mutex<TrackerState>,
}

impl ActivityTracker {
    /// `start` anchors the first attribution span; time before the first
    /// transition is charged to the startup bucket.
    pub fn new(start: SystemTime) -> Self {
        Self {
            state: Mutex::new(TrackerState {
                current: None,
                last_change_at: start,
                log: Vec::new(),
                cursor: 0,
                totals: HashMap::new(),
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, TrackerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("ActivityTracker: state mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Process one sampling tick.
    ///
    /// `raw_label` is the window title as read from the platform, or `None`
    /// when there is no focused window or the read failed. The idle state
    /// overrides the raw label entirely.
    pub fn poll(&self, raw_label: Option<&str>, idle: &IdleState, now: SystemTime) {
        let effective = if idle.is_idle {
            FocusLabel::Idle
        } else {
            match raw_label {
                Some(title) if !title.is_empty() => FocusLabel::Window(title.to_string()),
                _ => FocusLabel::NoFocus,
            }
        };

        let mut state = self.lock_state();
        if state.current.as_ref() == Some(&effective) {
            // Common case: focus unchanged since the last tick.
            return;
        }

        let elapsed = now
            .duration_since(state.last_change_at)
            .unwrap_or(Duration::ZERO);
        let previous = state.current.take();
        *state.totals.entry(previous).or_insert(Duration::ZERO) += elapsed;
        state.last_change_at = now;
        state.log.push(LogEntry {
            timestamp: now,
            label: effective.clone(),
        });
        state.current = Some(effective);
    }

    /// Log entries appended since the previous call. Advances the internal
    /// cursor, so each entry is returned exactly once.
    pub fn drain_new_entries(&self) -> Vec<LogEntry> {
        let mut state = self.lock_state();
        let entries = state.log[state.cursor..].to_vec();
        state.cursor = state.log.len();
        entries
    }

    /// Snapshot of the per-label totals, then **clears the table**.
    ///
    /// This is a consume-once read: the tracker keeps no history of drained
    /// totals, so callers that need retention must persist the returned rows
    /// themselves. Use [`peek_aggregate`](Self::peek_aggregate) for a
    /// non-destructive view.
    pub fn drain_aggregate(&self) -> Vec<AggregateEntry> {
        let mut state = self.lock_state();
        let rows = snapshot(&state.totals);
        state.totals.clear();
        rows
    }

    /// Non-destructive snapshot of the per-label totals.
    pub fn peek_aggregate(&self) -> Vec<AggregateEntry> {
        snapshot(&self.lock_state().totals)
    }

    /// The label currently being attributed to, if any tick has run.
    pub fn current_label(&self) -> Option<FocusLabel> {
        self.lock_state().current.clone()
    }
}

fn snapshot(totals: &HashMap<Option<FocusLabel>, Duration>) -> Vec<AggregateEntry> {
    let mut rows: Vec<_> = totals
        .iter()
        .map(|(label, total)| AggregateEntry::new(label.as_ref(), *total))
        .collect();
    // HashMap order is arbitrary; sort for deterministic output.
    rows.sort_by(|a, b| a.label.cmp(&b.label));
    rows
}
