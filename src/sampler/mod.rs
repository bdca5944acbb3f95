use crate::error::Error;
use crate::idle::{IdleDetector, IdleState};
use crate::platform::FocusProbe;
use crate::tracker::ActivityTracker;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub poll_interval: Duration,
    pub idle_enter_threshold: Duration,
    pub idle_exit_threshold: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            idle_enter_threshold: IdleDetector::DEFAULT_THRESHOLD,
            idle_exit_threshold: IdleDetector::DEFAULT_THRESHOLD,
        }
    }
}

impl SamplerConfig {
    /// A bad interval or threshold is fatal at construction time; the
    /// hysteresis behavior would be undefined otherwise.
    pub fn validate(&self) -> Result<(), Error> {
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig {
                field: "poll_interval",
                reason: "must be positive".into(),
            });
        }
        if self.idle_enter_threshold.is_zero() {
            return Err(Error::InvalidConfig {
                field: "idle_enter_threshold",
                reason: "must be positive".into(),
            });
        }
        if self.idle_exit_threshold.is_zero() {
            return Err(Error::InvalidConfig {
                field: "idle_exit_threshold",
                reason: "must be positive".into(),
            });
        }
        if self.idle_exit_threshold > self.idle_enter_threshold {
            return Err(Error::InvalidConfig {
                field: "idle_exit_threshold",
                reason: "cannot exceed idle_enter_threshold".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Session {
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
}

/// Owns the polling thread: on every tick it reads the platform probe,
/// updates idle detection and feeds the tracker. Ticks are strictly
/// sequential; the tracker's own lock covers concurrent drains.
pub struct SamplerService<P: FocusProbe + 'static> {
    config: SamplerConfig,
    running: Arc<AtomicBool>,
    tracker: Arc<ActivityTracker>,
    probe: Arc<P>,
    session: Mutex<Session>,
}

impl<P: FocusProbe + 'static> SamplerService<P> {
    pub fn new(
        probe: P,
        tracker: Arc<ActivityTracker>,
        config: SamplerConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            tracker,
            probe: Arc::new(probe),
            session: Mutex::new(Session::default()),
        })
    }

    pub fn tracker(&self) -> Arc<ActivityTracker> {
        Arc::clone(&self.tracker)
    }

    pub fn start(&self) -> thread::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        {
            let mut session = self.lock_session();
            session.started_at = Some(Instant::now());
            session.stopped_at = None;
        }

        let running = Arc::clone(&self.running);
        let tracker = Arc::clone(&self.tracker);
        let probe = Arc::clone(&self.probe);
        let config = self.config.clone();

        thread::spawn(move || {
            let mut detector =
                IdleDetector::new(config.idle_enter_threshold, config.idle_exit_threshold);
            info!("sampler started, polling every {:?}", config.poll_interval);

            while running.load(Ordering::SeqCst) {
                let now = SystemTime::now();
                let idle: IdleState = detector.update(probe.idle_duration(), now);
                // A failed focus read comes back as None and ends up in the
                // "None" bucket; a bad tick never stops the loop.
                let label = probe.focus_label();
                tracker.poll(label.as_deref(), &idle, now);

                thread::sleep(config.poll_interval);
            }

            info!("sampler stopped");
        })
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let mut session = self.lock_session();
        if session.started_at.is_some() {
            session.stopped_at = Some(Instant::now());
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Span between the last start and stop. Zero while never started or
    /// still running.
    pub fn elapsed(&self) -> Duration {
        let session = self.lock_session();
        match (session.started_at, session.stopped_at) {
            (Some(started), Some(stopped)) => stopped.duration_since(started),
            _ => Duration::ZERO,
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        match self.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("SamplerService: session mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
