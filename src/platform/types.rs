use std::time::Duration;

/// Platform queries the sampler depends on.
///
/// Implementations must absorb their own failures: an unreadable focus
/// label maps to `None`, a failed idle query maps to `Duration::ZERO`
/// (assume the user is active). A single bad read must never surface as
/// an error to the sampling loop.
pub trait FocusProbe: Send + Sync {
    /// Title of the window currently holding input focus, or `None` when
    /// no window is focused or the title cannot be read.
    fn focus_label(&self) -> Option<String>;

    /// Time since the last user input event.
    fn idle_duration(&self) -> Duration;
}
