pub mod types;

pub use types::FocusProbe;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::X11Probe as NativeProbe;

// Stub for development on other platforms
#[cfg(not(target_os = "linux"))]
pub struct NativeProbe;

#[cfg(not(target_os = "linux"))]
impl NativeProbe {
    pub fn new() -> Result<Self, crate::error::Error> {
        Ok(Self)
    }
}

#[cfg(not(target_os = "linux"))]
impl FocusProbe for NativeProbe {
    fn focus_label(&self) -> Option<String> {
        Some("Stub Window".to_string())
    }

    fn idle_duration(&self) -> std::time::Duration {
        std::time::Duration::ZERO
    }
}
