use super::FocusProbe;
use crate::error::Error;
use std::time::Duration;
use x11rb::connection::Connection;
use x11rb::protocol::screensaver;
use x11rb::protocol::xproto::{Atom, AtomEnum, ConnectionExt, Window};

pub struct X11Probe {
    conn: x11rb::rust_connection::RustConnection,
    root: Window,
}

impl X11Probe {
    pub fn new() -> Result<Self, Error> {
        let (conn, screen_num) = x11rb::connect(None)
            .map_err(|e| Error::Platform(format!("failed to connect to X server: {e}")))?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| Error::Platform(format!("no X screen {screen_num}")))?
            .root;

        Ok(Self { conn, root })
    }

    fn atom(&self, name: &str) -> Option<Atom> {
        self.conn
            .intern_atom(false, name.as_bytes())
            .ok()?
            .reply()
            .ok()
            .map(|r| r.atom)
    }

    fn window_property(&self, window: Window, atom: Atom) -> Option<String> {
        let reply = self
            .conn
            .get_property(false, window, atom, AtomEnum::ANY, 0, 1024)
            .ok()?
            .reply()
            .ok()?;

        if reply.value.is_empty() {
            return None;
        }

        String::from_utf8(reply.value).ok()
    }

    fn active_window_id(&self) -> Option<Window> {
        let atom = self.atom("_NET_ACTIVE_WINDOW")?;
        let reply = self
            .conn
            .get_property(false, self.root, atom, AtomEnum::WINDOW, 0, 1)
            .ok()?
            .reply()
            .ok()?;

        let window = reply.value32()?.next();
        window
    }
}

impl FocusProbe for X11Probe {
    fn focus_label(&self) -> Option<String> {
        let window = self.active_window_id()?;

        let name_atom = self
            .atom("_NET_WM_NAME")
            .unwrap_or_else(|| AtomEnum::WM_NAME.into());

        self.window_property(window, name_atom)
    }

    fn idle_duration(&self) -> Duration {
        let ms = screensaver::query_info(&self.conn, self.root)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|info| info.ms_since_user_input)
            .unwrap_or(0);

        Duration::from_millis(u64::from(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires X11 display
    fn test_live_probe() {
        let probe = X11Probe::new().unwrap();
        println!(
            "focus: {:?}, idle: {:?}",
            probe.focus_label(),
            probe.idle_duration()
        );
    }
}
