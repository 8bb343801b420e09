//! Seam between the extension and the compositor's input subsystem.
//!
//! The input subsystem owns the physical touch devices. This crate only needs two
//! things from it: a way to switch touchscreen reporting on and off
//! ([`TouchscreenControl`]), and a stream of [`crate::codec::TouchInput`] values it
//! pushes into the broadcast engine.

#[cfg(feature = "backend_libinput")]
pub mod libinput_backend;

#[cfg(feature = "backend_libinput")]
pub use libinput_backend::LibinputTouchBackend;

use tracing::info;

/// The input subsystem's touchscreen on/off switch.
pub trait TouchscreenControl {
    /// Enables or disables touchscreen reporting for every touch device.
    /// Must be idempotent.
    fn set_touchscreen_enabled(&mut self, enabled: bool);

    fn touchscreen_enabled(&self) -> bool;
}

/// Implemented by compositor state that owns a [`TouchscreenControl`].
///
/// Both Wayland front-ends reach the input subsystem through this.
pub trait TouchscreenHandler {
    fn touchscreen(&mut self) -> &mut dyn TouchscreenControl;
}

/// In-memory switch for compositors without physical touch devices (headless,
/// nested, tests).
#[derive(Debug, Clone)]
pub struct TouchscreenSwitch {
    enabled: bool,
    changes: u32,
}

impl TouchscreenSwitch {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, changes: 0 }
    }

    /// Number of calls that actually flipped the state.
    pub fn changes(&self) -> u32 {
        self.changes
    }
}

impl Default for TouchscreenSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TouchscreenControl for TouchscreenSwitch {
    fn set_touchscreen_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.changes += 1;
            info!(enabled, "Touchscreen state changed");
        }
    }

    fn touchscreen_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_defaults_to_enabled() {
        let switch = TouchscreenSwitch::default();
        assert!(switch.touchscreen_enabled());
        assert_eq!(switch.changes(), 0);
    }

    #[test]
    fn switch_only_counts_real_changes() {
        let mut switch = TouchscreenSwitch::new(true);
        switch.set_touchscreen_enabled(true);
        assert_eq!(switch.changes(), 0);
        switch.set_touchscreen_enabled(false);
        switch.set_touchscreen_enabled(false);
        assert!(!switch.touchscreen_enabled());
        assert_eq!(switch.changes(), 1);
    }
}
