//! Enable/disable requests coming from any bound client.
//!
//! There is no per-client state and no access control beyond having bound the
//! object: any client that can bind the capability may switch the touchscreen for
//! the whole compositor. Both requests are unconditional and idempotent.

use crate::input::TouchscreenControl;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    Enable,
    Disable,
}

impl ControlRequest {
    pub fn enabled(self) -> bool {
        matches!(self, ControlRequest::Enable)
    }
}

/// Forwards `request` to the input subsystem. Never fails.
pub fn apply(request: ControlRequest, input: &mut dyn TouchscreenControl) {
    let was_enabled = input.touchscreen_enabled();
    info!(?request, was_enabled, "Touchscreen control request");
    input.set_touchscreen_enabled(request.enabled());
}

pub fn enable(input: &mut dyn TouchscreenControl) {
    apply(ControlRequest::Enable, input);
}

pub fn disable(input: &mut dyn TouchscreenControl) {
    apply(ControlRequest::Disable, input);
}
