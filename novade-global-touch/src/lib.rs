//! NovaDE Global Touch.
//!
//! A compositor-side implementation of the `weston_global_touch` Wayland
//! extension. It lets privileged clients observe every touch event the
//! compositor receives, independent of surface focus, and lets them switch
//! touchscreen reporting on and off for the whole compositor.
//!
//! # Layout
//!
//! - [`codec`]: conversion of input-subsystem touch samples to wire events.
//! - [`registry`]: ordered set of live subscriptions.
//! - [`capability`]: create/destroy lifecycle of the capability.
//! - [`broadcast`]: fan-out of touch input to every subscription.
//! - [`control`]: enable/disable requests routed to the input subsystem.
//! - [`input`]: the seam to the input subsystem (and an optional libinput backend).
//! - [`protocols`]: generated bindings and `wayland-server` dispatch.
//! - [`client`]: the client side used by the `novade-global-touch` CLI.
//! - [`config`], [`logging`], [`error`]: ambient plumbing.
//!
//! Everything runs on the compositor's event-loop thread; nothing here is `Send`
//! beyond what `wayland-server` requires of user data.

pub mod broadcast;
pub mod capability;
pub mod client;
pub mod codec;
pub mod config;
pub mod control;
pub mod error;
pub mod input;
pub mod logging;
pub mod protocols;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use broadcast::TouchEventSink;
pub use capability::{Advertiser, GlobalTouchCapability, GlobalTouchState};
pub use codec::{Fixed, TouchInput, TouchKind, TouchSample, WireEvent};
pub use config::{ConfigLoader, GlobalTouchConfig};
pub use control::ControlRequest;
pub use error::{ConfigError, GlobalTouchError, Result};
pub use input::{TouchscreenControl, TouchscreenHandler, TouchscreenSwitch};
pub use protocols::global_touch::{GlobalTouchHandler, WaylandGlobalTouchState};
pub use protocols::touch_switch::{TouchSwitchHandler, TouchSwitchState};
pub use registry::{SubscriptionKey, SubscriptionRegistry};

/// Crates used in the public API and by the `delegate_*` macros.
pub mod reexports {
    pub use wayland_client;
    pub use wayland_server;
}
