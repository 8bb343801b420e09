//! `weston_global_touch` server implementation.
//!
//! A compositor opts in by implementing [`GlobalTouchHandler`] for its state and
//! invoking [`delegate_global_touch!`](crate::delegate_global_touch):
//!
//! ```rust,ignore
//! struct State {
//!     global_touch: WaylandGlobalTouchState,
//!     touchscreen: TouchscreenSwitch,
//! }
//!
//! impl TouchscreenHandler for State {
//!     fn touchscreen(&mut self) -> &mut dyn TouchscreenControl {
//!         &mut self.touchscreen
//!     }
//! }
//!
//! impl GlobalTouchHandler for State {
//!     fn global_touch_state(&mut self) -> &mut WaylandGlobalTouchState {
//!         &mut self.global_touch
//!     }
//! }
//!
//! novade_global_touch::delegate_global_touch!(State);
//!
//! state.global_touch.create_global::<State>(&display.handle())?;
//! // for every touch input the input subsystem produces:
//! state.global_touch.deliver(input);
//! ```
//!
//! Each bound `weston_global_touch` object is one subscription. Its user data
//! remembers the subscription key; the key is released when the object is
//! destroyed, whether by the `destroy` request or by the client disconnecting.
//! Objects that outlive their capability stay alive for the client but are inert.

use super::DisplayAdvertiser;
use crate::broadcast::TouchEventSink;
use crate::capability::GlobalTouchState;
use crate::codec::WireEvent;
use crate::control::{self, ControlRequest};
use crate::error::{GlobalTouchError, Result};
use crate::input::TouchscreenHandler;
use crate::registry::SubscriptionKey;
use std::sync::OnceLock;
use wayland_server::backend::{ClientId, GlobalId};
use wayland_client::protocol::wl_display;
use wayland_server::{Client, DataInit, Dispatch, DisplayHandle, GlobalDispatch, New, Resource};

pub use super::weston_global_touch::server::weston_global_touch::{self, WestonGlobalTouch};

/// Version of `weston_global_touch` advertised by this implementation.
pub const GLOBAL_TOUCH_VERSION: u32 = 1;

/// The capability as held by a Wayland compositor: subscriptions are the bound
/// protocol objects, the advertisement is the display global.
pub type WaylandGlobalTouchState = GlobalTouchState<WestonGlobalTouch, GlobalId>;

/// Compositor state that hosts the global touch capability.
pub trait GlobalTouchHandler: TouchscreenHandler {
    fn global_touch_state(&mut self) -> &mut WaylandGlobalTouchState;
}

/// User data of a bound `weston_global_touch` object.
#[derive(Debug, Default)]
pub struct SubscriptionData {
    key: OnceLock<SubscriptionKey>,
}

impl SubscriptionData {
    /// `None` if the object was bound while no capability existed.
    pub fn key(&self) -> Option<SubscriptionKey> {
        self.key.get().copied()
    }
}

impl GlobalTouchState<WestonGlobalTouch, GlobalId> {
    /// Creates the capability and advertises it on `display` as a
    /// `weston_global_touch` global dispatched to `D`.
    pub fn create_global<D>(&mut self, display: &DisplayHandle) -> Result<()>
    where
        D: GlobalDispatch<WestonGlobalTouch, ()> + 'static,
    {
        self.create(&mut DisplayAdvertiser::<D, WestonGlobalTouch>::new(
            display,
            GLOBAL_TOUCH_VERSION,
        ))
    }

    /// Removes the global and tears down every subscription.
    pub fn destroy_global<D>(&mut self, display: &DisplayHandle) -> Result<usize>
    where
        D: GlobalDispatch<WestonGlobalTouch, ()> + 'static,
    {
        self.destroy(&mut DisplayAdvertiser::<D, WestonGlobalTouch>::new(
            display,
            GLOBAL_TOUCH_VERSION,
        ))
    }
}

impl TouchEventSink for WestonGlobalTouch {
    fn send(&self, event: &WireEvent) {
        match *event {
            WireEvent::Down { time, touch_id, x, y } => {
                self.down(time, touch_id, x.to_f64(), y.to_f64())
            }
            WireEvent::Up { time, touch_id } => self.up(time, touch_id),
            WireEvent::Motion { time, touch_id, x, y } => {
                self.motion(time, touch_id, x.to_f64(), y.to_f64())
            }
            WireEvent::Frame => self.frame(),
            WireEvent::Cancel => self.cancel(),
        }
    }

    fn is_alive(&self) -> bool {
        Resource::is_alive(self)
    }
}

impl<D> GlobalDispatch<WestonGlobalTouch, (), D> for WaylandGlobalTouchState
where
    D: GlobalDispatch<WestonGlobalTouch, ()>
        + Dispatch<WestonGlobalTouch, SubscriptionData>
        + GlobalTouchHandler
        + 'static,
{
    fn bind(
        state: &mut D,
        _handle: &DisplayHandle,
        client: &Client,
        resource: New<WestonGlobalTouch>,
        _global_data: &(),
        data_init: &mut DataInit<'_, D>,
    ) {
        match state.global_touch_state().reserve() {
            Ok(()) => {}
            Err(err @ GlobalTouchError::OutOfMemory(_)) => {
                tracing::warn!(client_id = ?client.id(), error = %err, "Refusing weston_global_touch bind");
                data_init.post_error(resource, wl_display::Error::NoMemory as u32, err.to_string());
                return;
            }
            Err(err) => {
                // The global was bound while being removed. The client gets an inert object.
                tracing::warn!(client_id = ?client.id(), error = %err, "weston_global_touch bound without a capability");
                data_init.init(resource, SubscriptionData::default());
                return;
            }
        }

        let touch = data_init.init(resource, SubscriptionData::default());
        match state.global_touch_state().bind(touch.clone()) {
            Ok(key) => {
                if let Some(data) = touch.data::<SubscriptionData>() {
                    let _ = data.key.set(key);
                }
                tracing::info!(client_id = ?client.id(), resource_id = ?touch.id(), ?key, "Client bound weston_global_touch");
            }
            Err(err) => {
                tracing::warn!(client_id = ?client.id(), error = %err, "Failed to register weston_global_touch subscription");
                touch.post_error(wl_display::Error::NoMemory as u32, err.to_string());
            }
        }
    }
}

impl<D> Dispatch<WestonGlobalTouch, SubscriptionData, D> for WaylandGlobalTouchState
where
    D: Dispatch<WestonGlobalTouch, SubscriptionData> + GlobalTouchHandler + 'static,
{
    fn request(
        state: &mut D,
        client: &Client,
        resource: &WestonGlobalTouch,
        request: <WestonGlobalTouch as Resource>::Request,
        data: &SubscriptionData,
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        let control = match request {
            // Unbinding happens in `destroyed`.
            weston_global_touch::Request::Destroy => return,
            weston_global_touch::Request::Enable => ControlRequest::Enable,
            weston_global_touch::Request::Disable => ControlRequest::Disable,
        };

        let bound = data.key().is_some_and(|key| state.global_touch_state().is_bound(key));
        if !bound {
            tracing::warn!(
                client_id = ?client.id(),
                resource_id = ?resource.id(),
                request = ?control,
                error = %GlobalTouchError::NotFound("weston_global_touch subscription"),
                "Ignoring request on inert weston_global_touch"
            );
            return;
        }
        control::apply(control, state.touchscreen());
    }

    fn destroyed(
        state: &mut D,
        client: ClientId,
        _resource: &WestonGlobalTouch,
        data: &SubscriptionData,
    ) {
        let Some(key) = data.key() else {
            return;
        };
        match state.global_touch_state().unbind(key) {
            Ok(_) => tracing::debug!(client_id = ?client, ?key, "weston_global_touch destroyed"),
            Err(_) => {
                tracing::debug!(client_id = ?client, ?key, "weston_global_touch outlived its capability")
            }
        }
    }
}

/// Implements `GlobalDispatch` and `Dispatch` for `weston_global_touch` on a
/// compositor state type that implements
/// [`GlobalTouchHandler`](crate::protocols::global_touch::GlobalTouchHandler).
#[macro_export]
macro_rules! delegate_global_touch {
    ($ty: ty) => {
        $crate::reexports::wayland_server::delegate_global_dispatch!($ty: [
            $crate::protocols::global_touch::WestonGlobalTouch: ()
        ] => $crate::protocols::global_touch::WaylandGlobalTouchState);
        $crate::reexports::wayland_server::delegate_dispatch!($ty: [
            $crate::protocols::global_touch::WestonGlobalTouch: $crate::protocols::global_touch::SubscriptionData
        ] => $crate::protocols::global_touch::WaylandGlobalTouchState);
    };
}
