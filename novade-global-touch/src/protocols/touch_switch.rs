//! `weston_touch_switch`: the control-only variant of the extension.
//!
//! Same `enable`/`disable` requests as `weston_global_touch`, no events and no
//! subscription bookkeeping. Bound objects keep working for as long as the
//! client holds them, even after the global has been removed.

use super::DisplayAdvertiser;
use crate::capability::Advertiser;
use crate::control::{self, ControlRequest};
use crate::error::{GlobalTouchError, Result};
use crate::input::TouchscreenHandler;
use wayland_server::backend::GlobalId;
use wayland_server::{Client, DataInit, Dispatch, DisplayHandle, GlobalDispatch, New, Resource};

pub use super::weston_touch_switch::server::weston_touch_switch::{self, WestonTouchSwitch};

pub const TOUCH_SWITCH_VERSION: u32 = 1;

const TOUCH_SWITCH: &str = "weston_touch_switch";

/// Holder of the (at most one) touch switch advertisement.
#[derive(Debug)]
pub struct TouchSwitchState<H = GlobalId> {
    advertisement: Option<H>,
}

impl<H> Default for TouchSwitchState<H> {
    fn default() -> Self {
        Self { advertisement: None }
    }
}

impl<H> TouchSwitchState<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// [`GlobalTouchError::AlreadyExists`] if the switch is already advertised,
    /// or whatever the advertiser reports.
    pub fn create<A>(&mut self, advertiser: &mut A) -> Result<()>
    where
        A: Advertiser<Handle = H>,
    {
        if self.advertisement.is_some() {
            return Err(GlobalTouchError::AlreadyExists(TOUCH_SWITCH));
        }
        self.advertisement = Some(advertiser.publish()?);
        tracing::info!("Touch switch created");
        Ok(())
    }

    /// # Errors
    ///
    /// [`GlobalTouchError::NotFound`] if the switch was never created.
    pub fn destroy<A>(&mut self, advertiser: &mut A) -> Result<()>
    where
        A: Advertiser<Handle = H>,
    {
        let advertisement = self
            .advertisement
            .take()
            .ok_or(GlobalTouchError::NotFound(TOUCH_SWITCH))?;
        advertiser.revoke(advertisement);
        tracing::info!("Touch switch destroyed");
        Ok(())
    }

    pub fn is_created(&self) -> bool {
        self.advertisement.is_some()
    }
}

impl TouchSwitchState<GlobalId> {
    pub fn create_global<D>(&mut self, display: &DisplayHandle) -> Result<()>
    where
        D: GlobalDispatch<WestonTouchSwitch, ()> + 'static,
    {
        self.create(&mut DisplayAdvertiser::<D, WestonTouchSwitch>::new(
            display,
            TOUCH_SWITCH_VERSION,
        ))
    }

    pub fn destroy_global<D>(&mut self, display: &DisplayHandle) -> Result<()>
    where
        D: GlobalDispatch<WestonTouchSwitch, ()> + 'static,
    {
        self.destroy(&mut DisplayAdvertiser::<D, WestonTouchSwitch>::new(
            display,
            TOUCH_SWITCH_VERSION,
        ))
    }
}

/// Compositor state that hosts the touch switch.
pub trait TouchSwitchHandler: TouchscreenHandler {
    fn touch_switch_state(&mut self) -> &mut TouchSwitchState;
}

impl<D> GlobalDispatch<WestonTouchSwitch, (), D> for TouchSwitchState
where
    D: GlobalDispatch<WestonTouchSwitch, ()>
        + Dispatch<WestonTouchSwitch, ()>
        + TouchSwitchHandler
        + 'static,
{
    fn bind(
        _state: &mut D,
        _handle: &DisplayHandle,
        client: &Client,
        resource: New<WestonTouchSwitch>,
        _global_data: &(),
        data_init: &mut DataInit<'_, D>,
    ) {
        let resource = data_init.init(resource, ());
        tracing::info!(client_id = ?client.id(), resource_id = ?resource.id(), "Client bound weston_touch_switch");
    }
}

impl<D> Dispatch<WestonTouchSwitch, (), D> for TouchSwitchState
where
    D: Dispatch<WestonTouchSwitch, ()> + TouchSwitchHandler + 'static,
{
    fn request(
        state: &mut D,
        _client: &Client,
        _resource: &WestonTouchSwitch,
        request: <WestonTouchSwitch as Resource>::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            weston_touch_switch::Request::Destroy => {}
            weston_touch_switch::Request::Enable => control::apply(ControlRequest::Enable, state.touchscreen()),
            weston_touch_switch::Request::Disable => control::apply(ControlRequest::Disable, state.touchscreen()),
        }
    }
}

/// Implements `GlobalDispatch` and `Dispatch` for `weston_touch_switch` on a
/// compositor state type that implements
/// [`TouchSwitchHandler`](crate::protocols::touch_switch::TouchSwitchHandler).
#[macro_export]
macro_rules! delegate_touch_switch {
    ($ty: ty) => {
        $crate::reexports::wayland_server::delegate_global_dispatch!($ty: [
            $crate::protocols::touch_switch::WestonTouchSwitch: ()
        ] => $crate::protocols::touch_switch::TouchSwitchState);
        $crate::reexports::wayland_server::delegate_dispatch!($ty: [
            $crate::protocols::touch_switch::WestonTouchSwitch: ()
        ] => $crate::protocols::touch_switch::TouchSwitchState);
    };
}
