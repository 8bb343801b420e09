//! Wayland side of the extension.
//!
//! Bindings for `protocols/weston-global-touch.xml` and
//! `protocols/weston-touch-switch.xml` are generated at compile time with
//! `wayland-scanner`, for both the server (compositor) and the client (CLI) side.
//! [`global_touch`] and [`touch_switch`] hold the dispatch implementations that
//! connect the generated server objects to the crate's core state.

use crate::capability::Advertiser;
use crate::error::Result;
use std::marker::PhantomData;
use wayland_server::backend::GlobalId;
use wayland_server::{DisplayHandle, GlobalDispatch, Resource};

pub mod global_touch;
pub mod touch_switch;

/// Generated bindings for `weston_global_touch`.
pub mod weston_global_touch {
    /// Compositor side.
    pub mod server {
        #![allow(dead_code, non_camel_case_types, unused_unsafe, unused_variables)]
        #![allow(non_upper_case_globals, non_snake_case, unused_imports)]

        use wayland_server;
        use wayland_server::protocol::*;

        pub mod __interfaces {
            use wayland_server::protocol::__interfaces::*;
            wayland_scanner::generate_interfaces!("protocols/weston-global-touch.xml");
        }
        use self::__interfaces::*;

        wayland_scanner::generate_server_code!("protocols/weston-global-touch.xml");
    }

    /// Client side.
    pub mod client {
        #![allow(dead_code, non_camel_case_types, unused_unsafe, unused_variables)]
        #![allow(non_upper_case_globals, non_snake_case, unused_imports)]

        use wayland_client;
        use wayland_client::protocol::*;

        pub mod __interfaces {
            use wayland_client::protocol::__interfaces::*;
            wayland_scanner::generate_interfaces!("protocols/weston-global-touch.xml");
        }
        use self::__interfaces::*;

        wayland_scanner::generate_client_code!("protocols/weston-global-touch.xml");
    }
}

/// Generated bindings for `weston_touch_switch`.
pub mod weston_touch_switch {
    /// Compositor side.
    pub mod server {
        #![allow(dead_code, non_camel_case_types, unused_unsafe, unused_variables)]
        #![allow(non_upper_case_globals, non_snake_case, unused_imports)]

        use wayland_server;
        use wayland_server::protocol::*;

        pub mod __interfaces {
            use wayland_server::protocol::__interfaces::*;
            wayland_scanner::generate_interfaces!("protocols/weston-touch-switch.xml");
        }
        use self::__interfaces::*;

        wayland_scanner::generate_server_code!("protocols/weston-touch-switch.xml");
    }

    /// Client side.
    pub mod client {
        #![allow(dead_code, non_camel_case_types, unused_unsafe, unused_variables)]
        #![allow(non_upper_case_globals, non_snake_case, unused_imports)]

        use wayland_client;
        use wayland_client::protocol::*;

        pub mod __interfaces {
            use wayland_client::protocol::__interfaces::*;
            wayland_scanner::generate_interfaces!("protocols/weston-touch-switch.xml");
        }
        use self::__interfaces::*;

        wayland_scanner::generate_client_code!("protocols/weston-touch-switch.xml");
    }
}

/// Publishes an interface `I` as a global on a [`DisplayHandle`].
///
/// `D` is the compositor state type the global dispatches to.
pub struct DisplayAdvertiser<'a, D, I> {
    handle: &'a DisplayHandle,
    version: u32,
    _marker: PhantomData<fn() -> (D, I)>,
}

impl<'a, D, I> DisplayAdvertiser<'a, D, I> {
    pub fn new(handle: &'a DisplayHandle, version: u32) -> Self {
        Self { handle, version, _marker: PhantomData }
    }
}

impl<D, I> Advertiser for DisplayAdvertiser<'_, D, I>
where
    D: GlobalDispatch<I, ()> + 'static,
    I: Resource + 'static,
{
    type Handle = GlobalId;

    fn publish(&mut self) -> Result<GlobalId> {
        let id = self.handle.create_global::<D, I, ()>(self.version, ());
        tracing::debug!(interface = I::interface().name, global = ?id, "Global published");
        Ok(id)
    }

    fn revoke(&mut self, handle: GlobalId) {
        tracing::debug!(interface = I::interface().name, global = ?handle, "Global removed");
        self.handle.remove_global::<D>(handle);
    }
}
