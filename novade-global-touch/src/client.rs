//! Client side of `weston_global_touch`, as used by the `novade-global-touch` CLI.
//!
//! [`GlobalTouchClient`] is the `wayland-client` dispatch state: it binds the
//! global when the registry announces it and records (and optionally prints)
//! every event the compositor broadcasts.

use crate::codec::{Fixed, WireEvent};
use crate::protocols::weston_global_touch::client::weston_global_touch::{self, WestonGlobalTouch};
use clap::ValueEnum;
use wayland_client::protocol::wl_registry::{self, WlRegistry};
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle};

/// What the CLI asks of the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Command {
    /// Enable touchscreen input for the whole compositor.
    Enable,
    /// Disable touchscreen input for the whole compositor.
    Disable,
    /// Print every touch event until the connection ends.
    Monitor,
}

/// Dispatch state of a `weston_global_touch` client.
#[derive(Debug, Default)]
pub struct GlobalTouchClient {
    global_touch: Option<WestonGlobalTouch>,
    events: Vec<WireEvent>,
    print: bool,
}

impl GlobalTouchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Like [`Self::new`], but also prints each event to stdout as it arrives.
    pub fn printing() -> Self {
        Self { print: true, ..Self::default() }
    }

    /// The bound object, once the registry has announced the global.
    pub fn global_touch(&self) -> Option<&WestonGlobalTouch> {
        self.global_touch.as_ref()
    }

    pub fn events(&self) -> &[WireEvent] {
        &self.events
    }

    /// Sends `command`'s request, if it has one. `Monitor` has nothing to send.
    /// Returns `false` if the global is not bound.
    pub fn send(&self, command: Command) -> bool {
        let Some(global_touch) = &self.global_touch else {
            return false;
        };
        match command {
            Command::Enable => global_touch.enable(),
            Command::Disable => global_touch.disable(),
            Command::Monitor => {}
        }
        true
    }

    /// Destroys the bound object, if any.
    pub fn release(&mut self) {
        if let Some(global_touch) = self.global_touch.take() {
            global_touch.destroy();
        }
    }
}

/// Maps a received event back onto the crate's wire representation.
pub fn wire_event(event: weston_global_touch::Event) -> WireEvent {
    match event {
        weston_global_touch::Event::Down { time, id, x, y } => WireEvent::Down {
            time,
            touch_id: id,
            x: Fixed::from_f64(x),
            y: Fixed::from_f64(y),
        },
        weston_global_touch::Event::Up { time, id } => WireEvent::Up { time, touch_id: id },
        weston_global_touch::Event::Motion { time, id, x, y } => WireEvent::Motion {
            time,
            touch_id: id,
            x: Fixed::from_f64(x),
            y: Fixed::from_f64(y),
        },
        weston_global_touch::Event::Frame => WireEvent::Frame,
        weston_global_touch::Event::Cancel => WireEvent::Cancel,
    }
}

/// Human-readable rendering used by `monitor`.
pub fn format_event(event: &WireEvent) -> String {
    match *event {
        WireEvent::Down { time, touch_id, x, y } | WireEvent::Motion { time, touch_id, x, y } => {
            format!(
                "{}\n    time: {}\n    touch_id: {}\n    x: {:.6}\n    y: {:.6}",
                event.name(),
                time,
                touch_id,
                x.to_f64(),
                y.to_f64()
            )
        }
        WireEvent::Up { time, touch_id } => {
            format!("up\n    time: {}\n    touch_id: {}", time, touch_id)
        }
        WireEvent::Frame | WireEvent::Cancel => event.name().to_string(),
    }
}

impl Dispatch<WlRegistry, ()> for GlobalTouchClient {
    fn event(
        state: &mut Self,
        registry: &WlRegistry,
        event: wl_registry::Event,
        _data: &(),
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global { name, interface, version } = event {
            if interface == WestonGlobalTouch::interface().name && state.global_touch.is_none() {
                tracing::debug!(name, version, "Binding weston_global_touch");
                state.global_touch =
                    Some(registry.bind::<WestonGlobalTouch, _, _>(name, version.min(1), qh, ()));
            }
        }
    }
}

impl Dispatch<WestonGlobalTouch, ()> for GlobalTouchClient {
    fn event(
        state: &mut Self,
        _proxy: &WestonGlobalTouch,
        event: weston_global_touch::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        let event = wire_event(event);
        if state.print {
            println!("{}", format_event(&event));
        }
        state.events.push(event);
    }
}
