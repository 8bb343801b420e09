//! `novade-global-touchd`: headless Wayland host for the global touch extension.
//!
//! Listens on an automatically named Wayland socket and serves only
//! `weston_global_touch` (and, if configured, `weston_touch_switch`). Built with
//! `backend_libinput`, it reads the seat's touch devices and broadcasts their
//! events; otherwise the touchscreen switch is purely in-memory.

use anyhow::{Context, Result};
use clap::Parser;
use novade_global_touch::config::{ConfigLoader, GlobalTouchConfig};
use novade_global_touch::input::{TouchscreenControl, TouchscreenHandler};
use novade_global_touch::logging;
use novade_global_touch::{
    delegate_global_touch, delegate_touch_switch, GlobalTouchHandler, TouchSwitchHandler,
    TouchSwitchState, WaylandGlobalTouchState,
};
use smithay::reexports::calloop::generic::Generic;
use smithay::reexports::calloop::signals::{Signal, Signals};
use smithay::reexports::calloop::{EventLoop, Interest, LoopSignal, Mode, PostAction};
use smithay::reexports::wayland_server::backend::{ClientData, ClientId, DisconnectReason};
use smithay::reexports::wayland_server::{Display, DisplayHandle};
use smithay::wayland::socket::ListeningSocketSource;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[cfg(feature = "backend_libinput")]
type Touchscreen = novade_global_touch::input::LibinputTouchBackend;
#[cfg(not(feature = "backend_libinput"))]
type Touchscreen = novade_global_touch::input::TouchscreenSwitch;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless host for the weston_global_touch extension")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the default configuration and exit.
    #[arg(long)]
    gen_config: bool,
}

struct Daemon {
    display_handle: DisplayHandle,
    loop_signal: LoopSignal,
    global_touch: WaylandGlobalTouchState,
    touch_switch: TouchSwitchState,
    touchscreen: Touchscreen,
}

impl TouchscreenHandler for Daemon {
    fn touchscreen(&mut self) -> &mut dyn TouchscreenControl {
        &mut self.touchscreen
    }
}

impl GlobalTouchHandler for Daemon {
    fn global_touch_state(&mut self) -> &mut WaylandGlobalTouchState {
        &mut self.global_touch
    }
}

impl TouchSwitchHandler for Daemon {
    fn touch_switch_state(&mut self) -> &mut TouchSwitchState {
        &mut self.touch_switch
    }
}

delegate_global_touch!(Daemon);
delegate_touch_switch!(Daemon);

struct ClientState;

impl ClientData for ClientState {
    fn initialized(&self, client_id: ClientId) {
        info!(?client_id, "Client connected");
    }

    fn disconnected(&self, client_id: ClientId, reason: DisconnectReason) {
        info!(?client_id, ?reason, "Client disconnected");
    }
}

#[cfg(feature = "backend_libinput")]
fn init_touchscreen(config: &GlobalTouchConfig) -> Result<Touchscreen> {
    Ok(Touchscreen::new(&config.input.seat, config.input.touchscreen_enabled)?)
}

#[cfg(not(feature = "backend_libinput"))]
fn init_touchscreen(config: &GlobalTouchConfig) -> Result<Touchscreen> {
    Ok(Touchscreen::new(config.input.touchscreen_enabled))
}

#[cfg(feature = "backend_libinput")]
fn register_input_source(
    event_loop: &EventLoop<'static, Daemon>,
    touchscreen: &Touchscreen,
) -> Result<()> {
    event_loop
        .handle()
        .insert_source(
            Generic::new(touchscreen.event_source(), Interest::READ, Mode::Level),
            |_, _, state: &mut Daemon| {
                let Daemon { touchscreen, global_touch, .. } = state;
                if let Err(err) = touchscreen.dispatch(|input| {
                    global_touch.deliver(input);
                }) {
                    warn!(error = %err, "Failed to read touch input");
                }
                Ok(PostAction::Continue)
            },
        )
        .map_err(|e| e.error)?;
    Ok(())
}

#[cfg(not(feature = "backend_libinput"))]
fn register_input_source(
    _event_loop: &EventLoop<'static, Daemon>,
    _touchscreen: &Touchscreen,
) -> Result<()> {
    info!("Built without backend_libinput, no touch devices will be read");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.gen_config {
        print!("{}", GlobalTouchConfig::default().to_toml_string()?);
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => ConfigLoader::load_from_path(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => GlobalTouchConfig::default(),
    };
    if let Err(err) = logging::init_logging(&config.logging) {
        logging::init_minimal_logging();
        warn!(error = %err, "Falling back to minimal logging");
    }

    let mut event_loop: EventLoop<'static, Daemon> =
        EventLoop::try_new().context("failed to create event loop")?;
    let display: Display<Daemon> = Display::new().context("failed to create Wayland display")?;
    let display_handle = display.handle();

    let mut state = Daemon {
        display_handle: display_handle.clone(),
        loop_signal: event_loop.get_signal(),
        global_touch: WaylandGlobalTouchState::new(config.global_touch.max_subscriptions),
        touch_switch: TouchSwitchState::new(),
        touchscreen: init_touchscreen(&config)?,
    };

    if config.global_touch.enabled {
        state.global_touch.create_global::<Daemon>(&display_handle)?;
    }
    if config.touch_switch.enabled {
        state.touch_switch.create_global::<Daemon>(&display_handle)?;
    }

    let listening_socket =
        ListeningSocketSource::new_auto().context("failed to bind a Wayland socket")?;
    let socket_name = listening_socket.socket_name().to_os_string();
    let handle = event_loop.handle();

    handle
        .insert_source(listening_socket, |client_stream, _, state: &mut Daemon| {
            if let Err(e) = state
                .display_handle
                .insert_client(client_stream, Arc::new(ClientState))
            {
                warn!("Error adding wayland client: {}", e);
            }
        })
        .map_err(|e| e.error)?;

    handle
        .insert_source(
            Generic::new(display, Interest::READ, Mode::Level),
            |_, display, state: &mut Daemon| {
                // SAFETY: the display is never dropped or replaced from here.
                unsafe {
                    display.get_mut().dispatch_clients(state)?;
                }
                Ok(PostAction::Continue)
            },
        )
        .map_err(|e| e.error)?;

    handle
        .insert_source(
            Signals::new(&[Signal::SIGINT, Signal::SIGTERM])?,
            |event, _, state: &mut Daemon| {
                info!(signal = ?event.signal(), "Shutting down");
                state.loop_signal.stop();
            },
        )
        .map_err(|e| e.error)?;

    register_input_source(&event_loop, &state.touchscreen)?;

    info!(socket = ?socket_name, "Listening on Wayland socket");

    event_loop
        .run(None, &mut state, |state| {
            if let Err(e) = state.display_handle.flush_clients() {
                error!("Error flushing Wayland clients: {}", e);
            }
        })
        .context("event loop failed")?;

    if state.global_touch.is_created() {
        let torn_down = state.global_touch.destroy_global::<Daemon>(&display_handle)?;
        info!(subscriptions = torn_down, "Global touch capability released");
    }
    if state.touch_switch.is_created() {
        state.touch_switch.destroy_global::<Daemon>(&display_handle)?;
    }
    let _ = state.display_handle.flush_clients();
    Ok(())
}
