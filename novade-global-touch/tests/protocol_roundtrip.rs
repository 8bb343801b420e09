//! End-to-end tests over a real Wayland connection.
//!
//! A `wayland-server` display and `wayland-client` connections are joined by
//! socket pairs inside the test process. Both sides are pumped by hand, so
//! every test is single-threaded and deterministic.

use novade_global_touch::client::{Command, GlobalTouchClient};
use novade_global_touch::input::{TouchscreenControl, TouchscreenHandler, TouchscreenSwitch};
use novade_global_touch::protocols::weston_touch_switch::client::weston_touch_switch::{
    self, WestonTouchSwitch,
};
use novade_global_touch::{
    delegate_global_touch, delegate_touch_switch, Fixed, GlobalTouchError, GlobalTouchHandler,
    TouchInput, TouchSample, TouchSwitchHandler, TouchSwitchState, WaylandGlobalTouchState,
    WireEvent,
};
use pretty_assertions::assert_eq;
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::time::Duration;
use wayland_client::protocol::wl_registry::{self, WlRegistry};
use wayland_client::{Connection, Dispatch, EventQueue, Proxy, QueueHandle};
use wayland_server::backend::ClientData;
use wayland_server::Display;

struct ServerState {
    global_touch: WaylandGlobalTouchState,
    touch_switch: TouchSwitchState,
    touchscreen: TouchscreenSwitch,
}

impl TouchscreenHandler for ServerState {
    fn touchscreen(&mut self) -> &mut dyn TouchscreenControl {
        &mut self.touchscreen
    }
}

impl GlobalTouchHandler for ServerState {
    fn global_touch_state(&mut self) -> &mut WaylandGlobalTouchState {
        &mut self.global_touch
    }
}

impl TouchSwitchHandler for ServerState {
    fn touch_switch_state(&mut self) -> &mut TouchSwitchState {
        &mut self.touch_switch
    }
}

delegate_global_touch!(ServerState);
delegate_touch_switch!(ServerState);

struct NoopClientData;

impl ClientData for NoopClientData {}

struct Server {
    display: Display<ServerState>,
    state: ServerState,
}

impl Server {
    fn new(max_subscriptions: Option<usize>) -> Self {
        Self {
            display: Display::new().unwrap(),
            state: ServerState {
                global_touch: WaylandGlobalTouchState::new(max_subscriptions),
                touch_switch: TouchSwitchState::new(),
                touchscreen: TouchscreenSwitch::new(true),
            },
        }
    }

    fn create_global_touch(&mut self) -> Result<(), GlobalTouchError> {
        let handle = self.display.handle();
        self.state.global_touch.create_global::<ServerState>(&handle)
    }

    fn destroy_global_touch(&mut self) -> Result<usize, GlobalTouchError> {
        let handle = self.display.handle();
        self.state.global_touch.destroy_global::<ServerState>(&handle)
    }

    fn connect<A>(&mut self, app: A) -> TestClient<A>
    where
        A: Dispatch<WlRegistry, ()> + 'static,
    {
        let (server_side, client_side) = UnixStream::pair().unwrap();
        self.display
            .handle()
            .insert_client(server_side, Arc::new(NoopClientData))
            .unwrap();
        let conn = Connection::from_socket(client_side).unwrap();
        let queue = conn.new_event_queue();
        let _registry = conn.display().get_registry(&queue.handle(), ());
        TestClient { conn, queue, app }
    }

    fn dispatch(&mut self) {
        self.display.dispatch_clients(&mut self.state).unwrap();
        let _ = self.display.flush_clients();
    }
}

struct TestClient<A: 'static> {
    conn: Connection,
    queue: EventQueue<A>,
    app: A,
}

impl<A: 'static> TestClient<A> {
    /// Exchanges messages until both sides are idle (or the client died).
    fn sync(&mut self, server: &mut Server) {
        for _ in 0..3 {
            let _ = self.conn.flush();
            server.dispatch();
            if let Some(guard) = self.queue.prepare_read() {
                let _ = guard.read();
            }
            if self.queue.dispatch_pending(&mut self.app).is_err() {
                server.dispatch();
                return;
            }
        }
    }
}

#[derive(Default)]
struct SwitchClient {
    switch: Option<WestonTouchSwitch>,
}

impl Dispatch<WlRegistry, ()> for SwitchClient {
    fn event(
        state: &mut Self,
        registry: &WlRegistry,
        event: wl_registry::Event,
        _data: &(),
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global { name, interface, .. } = event {
            if interface == WestonTouchSwitch::interface().name {
                state.switch = Some(registry.bind::<WestonTouchSwitch, _, _>(name, 1, qh, ()));
            }
        }
    }
}

impl Dispatch<WestonTouchSwitch, ()> for SwitchClient {
    fn event(
        _state: &mut Self,
        _proxy: &WestonTouchSwitch,
        _event: weston_touch_switch::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
    }
}

fn bound_client(server: &mut Server) -> TestClient<GlobalTouchClient> {
    let mut client = server.connect(GlobalTouchClient::new());
    client.sync(server);
    assert!(client.app.global_touch().is_some(), "client should have bound the global");
    client
}

#[test]
fn subscribe_touch_frame_unsubscribe() {
    let mut server = Server::new(None);
    server.create_global_touch().unwrap();
    let mut client = bound_client(&mut server);
    assert_eq!(server.state.global_touch.subscription_count(), 1);

    server
        .state
        .global_touch
        .deliver(TouchInput::Sample(TouchSample::down(Duration::from_millis(100), 7, 0.25, 0.75)));
    server.state.global_touch.deliver(TouchInput::Frame);
    client.sync(&mut server);

    assert_eq!(
        client.app.events(),
        &[
            WireEvent::Down {
                time: 100,
                touch_id: 7,
                x: Fixed::from_f64(0.25),
                y: Fixed::from_f64(0.75),
            },
            WireEvent::Frame,
        ]
    );

    client.app.release();
    client.sync(&mut server);
    assert_eq!(server.state.global_touch.subscription_count(), 0);

    let delivered = server
        .state
        .global_touch
        .deliver(TouchInput::Sample(TouchSample::up(Duration::from_millis(150), 7)));
    client.sync(&mut server);
    assert_eq!(delivered, 0);
    assert_eq!(client.app.events().len(), 2);
}

#[test]
fn every_subscriber_sees_the_same_sequence() {
    let mut server = Server::new(None);
    server.create_global_touch().unwrap();
    let mut first = bound_client(&mut server);
    let mut second = bound_client(&mut server);
    assert_eq!(server.state.global_touch.subscription_count(), 2);

    let inputs = [
        TouchInput::Sample(TouchSample::down(Duration::from_millis(1), 0, 1.0, 2.0)),
        TouchInput::Sample(TouchSample::motion(Duration::from_millis(2), 0, 1.5, 2.5)),
        TouchInput::Frame,
        TouchInput::Sample(TouchSample::up(Duration::from_millis(3), 0)),
        TouchInput::Cancel,
    ];
    for input in inputs {
        assert_eq!(server.state.global_touch.deliver(input), 2);
    }
    first.sync(&mut server);
    second.sync(&mut server);

    let names: Vec<_> = first.app.events().iter().map(WireEvent::name).collect();
    assert_eq!(names, vec!["down", "motion", "frame", "up", "cancel"]);
    assert_eq!(first.app.events(), second.app.events());
}

#[test]
fn enable_and_disable_switch_the_touchscreen() {
    let mut server = Server::new(None);
    server.create_global_touch().unwrap();
    let mut client = bound_client(&mut server);

    assert!(client.app.send(Command::Disable));
    client.sync(&mut server);
    assert!(!server.state.touchscreen.touchscreen_enabled());

    assert!(client.app.send(Command::Disable));
    client.sync(&mut server);
    assert!(!server.state.touchscreen.touchscreen_enabled());

    assert!(client.app.send(Command::Enable));
    client.sync(&mut server);
    assert!(server.state.touchscreen.touchscreen_enabled());
    assert_eq!(server.state.touchscreen.changes(), 2);
}

#[test]
fn client_disconnect_unbinds() {
    let mut server = Server::new(None);
    server.create_global_touch().unwrap();
    let client = bound_client(&mut server);
    let _other = bound_client(&mut server);
    assert_eq!(server.state.global_touch.subscription_count(), 2);

    drop(client);
    server.dispatch();
    server.dispatch();
    assert_eq!(server.state.global_touch.subscription_count(), 1);
}

#[test]
fn destroy_tears_down_and_leaves_inert_objects() {
    let mut server = Server::new(None);
    server.create_global_touch().unwrap();
    let mut client = bound_client(&mut server);

    assert!(matches!(
        server.create_global_touch(),
        Err(GlobalTouchError::AlreadyExists(_))
    ));
    assert_eq!(server.destroy_global_touch().unwrap(), 1);
    assert!(matches!(
        server.destroy_global_touch(),
        Err(GlobalTouchError::NotFound(_))
    ));
    assert_eq!(
        server.state.global_touch.deliver(TouchInput::Frame),
        0
    );

    // The client still holds its object; requests on it are ignored.
    assert!(client.app.send(Command::Disable));
    client.sync(&mut server);
    assert!(server.state.touchscreen.touchscreen_enabled());

    client.app.release();
    client.sync(&mut server);
    assert_eq!(server.state.global_touch.subscription_count(), 0);
}

#[test]
fn recreated_capability_accepts_new_subscriptions() {
    let mut server = Server::new(None);
    server.create_global_touch().unwrap();
    let mut client = bound_client(&mut server);
    client.app.release();
    server.destroy_global_touch().unwrap();
    client.sync(&mut server);

    server.create_global_touch().unwrap();
    client.sync(&mut server);
    assert!(client.app.global_touch().is_some());
    assert_eq!(server.state.global_touch.subscription_count(), 1);

    server.state.global_touch.deliver(TouchInput::Cancel);
    client.sync(&mut server);
    assert_eq!(client.app.events(), &[WireEvent::Cancel]);
}

#[test]
fn bind_beyond_capacity_is_no_memory() {
    let mut server = Server::new(Some(1));
    server.create_global_touch().unwrap();
    let _first = bound_client(&mut server);

    let mut second = server.connect(GlobalTouchClient::new());
    second.sync(&mut server);

    let error = second.conn.protocol_error().expect("bind should have failed");
    assert_eq!(error.code, wayland_client::protocol::wl_display::Error::NoMemory as u32);
    assert_eq!(server.state.global_touch.subscription_count(), 1);
}

#[test]
fn touch_switch_controls_touchscreen() {
    let mut server = Server::new(None);
    let handle = server.display.handle();
    server.state.touch_switch.create_global::<ServerState>(&handle).unwrap();
    assert!(matches!(
        server.state.touch_switch.create_global::<ServerState>(&handle),
        Err(GlobalTouchError::AlreadyExists(_))
    ));

    let mut client = server.connect(SwitchClient::default());
    client.sync(&mut server);
    let switch = client.app.switch.clone().expect("client should have bound the switch");

    switch.disable();
    client.sync(&mut server);
    assert!(!server.state.touchscreen.touchscreen_enabled());

    server.state.touch_switch.destroy_global::<ServerState>(&handle).unwrap();
    switch.enable();
    client.sync(&mut server);
    assert!(server.state.touchscreen.touchscreen_enabled());

    switch.destroy();
    client.sync(&mut server);
}
