//! libinput-driven touch input for hosts that own the input devices.
//!
//! [`LibinputTouchBackend`] tracks every device with the touch capability on one
//! udev seat. It implements [`TouchscreenControl`] by switching those devices'
//! send-events mode, and turns libinput touch events into [`TouchInput`] values
//! for the broadcast engine. Coordinates are normalized to `0.0..=1.0` of the
//! device's extent.

use super::TouchscreenControl;
use crate::codec::{TouchInput, TouchSample};
use crate::error::{GlobalTouchError, Result};
use input::event::device::DeviceEvent;
use input::event::touch::{TouchEvent, TouchEventPosition, TouchEventSlot, TouchEventTrait};
use input::event::EventTrait;
use input::{Device, DeviceCapability, Event, Libinput, LibinputInterface, SendEventsMode};
use std::fs::{File, OpenOptions};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

struct DeviceInterface;

impl LibinputInterface for DeviceInterface {
    fn open_restricted(&mut self, path: &Path, flags: i32) -> std::result::Result<OwnedFd, i32> {
        let access = flags & libc::O_ACCMODE;
        OpenOptions::new()
            .custom_flags(flags)
            .read(access == libc::O_RDONLY || access == libc::O_RDWR)
            .write(access == libc::O_WRONLY || access == libc::O_RDWR)
            .open(path)
            .map(OwnedFd::from)
            .map_err(|err| {
                error!("Failed to open device {:?}: {}", path, err);
                err.raw_os_error().unwrap_or(libc::EIO)
            })
    }

    fn close_restricted(&mut self, fd: OwnedFd) {
        drop(File::from(fd));
    }
}

/// Readiness handle for an event loop. Shares the libinput context with the
/// backend it was taken from.
#[derive(Clone)]
pub struct LibinputFd(Libinput);

impl AsFd for LibinputFd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        // SAFETY: the descriptor belongs to the libinput context, which lives at
        // least as long as `self`.
        unsafe { BorrowedFd::borrow_raw(self.0.as_raw_fd()) }
    }
}

pub struct LibinputTouchBackend {
    context: Libinput,
    touch_devices: Vec<Device>,
    enabled: bool,
}

impl std::fmt::Debug for LibinputTouchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibinputTouchBackend")
            .field("touch_devices", &self.touch_devices.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl LibinputTouchBackend {
    /// Creates a udev-backed context assigned to `seat`.
    ///
    /// `enabled` is the initial touchscreen state applied to devices as they appear.
    pub fn new(seat: &str, enabled: bool) -> Result<Self> {
        info!(seat, "Initializing libinput touch backend");
        let mut context = Libinput::new_with_udev(DeviceInterface);
        context.udev_assign_seat(seat).map_err(|()| {
            GlobalTouchError::Input(format!("Failed to assign libinput context to seat '{}'", seat))
        })?;
        Ok(Self { context, touch_devices: Vec::new(), enabled })
    }

    pub fn event_source(&self) -> LibinputFd {
        LibinputFd(self.context.clone())
    }

    pub fn touch_device_count(&self) -> usize {
        self.touch_devices.len()
    }

    /// Reads pending libinput events. Touch events are handed to `sink` in the
    /// order libinput reported them; device hotplug updates the tracked set.
    pub fn dispatch<F>(&mut self, mut sink: F) -> Result<()>
    where
        F: FnMut(TouchInput),
    {
        self.context
            .dispatch()
            .map_err(|e| GlobalTouchError::Input(format!("libinput dispatch failed: {}", e)))?;

        while let Some(event) = self.context.next() {
            match event {
                Event::Device(DeviceEvent::Added(added)) => self.device_added(added.device()),
                Event::Device(DeviceEvent::Removed(removed)) => {
                    let device = removed.device();
                    self.touch_devices.retain(|d| d != &device);
                }
                Event::Touch(touch) => {
                    if let Some(input) = convert_touch(touch) {
                        sink(input);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn device_added(&mut self, mut device: Device) {
        if !device.has_capability(DeviceCapability::Touch) {
            return;
        }
        info!(name = device.name(), "Touch device added");
        apply_mode(&mut device, self.enabled);
        self.touch_devices.push(device);
    }
}

fn apply_mode(device: &mut Device, enabled: bool) {
    let mode = if enabled { SendEventsMode::ENABLED } else { SendEventsMode::DISABLED };
    if let Err(err) = device.config_send_events_set_mode(mode) {
        warn!(name = device.name(), ?err, enabled, "Failed to set send-events mode");
    }
}

fn convert_touch(event: TouchEvent) -> Option<TouchInput> {
    let input = match event {
        TouchEvent::Down(down) => TouchInput::Sample(TouchSample::down(
            Duration::from_micros(down.time_usec()),
            down.seat_slot() as i32,
            down.x_transformed(1),
            down.y_transformed(1),
        )),
        TouchEvent::Motion(motion) => TouchInput::Sample(TouchSample::motion(
            Duration::from_micros(motion.time_usec()),
            motion.seat_slot() as i32,
            motion.x_transformed(1),
            motion.y_transformed(1),
        )),
        TouchEvent::Up(up) => TouchInput::Sample(TouchSample::up(
            Duration::from_micros(up.time_usec()),
            up.seat_slot() as i32,
        )),
        TouchEvent::Frame(_) => TouchInput::Frame,
        TouchEvent::Cancel(_) => TouchInput::Cancel,
        other => {
            debug!("Ignoring touch event: {:?}", other);
            return None;
        }
    };
    Some(input)
}

impl TouchscreenControl for LibinputTouchBackend {
    fn set_touchscreen_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        for device in &mut self.touch_devices {
            apply_mode(device, enabled);
        }
        info!(enabled, devices = self.touch_devices.len(), "Touchscreen state changed");
    }

    fn touchscreen_enabled(&self) -> bool {
        self.enabled
    }
}
