//! Fakes shared by the unit tests.

use crate::broadcast::TouchEventSink;
use crate::capability::Advertiser;
use crate::codec::WireEvent;
use crate::error::{GlobalTouchError, Result};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Advertiser that hands out increasing numbers and counts live ones.
#[derive(Debug, Default)]
pub(crate) struct FakeAdvertiser {
    next: u32,
    live: usize,
    fail: bool,
}

impl FakeAdvertiser {
    pub(crate) fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub(crate) fn live(&self) -> usize {
        self.live
    }
}

impl Advertiser for FakeAdvertiser {
    type Handle = u32;

    fn publish(&mut self) -> Result<u32> {
        if self.fail {
            return Err(GlobalTouchError::OutOfMemory("weston_global_touch"));
        }
        self.next += 1;
        self.live += 1;
        Ok(self.next)
    }

    fn revoke(&mut self, _handle: u32) {
        self.live -= 1;
    }
}

/// Sink that records what it was sent. Clones share the same log, so a test can
/// keep a handle after the subscription has been moved into the registry.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSink {
    events: Rc<RefCell<Vec<WireEvent>>>,
    dead: Rc<Cell<bool>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<WireEvent> {
        self.events.borrow().clone()
    }

    pub(crate) fn kill(&self) {
        self.dead.set(true);
    }
}

impl TouchEventSink for RecordingSink {
    fn send(&self, event: &WireEvent) {
        self.events.borrow_mut().push(*event);
    }

    fn is_alive(&self) -> bool {
        !self.dead.get()
    }
}
