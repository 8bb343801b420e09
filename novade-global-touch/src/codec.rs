//! Conversion of raw touch samples into their wire representation.
//!
//! The input subsystem reports samples with a monotonic [`Duration`] timestamp and
//! floating-point coordinates. Subscribers receive a 32-bit millisecond counter and
//! 24.8 fixed-point coordinates, exactly as `wl_touch` does.

use std::fmt;
use std::time::Duration;

/// Signed 24.8 fixed-point number, the Wayland `fixed` argument type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Self = Self(0);

    /// Converts from `f64`, rounding to the nearest representable value.
    pub fn from_f64(value: f64) -> Self {
        Self((value * 256.0).round() as i32)
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 256.0
    }

    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({})", self.to_f64())
    }
}

impl From<f64> for Fixed {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

/// Converts a monotonic timestamp into the protocol's millisecond counter.
///
/// Sub-millisecond precision is truncated and the counter wraps at 2^32 ms.
pub fn wire_time(time: Duration) -> u32 {
    // u128 -> u32 keeps the low 32 bits, which is the wrap we want.
    time.as_millis() as u32
}

/// The kind of a touch sample. Positions only exist where they are meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchKind {
    Down { x: f64, y: f64 },
    Motion { x: f64, y: f64 },
    Up,
}

/// One contact-point update as produced by the input subsystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchSample {
    /// Monotonic time of the sample.
    pub time: Duration,
    /// Contact identifier, unique among active contacts and reused afterwards.
    pub touch_id: i32,
    pub kind: TouchKind,
}

impl TouchSample {
    pub fn down(time: Duration, touch_id: i32, x: f64, y: f64) -> Self {
        Self { time, touch_id, kind: TouchKind::Down { x, y } }
    }

    pub fn motion(time: Duration, touch_id: i32, x: f64, y: f64) -> Self {
        Self { time, touch_id, kind: TouchKind::Motion { x, y } }
    }

    pub fn up(time: Duration, touch_id: i32) -> Self {
        Self { time, touch_id, kind: TouchKind::Up }
    }
}

/// Everything the input subsystem can hand to the broadcast engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchInput {
    Sample(TouchSample),
    /// Ends a batch of samples.
    Frame,
    /// Invalidates the samples since the last frame.
    Cancel,
}

/// An event in wire form, ready to be sent to a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEvent {
    Down { time: u32, touch_id: i32, x: Fixed, y: Fixed },
    Up { time: u32, touch_id: i32 },
    Motion { time: u32, touch_id: i32, x: Fixed, y: Fixed },
    Frame,
    Cancel,
}

impl WireEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WireEvent::Down { .. } => "down",
            WireEvent::Up { .. } => "up",
            WireEvent::Motion { .. } => "motion",
            WireEvent::Frame => "frame",
            WireEvent::Cancel => "cancel",
        }
    }
}

/// Encodes a sample. Unit conversion is the only transformation applied.
pub fn encode_sample(sample: &TouchSample) -> WireEvent {
    let time = wire_time(sample.time);
    let touch_id = sample.touch_id;
    match sample.kind {
        TouchKind::Down { x, y } => WireEvent::Down {
            time,
            touch_id,
            x: Fixed::from_f64(x),
            y: Fixed::from_f64(y),
        },
        TouchKind::Motion { x, y } => WireEvent::Motion {
            time,
            touch_id,
            x: Fixed::from_f64(x),
            y: Fixed::from_f64(y),
        },
        TouchKind::Up => WireEvent::Up { time, touch_id },
    }
}
