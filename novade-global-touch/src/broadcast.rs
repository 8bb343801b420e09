//! Fan-out of touch input to every live subscription.
//!
//! Called inline from the input subsystem's notification path, on the event-loop
//! thread. Every input produces exactly one pass over the registry: no filtering,
//! batching or coalescing. The pass holds a shared borrow of the registry, so it
//! cannot observe a subscription being removed; disconnects triggered by an event
//! are processed by the event loop once the pass has returned.

use crate::capability::GlobalTouchState;
use crate::codec::{encode_sample, TouchInput, TouchSample, WireEvent};
use tracing::trace;

/// Receiver of broadcast events, one per subscription.
pub trait TouchEventSink {
    fn send(&self, event: &WireEvent);

    /// Dead sinks are skipped by the broadcast pass.
    fn is_alive(&self) -> bool {
        true
    }
}

impl<S, H> GlobalTouchState<S, H>
where
    S: TouchEventSink,
{
    /// Delivers whatever the input subsystem produced. Returns the number of
    /// subscriptions that received it.
    pub fn deliver(&self, input: TouchInput) -> usize {
        match input {
            TouchInput::Sample(sample) => self.deliver_sample(&sample),
            TouchInput::Frame => self.deliver_frame(),
            TouchInput::Cancel => self.deliver_cancel(),
        }
    }

    /// Converts `sample` and sends it to every subscription in bind order.
    /// A no-op without a capability or without subscriptions.
    pub fn deliver_sample(&self, sample: &TouchSample) -> usize {
        if self.subscription_count() == 0 {
            return 0;
        }
        self.broadcast(&encode_sample(sample))
    }

    /// Marks the end of a consistent batch of samples.
    pub fn deliver_frame(&self) -> usize {
        self.broadcast(&WireEvent::Frame)
    }

    /// Tells subscribers to discard the samples since the last frame.
    pub fn deliver_cancel(&self) -> usize {
        self.broadcast(&WireEvent::Cancel)
    }

    fn broadcast(&self, event: &WireEvent) -> usize {
        let Some(registry) = self.subscriptions() else {
            return 0;
        };
        let mut delivered = 0;
        for (_key, sink) in registry.iter() {
            if !sink.is_alive() {
                continue;
            }
            sink.send(event);
            delivered += 1;
        }
        trace!(event = event.name(), subscriptions = delivered, "Broadcast touch event");
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Fixed;
    use crate::test_support::{FakeAdvertiser, RecordingSink};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    type State = GlobalTouchState<RecordingSink, u32>;

    fn created() -> (State, FakeAdvertiser) {
        let mut adv = FakeAdvertiser::default();
        let mut state = State::default();
        state.create(&mut adv).unwrap();
        (state, adv)
    }

    #[test]
    fn no_capability_is_a_no_op() {
        let state = State::default();
        assert_eq!(state.deliver_sample(&TouchSample::up(Duration::ZERO, 1)), 0);
        assert_eq!(state.deliver_frame(), 0);
        assert_eq!(state.deliver_cancel(), 0);
    }

    #[test]
    fn no_subscriptions_is_a_no_op() {
        let (state, _adv) = created();
        assert_eq!(state.deliver(TouchInput::Frame), 0);
    }

    #[test]
    fn fan_out_reaches_every_subscription_once() {
        let (mut state, _adv) = created();
        let sinks: Vec<RecordingSink> = (0..4).map(|_| RecordingSink::default()).collect();
        for sink in &sinks {
            state.bind(sink.clone()).unwrap();
        }

        let sample = TouchSample::motion(Duration::from_millis(42), 2, 0.5, 0.5);
        assert_eq!(state.deliver_sample(&sample), 4);

        let expected = WireEvent::Motion {
            time: 42,
            touch_id: 2,
            x: Fixed::from_f64(0.5),
            y: Fixed::from_f64(0.5),
        };
        for sink in &sinks {
            assert_eq!(sink.events(), vec![expected]);
        }
    }

    #[test]
    fn events_keep_arrival_order() {
        let (mut state, _adv) = created();
        let sink = RecordingSink::default();
        state.bind(sink.clone()).unwrap();

        let inputs = [
            TouchInput::Sample(TouchSample::down(Duration::from_millis(1), 1, 0.1, 0.2)),
            TouchInput::Sample(TouchSample::motion(Duration::from_millis(2), 1, 0.3, 0.4)),
            TouchInput::Sample(TouchSample::up(Duration::from_millis(3), 1)),
            TouchInput::Frame,
        ];
        for input in inputs {
            state.deliver(input);
        }

        let names: Vec<_> = sink.events().iter().map(WireEvent::name).collect();
        assert_eq!(names, vec!["down", "motion", "up", "frame"]);
    }

    #[test]
    fn dead_sinks_are_skipped() {
        let (mut state, _adv) = created();
        let alive = RecordingSink::default();
        let dead = RecordingSink::default();
        state.bind(dead.clone()).unwrap();
        state.bind(alive.clone()).unwrap();
        dead.kill();

        assert_eq!(state.deliver_cancel(), 1);
        assert_eq!(alive.events(), vec![WireEvent::Cancel]);
        assert!(dead.events().is_empty());
    }

    #[test]
    fn destroyed_capability_stops_broadcasts() {
        let (mut state, mut adv) = created();
        let sinks: Vec<RecordingSink> = (0..3).map(|_| RecordingSink::default()).collect();
        for sink in &sinks {
            state.bind(sink.clone()).unwrap();
        }
        state.destroy(&mut adv).unwrap();

        assert_eq!(state.deliver_sample(&TouchSample::down(Duration::ZERO, 1, 0.0, 0.0)), 0);
        assert_eq!(state.deliver_frame(), 0);
        for sink in &sinks {
            assert!(sink.events().is_empty());
        }
    }

    #[test]
    fn subscribe_touch_frame_unsubscribe_scenario() {
        let (mut state, _adv) = created();
        let client_a = RecordingSink::default();
        let key = state.bind(client_a.clone()).unwrap();

        state.deliver_sample(&TouchSample::down(Duration::from_millis(100), 7, 0.25, 0.75));
        state.deliver_frame();
        state.unbind(key).unwrap();
        assert_eq!(state.deliver_sample(&TouchSample::up(Duration::from_millis(150), 7)), 0);

        assert_eq!(
            client_a.events(),
            vec![
                WireEvent::Down {
                    time: 100,
                    touch_id: 7,
                    x: Fixed::from_f64(0.25),
                    y: Fixed::from_f64(0.75),
                },
                WireEvent::Frame,
            ]
        );
    }
}
