//! Simulation events and sinks for observing ball state transitions.
//!
//! Events mark transitions (launch, stop, capture, lip-out, entering and leaving the cup),
//! not per-step samples; per-step data lives in
//! [`StepTelemetry`](crate::physics::telemetry::StepTelemetry).
use glam::Vec3;

/// Describes a ball state transition.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// The first step after a launch.
    Launched {
        /// Launch velocity.
        velocity: Vec3,
    },

    /// The ball came to rest on the green. Sent exactly once per launch.
    Stopped {
        /// Final ball centre.
        position: Vec3,
    },

    /// The ball dropped into the cup.
    Captured {
        /// Ball centre at capture.
        position: Vec3,
    },

    /// The rim deflected the ball.
    LipOut {
        /// Speed before the deflection.
        speed_before: f32,
        /// Speed after the deflection.
        speed_after: f32,
    },

    /// Terrain collision was handed over to the cup.
    CupEntered,

    /// Terrain collision was restored after leaving the cup.
    CupExited,
}

/// Receives [`SimEvent`]s from a simulator step.
pub trait EventSink {
    fn send(&mut self, event: SimEvent);
}

/// Discards every event.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: SimEvent) {}
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    #[inline]
    fn send(&mut self, event: SimEvent) {
        (**self).send(event);
    }
}

/// Forwards each event to a closure, e.g. to bridge into a host's own event queue.
pub struct FnSink<F>(F);

impl<F: FnMut(SimEvent)> FnSink<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F: FnMut(SimEvent)> EventSink for FnSink<F> {
    #[inline]
    fn send(&mut self, event: SimEvent) {
        (self.0)(event);
    }
}

/// Records events in arrival order.
#[derive(Default)]
pub struct VecSink {
    events: Vec<SimEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<SimEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of collected events matching `pred`.
    pub fn count(&self, pred: impl Fn(&SimEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: SimEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_collects_events() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.send(SimEvent::CupEntered);
        sink.send(SimEvent::Stopped {
            position: Vec3::ZERO,
        });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.count(|e| matches!(e, SimEvent::Stopped { .. })), 1);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn fn_sink_invokes_callback() {
        let mut count = 0;
        let mut sink = FnSink::new(|_event| {
            count += 1;
        });
        sink.send(SimEvent::CupExited);
        assert_eq!(count, 1);
    }
}
