//! Haptic scheduler with debounced, mixed recurring requests
//!
//! Controls fire one-shot pulses directly through [`HapticScheduler::pulse`].
//! Conditions that should vibrate continuously (a joystick pinned at its
//! border, a pedal floored) queue a [`VibrationPattern`] under their control
//! id instead; the scheduler services those once per display tick.
//!
//! # Two-phase removal
//!
//! Producers never delete a request. [`HapticScheduler::unqueue`] only marks
//! it [`RequestPhase::PendingRemoval`]; the next [`HapticScheduler::tick`]
//! drops every marked entry before servicing the rest. The consumer is the
//! only place entries disappear, so a tick never observes a request vanishing
//! halfway through its pass, whatever thread or task the producer runs on.

use super::actuator::HapticActuator;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::trace;

/// Recurring vibration: `pulse` on, then at least `pause` off
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VibrationPattern {
    pub pulse: Duration,
    pub pause: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestPhase {
    Live,
    PendingRemoval,
}

#[derive(Clone, Debug)]
pub struct VibrationRequest {
    pattern: VibrationPattern,
    /// `None` means due on the next tick
    next_due: Option<Instant>,
    phase: RequestPhase,
}

impl VibrationRequest {
    pub fn pattern(&self) -> VibrationPattern {
        self.pattern
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }
}

pub struct HapticScheduler {
    requests: BTreeMap<String, VibrationRequest>,
    actuator: Box<dyn HapticActuator>,
}

impl std::fmt::Debug for HapticScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HapticScheduler")
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

impl HapticScheduler {
    pub fn new(actuator: Box<dyn HapticActuator>) -> Self {
        Self {
            requests: BTreeMap::new(),
            actuator,
        }
    }

    /// One-shot pulse, sent to the actuator right away
    pub fn pulse(&mut self, duration: Duration) {
        if !duration.is_zero() {
            self.actuator.vibrate(duration);
        }
    }

    /// Starts or refreshes the recurring request of `id`.
    ///
    /// Refreshing a live request only swaps its pattern and keeps its
    /// schedule, so a finger wiggling at the border does not retrigger a
    /// pulse on every move. A request still pending removal is revived.
    pub fn queue(&mut self, id: &str, pattern: VibrationPattern) {
        match self.requests.get_mut(id) {
            Some(request) => {
                request.pattern = pattern;
                request.phase = RequestPhase::Live;
            }
            None => {
                trace!("Queued vibration for {}: {:?}", id, pattern);
                self.requests.insert(
                    id.to_string(),
                    VibrationRequest {
                        pattern,
                        next_due: None,
                        phase: RequestPhase::Live,
                    },
                );
            }
        }
    }

    /// Marks the request of `id` for removal by the next tick
    pub fn unqueue(&mut self, id: &str) {
        if let Some(request) = self.requests.get_mut(id) {
            request.phase = RequestPhase::PendingRemoval;
        }
    }

    /// Services the queue once.
    ///
    /// Dead requests are dropped first. Every live request that is due is
    /// rescheduled `pulse + pause` later; their pulses are mixed into a single
    /// actuator call using the longest one. Returns the mixed pulse, if any.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        self.requests
            .retain(|_, request| request.phase == RequestPhase::Live);

        let mut mixed: Option<Duration> = None;
        for request in self.requests.values_mut() {
            let due = request.next_due.map_or(true, |at| now >= at);
            if due {
                request.next_due = Some(now + request.pattern.pulse + request.pattern.pause);
                mixed = Some(mixed.map_or(request.pattern.pulse, |m| m.max(request.pattern.pulse)));
            }
        }

        if let Some(pulse) = mixed {
            self.pulse(pulse);
        }
        mixed
    }

    /// True while `id` has a live request
    pub fn is_queued(&self, id: &str) -> bool {
        self.requests
            .get(id)
            .is_some_and(|request| request.phase == RequestPhase::Live)
    }

    pub fn request(&self, id: &str) -> Option<&VibrationRequest> {
        self.requests.get(id)
    }

    /// Entries physically present, including ones pending removal
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haptics::MemoryActuator;

    fn pattern(pulse: u64, pause: u64) -> VibrationPattern {
        VibrationPattern {
            pulse: Duration::from_millis(pulse),
            pause: Duration::from_millis(pause),
        }
    }

    fn scheduler() -> (HapticScheduler, MemoryActuator) {
        let actuator = MemoryActuator::new();
        (HapticScheduler::new(Box::new(actuator.clone())), actuator)
    }

    #[test]
    fn unqueue_only_marks_until_tick() {
        let (mut scheduler, _) = scheduler();
        scheduler.queue("j1", pattern(10, 10));
        scheduler.unqueue("j1");

        assert_eq!(scheduler.len(), 1);
        assert!(!scheduler.is_queued("j1"));
        assert_eq!(
            scheduler.request("j1").map(|r| r.phase()),
            Some(RequestPhase::PendingRemoval)
        );

        scheduler.tick(Instant::now());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn dead_request_never_fires() {
        let (mut scheduler, actuator) = scheduler();
        scheduler.queue("p1", pattern(10, 10));
        scheduler.unqueue("p1");
        assert_eq!(scheduler.tick(Instant::now()), None);
        assert!(actuator.pulses().is_empty());
    }

    #[test]
    fn requeue_revives_pending_entry() {
        let (mut scheduler, _) = scheduler();
        scheduler.queue("p1", pattern(10, 10));
        scheduler.unqueue("p1");
        scheduler.queue("p1", pattern(12, 10));
        assert!(scheduler.is_queued("p1"));
        assert_eq!(scheduler.tick(Instant::now()), Some(Duration::from_millis(12)));
    }

    #[test]
    fn recurring_request_respects_pause() {
        let (mut scheduler, actuator) = scheduler();
        let start = Instant::now();
        scheduler.queue("j1", pattern(10, 10));

        assert!(scheduler.tick(start).is_some());
        assert!(scheduler.tick(start + Duration::from_millis(16)).is_none());
        assert!(scheduler.tick(start + Duration::from_millis(33)).is_some());
        assert_eq!(actuator.pulses().len(), 2);
    }

    #[test]
    fn refresh_does_not_reset_schedule() {
        let (mut scheduler, _) = scheduler();
        let start = Instant::now();
        scheduler.queue("j1", pattern(10, 10));
        scheduler.tick(start);
        scheduler.queue("j1", pattern(14, 10));
        assert!(scheduler.tick(start + Duration::from_millis(5)).is_none());
    }

    #[test]
    fn simultaneous_requests_mix_into_longest_pulse() {
        let (mut scheduler, actuator) = scheduler();
        scheduler.queue("j1", pattern(8, 10));
        scheduler.queue("p1", pattern(12, 10));
        assert_eq!(scheduler.tick(Instant::now()), Some(Duration::from_millis(12)));
        assert_eq!(actuator.pulses(), vec![Duration::from_millis(12)]);
    }

    #[test]
    fn zero_pulse_is_skipped() {
        let (mut scheduler, actuator) = scheduler();
        scheduler.pulse(Duration::ZERO);
        assert!(actuator.pulses().is_empty());
    }
}
