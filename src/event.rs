//! # Timed Events
//!
//! A [`TimedEvent`] is a note placed in time: a tick offset, a duration and a
//! pitch/velocity payload.
//!
//! ## Coordinates
//! The tick is always relative to the origin of whatever holds the event. An
//! event stored in a beat's content is local to that beat; an event handed to
//! [`Beat::dispatch`](crate::Beat::dispatch) is in the beat's parent frame.
//!
//! ## Sharing
//! The payload lives behind an `Rc`. Events derived from another one by
//! [`TimedEvent::translate`] or [`TimedEvent::cut`] share the same payload
//! instance, so splitting a long note into tied pieces never copies it.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

/// Immutable part of an event, shared between derived events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Payload {
    pub pitch: i8,
    pub velocity: i8,
}

/// A note with a position and a length, in ticks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedEvent {
    tick: i32,
    duration: i32,
    payload: Rc<Payload>,
}

impl TimedEvent {
    pub fn new(tick: i32, duration: i32, pitch: i8, velocity: i8) -> Self {
        Self {
            tick,
            duration,
            payload: Rc::new(Payload { pitch, velocity }),
        }
    }

    pub fn tick(&self) -> i32 {
        self.tick
    }

    pub fn duration(&self) -> i32 {
        self.duration
    }

    /// Tick right after the event stops sounding, saturating at `i32::MAX`
    pub fn last_tick(&self) -> i32 {
        self.tick.saturating_add(self.duration)
    }

    pub fn set_tick(&mut self, tick: i32) {
        self.tick = tick;
    }

    pub fn set_duration(&mut self, duration: i32) {
        self.duration = duration;
    }

    pub fn pitch(&self) -> i8 {
        self.payload.pitch
    }

    pub fn velocity(&self) -> i8 {
        self.payload.velocity
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// True when both events point at the same payload instance
    pub fn shares_payload(&self, other: &TimedEvent) -> bool {
        Rc::ptr_eq(&self.payload, &other.payload)
    }

    /// Same event moved by `delta` ticks
    pub fn translate(&self, delta: i32) -> TimedEvent {
        let mut event = self.clone();
        event.tick += delta;
        event
    }

    /// Split the event `t` ticks after its own start.
    ///
    /// Out-of-range cuts degenerate instead of failing: `t <= 0` gives an empty
    /// left piece at the event's tick, `t >= duration` an empty right piece at
    /// its last tick. Empty pieces are returned, not dropped; callers filter
    /// them by duration.
    ///
    /// # Example
    /// ```
    /// use rhythm_tree::TimedEvent;
    ///
    /// let note = TimedEvent::new(0, 480, 60, 90);
    /// let (head, tail) = note.cut(120);
    /// assert_eq!((head.tick(), head.duration()), (0, 120));
    /// assert_eq!((tail.tick(), tail.duration()), (120, 360));
    /// assert!(head.shares_payload(&tail));
    /// ```
    pub fn cut(&self, t: i32) -> (TimedEvent, TimedEvent) {
        if t <= 0 {
            let mut left = self.clone();
            left.duration = 0;
            (left, self.clone())
        } else if t >= self.duration {
            let mut right = self.clone();
            right.tick = self.last_tick();
            right.duration = 0;
            (self.clone(), right)
        } else {
            let mut left = self.clone();
            left.duration = t;

            let mut right = self.clone();
            right.tick = self.tick + t;
            right.duration = self.duration - t;

            (left, right)
        }
    }
}

impl fmt::Display for TimedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{tick: {}, duration: {}, pitch: {}, velocity: {}}}",
            self.tick, self.duration, self.payload.pitch, self.payload.velocity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_shares_payload() {
        let note = TimedEvent::new(10, 100, 64, 80);
        let moved = note.translate(-25);
        assert_eq!(moved.tick(), -15);
        assert_eq!(moved.duration(), 100);
        assert!(moved.shares_payload(&note));
    }

    #[test]
    fn test_cut_before_start() {
        let note = TimedEvent::new(40, 100, 64, 80);
        let (left, right) = note.cut(0);
        assert_eq!(left.tick(), 40);
        assert_eq!(left.duration(), 0);
        assert_eq!(right, note);

        let (left, _) = note.cut(-30);
        assert_eq!(left.duration(), 0);
    }

    #[test]
    fn test_cut_past_end() {
        let note = TimedEvent::new(40, 100, 64, 80);
        let (left, right) = note.cut(100);
        assert_eq!(left, note);
        assert_eq!(right.tick(), 140);
        assert_eq!(right.duration(), 0);
    }

    #[test]
    fn test_cut_inside() {
        let note = TimedEvent::new(40, 100, 64, 80);
        let (left, right) = note.cut(30);
        assert_eq!((left.tick(), left.duration()), (40, 30));
        assert_eq!((right.tick(), right.duration()), (70, 70));
        assert_eq!(right.pitch(), 64);
        assert_eq!(right.velocity(), 80);
        assert!(left.shares_payload(&right));
    }

    #[test]
    fn test_equal_events_do_not_share() {
        let a = TimedEvent::new(0, 10, 60, 90);
        let b = TimedEvent::new(0, 10, 60, 90);
        assert_eq!(a, b);
        assert!(!a.shares_payload(&b));
    }

    #[test]
    fn test_display() {
        let note = TimedEvent::new(0, 240, 60, 90);
        assert_eq!(note.to_string(), "{tick: 0, duration: 240, pitch: 60, velocity: 90}");
    }
}
