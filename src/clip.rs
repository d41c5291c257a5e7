//! Clips: flat, copy-on-write lists of events
//!
//! A clip is the raw material the rhythm tree is built from, e.g. one channel
//! of an imported performance. Copies share the event list until one of them
//! adds an event.

use std::rc::Rc;

use crate::event::TimedEvent;
use crate::timeline::Timeline;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clip {
    tick: i32,
    duration: i32,
    events: Rc<Vec<TimedEvent>>,
}

impl Clip {
    pub fn new(duration: i32) -> Self {
        Self {
            tick: 0,
            duration,
            events: Rc::new(Vec::new()),
        }
    }

    pub fn tick(&self) -> i32 {
        self.tick
    }

    pub fn duration(&self) -> i32 {
        self.duration
    }

    pub fn set_tick(&mut self, tick: i32) {
        self.tick = tick;
    }

    pub fn set_duration(&mut self, duration: i32) {
        self.duration = duration;
    }

    /// Append an event, ticks relative to the clip start
    pub fn add_event(&mut self, event: TimedEvent) {
        Rc::make_mut(&mut self.events).push(event);
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn shares_events(&self, other: &Clip) -> bool {
        Rc::ptr_eq(&self.events, &other.events)
    }
}

impl Timeline for Clip {
    type Item = TimedEvent;

    fn duration(&self) -> i32 {
        self.duration
    }

    fn items(&self) -> Vec<TimedEvent> {
        self.events.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{Repeater, Window};

    #[test]
    fn test_copies_share_until_written() {
        let mut clip = Clip::new(960);
        clip.add_event(TimedEvent::new(0, 240, 60, 90));

        let mut copy = clip.clone();
        assert!(copy.shares_events(&clip));

        copy.add_event(TimedEvent::new(240, 240, 62, 90));
        assert!(!copy.shares_events(&clip));
        assert_eq!(clip.event_count(), 1);
        assert_eq!(copy.event_count(), 2);
    }

    #[test]
    fn test_window_over_repeated_clip() {
        let mut clip = Clip::new(480);
        clip.add_event(TimedEvent::new(0, 120, 60, 90));
        clip.add_event(TimedEvent::new(360, 240, 62, 90));

        let looped = Repeater::new(&clip, 2);
        let window = Window::new(&looped, 400, 480);
        let events = window.items();

        // Both long notes straddle a window edge
        let spans: Vec<(i32, i32)> = events.iter().map(|e| (e.tick(), e.duration())).collect();
        assert_eq!(spans, vec![(0, 200), (80, 120), (440, 40)]);
        assert!(events[0].shares_payload(&clip.events()[1]));
        assert_eq!(looped.duration(), 960);
    }
}
