//! Traversal over the events attached to a beat

use super::types::{Beat, BeatContent};
use crate::event::TimedEvent;

enum Frame<'a> {
    Beat(i32, &'a Beat),
    Events(i32, std::slice::Iter<'a, TimedEvent>),
}

/// Depth-first iterator over `(tick, event)` pairs of a beat tree
///
/// `tick` is the event's position in the root beat's local coordinates: the
/// event's own tick plus the ticks of every child beat above it. Created by
/// [`Beat::events`].
pub struct Events<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> Iterator for Events<'a> {
    type Item = (i32, &'a TimedEvent);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Beat(offset, beat) => match &*beat.content {
                    BeatContent::Empty => {}
                    BeatContent::Single(event) => return Some((offset + event.tick(), event)),
                    BeatContent::Simultaneous(events) => {
                        self.stack.push(Frame::Events(offset, events.iter()));
                    }
                    BeatContent::Subdivided(sub) => {
                        for child in sub.children.iter().rev() {
                            self.stack.push(Frame::Beat(offset + child.tick, child));
                        }
                    }
                },
                Frame::Events(offset, mut events) => {
                    if let Some(event) = events.next() {
                        self.stack.push(Frame::Events(offset, events));
                        return Some((offset + event.tick(), event));
                    }
                }
            }
        }
        None
    }
}

impl Beat {
    /// Every attached event with its tick in this beat's local coordinates.
    ///
    /// Lazy and restartable: call it again to traverse again.
    pub fn events(&self) -> Events<'_> {
        Events {
            stack: vec![Frame::Beat(0, self)],
        }
    }

    /// Attached events flattened into this beat's local coordinates
    pub fn event_list(&self) -> Vec<TimedEvent> {
        self.events()
            .map(|(tick, event)| event.translate(tick - event.tick()))
            .collect()
    }
}
