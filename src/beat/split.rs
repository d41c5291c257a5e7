//! Structural cut
//!
//! Splits a beat in two at a local tick. Unlike dispatch nothing is
//! re-quantized: events straddling the cut are split in place and subdivided
//! beats are cut child by child.

use super::types::{Beat, BeatContent, Subdivision};
use crate::event::TimedEvent;

/// Split every event at local tick `t`, keeping non-empty pieces.
///
/// Right pieces are re-based onto the right beat's origin.
fn cut_events<'a>(events: impl IntoIterator<Item = &'a TimedEvent>, t: i32) -> (BeatContent, BeatContent) {
    let mut left = Vec::new();
    let mut right = Vec::new();

    for event in events {
        let (head, tail) = event.cut(t - event.tick());
        if head.duration() > 0 {
            left.push(head);
        }
        if tail.duration() > 0 {
            right.push(tail.translate(-t));
        }
    }

    (BeatContent::from_events(left), BeatContent::from_events(right))
}

impl Beat {
    /// Split at local tick `t` into `(before, after)`.
    ///
    /// `t <= 0` gives an empty zero-length beat and this beat; `t >= duration`
    /// gives this beat and an empty zero-length beat. Otherwise the halves keep
    /// this beat's parent frame (`before` at `tick`, `after` at `tick + t`) and
    /// their durations add up to the original.
    ///
    /// Subdivided halves hold only the children (or child pieces) on their
    /// side, so their division count is their new child count, and their onset
    /// and sounding flags start cleared.
    ///
    /// # Example
    /// ```
    /// use rhythm_tree::{Beat, TimedEvent};
    ///
    /// let whole = Beat::leaf_with_event(480, TimedEvent::new(0, 480, 60, 90));
    /// let (left, right) = whole.cut(240);
    /// assert_eq!(left.duration() + right.duration(), 480);
    /// assert_eq!(right.event_list()[0].tick(), 0);
    /// ```
    pub fn cut(&self, t: i32) -> (Beat, Beat) {
        if t <= 0 {
            return (Beat::default(), self.clone());
        }
        if t >= self.duration {
            return (self.clone(), Beat::default());
        }

        let (left, right) = match &*self.content {
            BeatContent::Empty => (BeatContent::Empty, BeatContent::Empty),
            BeatContent::Single(event) => cut_events([event], t),
            BeatContent::Simultaneous(events) => cut_events(events, t),
            BeatContent::Subdivided(sub) => {
                let mut left = Vec::new();
                let mut right = Vec::new();

                for child in &sub.children {
                    let (head, tail) = child.cut(t - child.tick);
                    if head.duration > 0 {
                        left.push(head);
                    }
                    if tail.duration > 0 {
                        right.push(tail.translate(-t));
                    }
                }

                (
                    BeatContent::Subdivided(Subdivision::from_children(left)),
                    BeatContent::Subdivided(Subdivision::from_children(right)),
                )
            }
        };

        (
            Beat::from_parts(self.tick, t, left),
            Beat::from_parts(self.tick + t, self.duration - t, right),
        )
    }
}
