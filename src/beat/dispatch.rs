//! Event dispatch
//!
//! Inserts events into a beat. Leaves grow from rest to note to chord;
//! subdivided beats forward the event to the child whose grid position is
//! closest to the event's onset.

use std::rc::Rc;

use super::types::{flag, Beat, BeatContent, Subdivision};
use crate::event::TimedEvent;

/// Quantization error for an event landing `tick` ticks away from its leaf's origin.
///
/// Squared distance, in ticks, so the same relative mis-timing weighs more in
/// longer beats.
fn quadratic_error(tick: i32) -> f64 {
    let tick = tick as f64;
    tick * tick
}

impl Beat {
    /// Insert `event`, given in this beat's parent coordinates.
    ///
    /// Returns the quantization error: the squared distance between the event
    /// and the origin of the leaf that received it.
    ///
    /// # Example
    /// ```
    /// use rhythm_tree::{Beat, BeatContent, TimedEvent};
    ///
    /// let mut beat = Beat::rest(480);
    /// let error = beat.dispatch(&TimedEvent::new(12, 240, 60, 90));
    /// assert_eq!(error, 144.0);
    /// assert!(matches!(beat.content(), BeatContent::Single(e) if e.tick() == 12));
    /// ```
    pub fn dispatch(&mut self, event: &TimedEvent) -> f64 {
        self.dispatch_inner(event, None)
    }

    /// Threshold-aware dispatch.
    ///
    /// Behaves like [`Beat::dispatch`] but picks the onset child by truncating
    /// `tick + threshold` onto the grid, and records in every subdivision on the
    /// way down which child received the onset and which children the event's
    /// sustain overlaps.
    pub fn dispatch_with_threshold(&mut self, event: &TimedEvent, threshold: i32) -> f64 {
        self.dispatch_inner(event, Some(threshold))
    }

    fn dispatch_inner(&mut self, event: &TimedEvent, threshold: Option<i32>) -> f64 {
        let local = event.translate(-self.tick);
        let duration = self.duration;
        let mut error = quadratic_error(local.tick());

        let content = Rc::make_mut(&mut self.content);
        *content = match std::mem::take(content) {
            BeatContent::Empty => BeatContent::Single(local),
            BeatContent::Single(existing) => BeatContent::Simultaneous(vec![existing, local]),
            BeatContent::Simultaneous(mut events) => {
                events.push(local);
                BeatContent::Simultaneous(events)
            }
            BeatContent::Subdivided(mut sub) => {
                error = match threshold {
                    None => sub.dispatch(duration, &local),
                    Some(threshold) => sub.dispatch_with_threshold(duration, &local, threshold),
                };
                BeatContent::Subdivided(sub)
            }
        };

        error
    }
}

impl Subdivision {
    fn last_index(&self) -> usize {
        self.children.len() - 1
    }

    /// Grid step; never zero so beats shorter than their division count still dispatch
    fn quant(&self, duration: i32) -> i32 {
        (duration / self.divisions.max(1) as i32).max(1)
    }

    /// Child owning grid position `rtk`: the one before the first child starting after it
    fn child_at(&self, rtk: i64) -> usize {
        self.children[1..]
            .iter()
            .position(|child| i64::from(child.tick) > rtk)
            .unwrap_or(self.last_index())
    }

    fn dispatch(&mut self, duration: i32, local: &TimedEvent) -> f64 {
        let tick = local.tick();
        let index = if tick < 0 {
            0
        } else if tick >= duration {
            self.last_index()
        } else {
            let quant = i64::from(self.quant(duration));
            let rtk = ((i64::from(tick) + quant / 2) / quant) * quant;
            self.child_at(rtk)
        };

        self.children[index].dispatch(local)
    }

    fn dispatch_with_threshold(&mut self, duration: i32, local: &TimedEvent, threshold: i32) -> f64 {
        let tick = local.tick();
        // Grid arithmetic in i64: tick + duration + threshold can exceed i32
        let quant = i64::from(self.quant(duration));
        let slack = i64::from(threshold);

        let onset = if tick < 0 {
            0
        } else if tick >= duration {
            self.last_index()
        } else {
            let rtk = ((i64::from(tick) + slack) / quant) * quant;
            self.child_at(rtk)
        };

        // Sustain window, same truncation as the onset
        let rtk2 = ((i64::from(tick) + i64::from(local.duration()) + slack) / quant) * quant;
        let end = self.children[onset + 1..]
            .iter()
            .position(|child| i64::from(child.tick) > rtk2)
            .map(|offset| onset + offset)
            .unwrap_or(self.last_index());

        self.onset_flags |= flag(onset);
        for index in onset..=end {
            self.sounding_flags |= flag(index);
        }

        self.children[onset].dispatch_with_threshold(local, threshold)
    }
}
