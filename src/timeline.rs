//! # Timeline Adapters
//!
//! Generic views over anything laid out in ticks.
//!
//! ## Traits
//! - [`Temporal`] - an item with a tick, a duration and a way to split itself
//!   (implemented by [`TimedEvent`] and [`Beat`])
//! - [`Timeline`] - a span of time made of temporal items (implemented by
//!   [`Beat`], [`Clip`](crate::Clip), [`Repeater`] and [`Window`])
//!
//! ## Adapters
//! - [`Repeater`] - plays a timeline `count` times back to back
//! - [`Window`] - extracts `[offset, offset + length)` from a timeline, cutting
//!   items that straddle either edge
//!
//! Adapters borrow their source and are timelines themselves, so they compose:
//! a window over a repeated clip is a loop region.
//!
//! ## Example
//! ```rust
//! use rhythm_tree::{Clip, Repeater, TimedEvent, Timeline, Window};
//!
//! let mut clip = Clip::new(480);
//! clip.add_event(TimedEvent::new(0, 480, 60, 90));
//!
//! let looped = Repeater::new(&clip, 4);
//! let middle = Window::new(&looped, 720, 480);
//! let pieces = middle.items();
//!
//! assert_eq!(pieces.len(), 2);
//! assert_eq!((pieces[0].tick(), pieces[0].duration()), (0, 240));
//! assert_eq!((pieces[1].tick(), pieces[1].duration()), (240, 240));
//! ```

use crate::beat::Beat;
use crate::event::TimedEvent;

/// Something placed in time that can be split
pub trait Temporal: Clone {
    fn tick(&self) -> i32;

    fn duration(&self) -> i32;

    fn last_tick(&self) -> i32 {
        self.tick() + self.duration()
    }

    /// Same item at another tick
    fn with_tick(&self, tick: i32) -> Self;

    /// Split `t` ticks after the item's start; see [`TimedEvent::cut`]
    fn cut(&self, t: i32) -> (Self, Self);
}

impl Temporal for TimedEvent {
    fn tick(&self) -> i32 {
        TimedEvent::tick(self)
    }

    fn duration(&self) -> i32 {
        TimedEvent::duration(self)
    }

    fn with_tick(&self, tick: i32) -> Self {
        self.translate(tick - TimedEvent::tick(self))
    }

    fn cut(&self, t: i32) -> (Self, Self) {
        TimedEvent::cut(self, t)
    }
}

impl Temporal for Beat {
    fn tick(&self) -> i32 {
        Beat::tick(self)
    }

    fn duration(&self) -> i32 {
        Beat::duration(self)
    }

    fn with_tick(&self, tick: i32) -> Self {
        self.translate(tick - Beat::tick(self))
    }

    fn cut(&self, t: i32) -> (Self, Self) {
        Beat::cut(self, t)
    }
}

/// A span of time made of items whose ticks are relative to its start
pub trait Timeline {
    type Item: Temporal;

    fn duration(&self) -> i32;

    fn items(&self) -> Vec<Self::Item>;
}

impl Timeline for Beat {
    type Item = Beat;

    fn duration(&self) -> i32 {
        Beat::duration(self)
    }

    /// Children of a subdivided beat, otherwise the beat itself at tick 0
    fn items(&self) -> Vec<Beat> {
        if self.is_subdivided() {
            self.children().to_vec()
        } else {
            vec![self.with_tick(0)]
        }
    }
}

/// A timeline played `count` times in a row
#[derive(Debug, Clone, Copy)]
pub struct Repeater<'a, T> {
    source: &'a T,
    count: u32,
}

impl<'a, T: Timeline> Repeater<'a, T> {
    pub fn new(source: &'a T, count: u32) -> Self {
        Self { source, count }
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl<T: Timeline> Timeline for Repeater<'_, T> {
    type Item = T::Item;

    fn duration(&self) -> i32 {
        self.source.duration() * self.count as i32
    }

    fn items(&self) -> Vec<T::Item> {
        let items = self.source.items();
        let length = self.source.duration();

        let mut repeated = Vec::with_capacity(items.len() * self.count as usize);
        for pass in 0..self.count as i32 {
            let shift = pass * length;
            repeated.extend(items.iter().map(|item| item.with_tick(item.tick() + shift)));
        }
        repeated
    }
}

/// The part of a timeline between `offset` and `offset + length`
#[derive(Debug, Clone, Copy)]
pub struct Window<'a, T> {
    source: &'a T,
    offset: i32,
    length: i32,
}

impl<'a, T: Timeline> Window<'a, T> {
    pub fn new(source: &'a T, offset: i32, length: i32) -> Self {
        Self {
            source,
            offset,
            length,
        }
    }

    /// From `offset` to the end of the source
    pub fn from_offset(source: &'a T, offset: i32) -> Self {
        Self::new(source, offset, source.duration() - offset)
    }

    /// The whole source
    pub fn whole(source: &'a T) -> Self {
        Self::new(source, 0, source.duration())
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }
}

impl<T: Timeline> Timeline for Window<'_, T> {
    type Item = T::Item;

    fn duration(&self) -> i32 {
        self.length
    }

    /// Items overlapping the window, clipped to it and re-based onto its start.
    ///
    /// Pieces that end up with no duration are dropped.
    fn items(&self) -> Vec<T::Item> {
        let left = self.offset;
        let right = self.offset + self.length;

        self.source
            .items()
            .into_iter()
            .filter(|item| item.last_tick() > left && item.tick() < right)
            .filter_map(|item| {
                let mut piece = item;
                if piece.tick() < left {
                    piece = piece.cut(left - piece.tick()).1;
                }
                if piece.last_tick() > right {
                    piece = piece.cut(right - piece.tick()).0;
                }
                (piece.duration() > 0).then(|| piece.with_tick(piece.tick() - left))
            })
            .collect()
    }
}
