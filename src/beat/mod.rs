//! # Beat Module
//!
//! The rhythm tree: a [`Beat`] is a span of musical time whose content is a
//! rest, one event, a chord, or an ordered subdivision into child beats.
//!
//! ## Purpose
//! Performance data arrives as events with arbitrary ticks. This module turns
//! it into notation-friendly rhythm:
//! 1. **Dispatch** - drop an event into the tree, snapping it onto the closest
//!    subdivision
//! 2. **Divide** - rebuild a beat as N equal children and re-dispatch what it
//!    held, scoring how badly the events fit that grid
//! 3. **Best fit** - try every allowed N and keep the best grid
//! 4. **Cut** - split a tree exactly at a tick, splitting straddling events
//!
//! ## Sub-modules
//! - `types` - Beat, BeatContent, Subdivision
//! - `dispatch` - Plain and threshold-aware event insertion
//! - `divide` - Divider, best-fit search, DivisionSet
//! - `split` - Structural cut
//! - `iter` - Lazy traversal over attached events
//!
//! ## Example
//! ```rust
//! use rhythm_tree::{Beat, DivisionSet, TimedEvent};
//!
//! let mut beat = Beat::rest(480);
//! beat.dispatch(&TimedEvent::new(0, 160, 60, 90));
//! beat.dispatch(&TimedEvent::new(160, 160, 62, 90));
//! beat.dispatch(&TimedEvent::new(320, 160, 64, 90));
//!
//! let best = beat.best_divided(DivisionSet::from_counts(&[2, 3, 4]));
//! assert_eq!(best.sub_beat_count(), 3);
//! ```
//!
//! ## Copy-on-write
//!
//! Content sits behind an `Rc`. Cloning a beat is O(1) and every mutating
//! operation goes through `Rc::make_mut`, which clones the content only when
//! another beat still shares it. `Rc` is not `Send`, so a shared tree cannot be
//! handed to another thread and mutated there.
//!
//! ## Related Modules
//! - `event` - TimedEvent, the leaf payload
//! - `timeline` - Repeater/Window adapters implemented for Beat
//! - `quantize` - Bar-by-bar pipeline built from dispatch, cut and best fit

mod types;
mod dispatch;
mod divide;
mod split;
mod iter;


pub use types::{Beat, BeatContent, Subdivision, MAX_DIVISIONS};
pub use divide::{DivisionSet, MAX_BEST_FIT_DIVISIONS};
pub use iter::Events;
