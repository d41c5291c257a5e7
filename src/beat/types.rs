//! Beat and beat content type definitions
//!
//! This module defines the tree node ([`Beat`]), its content variants
//! ([`BeatContent`]) and the subdivided grid ([`Subdivision`]).

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::error::RhythmError;
use crate::event::TimedEvent;

/// Widest subdivision whose onset/sounding flags fit in the `u32` masks
pub const MAX_DIVISIONS: u32 = 32;

/// What a beat holds
///
/// Ticks of events stored here are local to the owning beat.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum BeatContent {
    /// A rest
    #[default]
    Empty,
    /// Exactly one event
    Single(TimedEvent),
    /// Events sounding together (a chord), in dispatch order
    Simultaneous(Vec<TimedEvent>),
    /// An ordered grid of child beats
    Subdivided(Subdivision),
}

impl BeatContent {
    /// Content holding exactly the given events: a rest, a single note or a chord
    pub fn from_events(mut events: Vec<TimedEvent>) -> Self {
        match events.len() {
            0 => BeatContent::Empty,
            1 => BeatContent::Single(events.remove(0)),
            _ => BeatContent::Simultaneous(events),
        }
    }

    pub fn is_rest(&self) -> bool {
        match self {
            BeatContent::Empty => true,
            BeatContent::Single(_) => false,
            BeatContent::Simultaneous(events) => events.is_empty(),
            BeatContent::Subdivided(sub) => sub.children.iter().all(Beat::is_rest),
        }
    }
}

/// Children of a subdivided beat plus the flags recorded by threshold dispatch
///
/// Children are contiguous and partition the parent's span: the first starts at
/// tick 0 and each one starts where the previous one ends. There is always at
/// least one child.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Subdivision {
    pub(super) children: Vec<Beat>,
    pub(super) divisions: u32,
    pub(super) onset_flags: u32,
    pub(super) sounding_flags: u32,
}

impl Subdivision {
    /// `divisions` rests over `[0, duration)`.
    ///
    /// Boundaries are truncated (`i * duration / divisions`), not widths, so the
    /// children always add up to `duration` even when it doesn't divide evenly.
    pub(super) fn even(duration: i32, divisions: u32) -> Self {
        let boundary = |i: u32| (i as i64 * duration as i64 / divisions as i64) as i32;
        let children = (0..divisions)
            .map(|i| {
                let start = boundary(i);
                let mut child = Beat::rest(boundary(i + 1) - start);
                child.set_tick(start);
                child
            })
            .collect();

        Self {
            children,
            divisions,
            onset_flags: 0,
            sounding_flags: 0,
        }
    }

    /// Wrap already contiguous children; flags start cleared
    pub(super) fn from_children(children: Vec<Beat>) -> Self {
        debug_assert!(!children.is_empty());
        debug_assert!(children.windows(2).all(|w| w[0].last_tick() == w[1].tick()));
        Self {
            divisions: children.len() as u32,
            children,
            onset_flags: 0,
            sounding_flags: 0,
        }
    }

    pub fn children(&self) -> &[Beat] {
        &self.children
    }

    pub fn divisions(&self) -> u32 {
        self.divisions
    }

    /// Bit `i` set once an event's onset was placed in child `i`
    pub fn onset_flags(&self) -> u32 {
        self.onset_flags
    }

    /// Bit `i` set for every child overlapped by a dispatched event's sustain
    pub fn sounding_flags(&self) -> u32 {
        self.sounding_flags
    }

    pub fn has_onset(&self, index: usize) -> bool {
        self.onset_flags & flag(index) != 0
    }

    pub fn is_sounding(&self, index: usize) -> bool {
        self.sounding_flags & flag(index) != 0
    }
}

/// Mask bit for child `index`; children past the mask width have no bit
pub(super) fn flag(index: usize) -> u32 {
    if index < MAX_DIVISIONS as usize {
        1 << index
    } else {
        0
    }
}

/// A node of the rhythm tree
///
/// `tick` is the beat's offset inside its parent subdivision. Root beats are
/// normally kept at tick 0; their absolute position belongs to whoever holds
/// them (a bar, a clip).
///
/// Content is read-only from outside the crate. It only changes through the
/// tree operations, which keep subdivided children partitioning the beat:
///
/// ```compile_fail
/// use rhythm_tree::{Beat, BeatContent};
///
/// let mut beat = Beat::rest(480);
/// *beat.content_mut() = BeatContent::Empty;
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Beat {
    pub(super) tick: i32,
    pub(super) duration: i32,
    pub(super) content: Rc<BeatContent>,
}

impl Beat {
    /// An empty beat of the given length
    pub fn rest(duration: i32) -> Self {
        Self {
            tick: 0,
            duration,
            content: Rc::new(BeatContent::Empty),
        }
    }

    /// A beat holding one event, already in the beat's local coordinates
    pub fn leaf_with_event(duration: i32, event: TimedEvent) -> Self {
        Self {
            tick: 0,
            duration,
            content: Rc::new(BeatContent::Single(event)),
        }
    }

    /// Concatenate beats into one subdivided beat.
    ///
    /// Each beat is re-ticked to start where the previous one ends and the
    /// result lasts as long as all of them together. An empty slice gives a
    /// zero-length rest.
    pub fn group(beats: &[Beat]) -> Beat {
        if beats.is_empty() {
            return Beat::default();
        }

        let mut tick = 0;
        let children: Vec<Beat> = beats
            .iter()
            .map(|beat| {
                let mut child = beat.clone();
                child.tick = tick;
                tick += child.duration;
                child
            })
            .collect();

        Beat {
            tick: 0,
            duration: tick,
            content: Rc::new(BeatContent::Subdivided(Subdivision::from_children(children))),
        }
    }

    pub(super) fn from_parts(tick: i32, duration: i32, content: BeatContent) -> Self {
        Self {
            tick,
            duration,
            content: Rc::new(content),
        }
    }

    /// Builder-style dispatch, handy to assemble trees
    pub fn with_event(mut self, event: TimedEvent) -> Self {
        self.dispatch(&event);
        self
    }

    pub fn tick(&self) -> i32 {
        self.tick
    }

    pub fn duration(&self) -> i32 {
        self.duration
    }

    pub fn last_tick(&self) -> i32 {
        self.tick.saturating_add(self.duration)
    }

    pub fn set_tick(&mut self, tick: i32) {
        self.tick = tick;
    }

    /// Same beat moved by `delta` ticks; content stays shared
    pub fn translate(&self, delta: i32) -> Beat {
        let mut beat = self.clone();
        beat.tick += delta;
        beat
    }

    pub fn content(&self) -> &BeatContent {
        &self.content
    }

    /// True when both beats point at the same content instance
    pub fn shares_content(&self, other: &Beat) -> bool {
        Rc::ptr_eq(&self.content, &other.content)
    }

    pub fn is_rest(&self) -> bool {
        self.content.is_rest()
    }

    pub fn is_subdivided(&self) -> bool {
        matches!(*self.content, BeatContent::Subdivided(_))
    }

    pub fn subdivision(&self) -> Option<&Subdivision> {
        match &*self.content {
            BeatContent::Subdivided(sub) => Some(sub),
            _ => None,
        }
    }

    /// Child beats; empty unless the beat is subdivided
    pub fn children(&self) -> &[Beat] {
        self.subdivision().map(Subdivision::children).unwrap_or(&[])
    }

    pub fn sub_beat_count(&self) -> usize {
        self.children().len()
    }

    pub fn sub_beat(&self, index: usize) -> Result<&Beat, RhythmError> {
        let children = self.children();
        children.get(index).ok_or(RhythmError::SubBeatOutOfRange {
            index,
            count: children.len(),
        })
    }

    /// Final (non-subdivided) beats, depth-first, in time order
    pub fn leaves(&self) -> Vec<&Beat> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Beat>) {
        match &*self.content {
            BeatContent::Subdivided(sub) => {
                for child in &sub.children {
                    child.collect_leaves(leaves);
                }
            }
            _ => leaves.push(self),
        }
    }

    /// Indented, one-node-per-line rendering of the tree
    ///
    /// # Example
    /// ```
    /// use rhythm_tree::{Beat, TimedEvent};
    ///
    /// let beat = Beat::leaf_with_event(480, TimedEvent::new(0, 480, 60, 90));
    /// assert_eq!(
    ///     beat.to_pretty_string(),
    ///     "0..480 note {tick: 0, duration: 480, pitch: 60, velocity: 90}\n"
    /// );
    /// ```
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let span = format!("{}..{}", self.tick, self.last_tick());

        match &*self.content {
            BeatContent::Empty => out.push_str(&format!("{}{} rest\n", indent, span)),
            BeatContent::Single(event) => {
                out.push_str(&format!("{}{} note {}\n", indent, span, event));
            }
            BeatContent::Simultaneous(events) => {
                out.push_str(&format!("{}{} chord\n", indent, span));
                for event in events {
                    out.push_str(&format!("{}  {}\n", indent, event));
                }
            }
            BeatContent::Subdivided(sub) => {
                out.push_str(&format!(
                    "{}{} divided by {} (onsets {:b}, sounding {:b})\n",
                    indent, span, sub.divisions, sub.onset_flags, sub.sounding_flags
                ));
                for child in &sub.children {
                    child.write_pretty(out, depth + 1);
                }
            }
        }
    }
}

impl fmt::Display for BeatContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeatContent::Empty => write!(f, "{{}}"),
            BeatContent::Single(event) => write!(f, "{{event: {}}}", event),
            BeatContent::Simultaneous(events) => {
                write!(f, "{{events: [")?;
                for (i, event) in events.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", event)?;
                }
                write!(f, "]}}")
            }
            BeatContent::Subdivided(sub) => {
                write!(f, "{{divisions: {}, beats: [", sub.divisions)?;
                for (i, child) in sub.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, "]}}")
            }
        }
    }
}

impl fmt::Display for Beat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{tick: {}, duration: {}, content: {}}}",
            self.tick, self.duration, self.content
        )
    }
}
