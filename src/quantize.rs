//! # Quantizer
//!
//! Turns a flat performance into a rhythm tree, bar by bar.
//!
//! ## Pipeline
//! 1. Every event is dispatched into one flat beat spanning all bars
//! 2. The flat beat is cut one bar at a time
//! 3. Each bar is divided into the beats of the time signature, using the
//!    threshold so slightly early or late onsets land on the right beat
//! 4. Each beat is re-divided along its best-fitting grid
//! 5. Beats are grouped into bars and bars into the returned tree
//!
//! ## Example
//! ```rust
//! use rhythm_tree::{Quantizer, Settings, TimedEvent};
//!
//! let quantizer = Quantizer::new(Settings::default());
//! let tree = quantizer
//!     .quantize(&[TimedEvent::new(0, 960, 60, 90), TimedEvent::new(975, 945, 62, 90)])
//!     .unwrap();
//!
//! let bar = tree.sub_beat(0).unwrap();
//! assert_eq!(bar.sub_beat_count(), 4);
//! assert_eq!(bar.sub_beat(2).unwrap().events().count(), 1);
//! ```

use tracing::{debug, trace, warn};

use crate::beat::Beat;
use crate::error::RhythmError;
use crate::event::TimedEvent;
use crate::settings::Settings;

#[derive(Debug, Clone, Default)]
pub struct Quantizer {
    settings: Settings,
}

impl Quantizer {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of bars needed to hold `events`, unless the settings fix it.
    ///
    /// Fails when the bars would span more ticks than a beat can hold.
    pub fn bar_count(&self, events: &[TimedEvent]) -> Result<u32, RhythmError> {
        self.settings.validate()?;
        let bar_duration = i64::from(self.settings.bar_duration());

        let bars = match self.settings.bars {
            Some(bars) => i64::from(bars),
            None => {
                let end = events
                    .iter()
                    .map(|event| {
                        let tick = i64::from(event.tick());
                        (tick + i64::from(event.duration())).max(tick + 1)
                    })
                    .max()
                    .unwrap_or(0);
                (end + bar_duration - 1) / bar_duration
            }
        };

        if bars * bar_duration > i64::from(i32::MAX) {
            return Err(RhythmError::SettingsError(format!(
                "{} bars of {} ticks exceed the largest tick {}",
                bars,
                bar_duration,
                i32::MAX
            )));
        }
        Ok(bars as u32)
    }

    /// Quantize `events` (absolute ticks) into a tree of bars.
    ///
    /// The returned beat holds one child per bar. An empty performance yields
    /// an empty zero-length beat.
    pub fn quantize(&self, events: &[TimedEvent]) -> Result<Beat, RhythmError> {
        if events.is_empty() {
            return Ok(Beat::default());
        }

        let bars = self.bar_count(events)?;
        let bar_duration = self.settings.bar_duration();
        let total = bar_duration * bars as i32;

        let mut flat = Beat::rest(total);
        for event in events {
            if event.tick() >= total {
                warn!(tick = event.tick(), total, "event starts after the last bar, skipped");
                continue;
            }
            flat.dispatch(event);
        }

        let mut remainder = flat;
        let mut quantized = Vec::with_capacity(bars as usize);
        for index in 0..bars {
            let (bar, rest) = remainder.cut(bar_duration);
            remainder = rest;

            let bar = self.quantize_bar(&bar)?;
            debug!(bar = index + 1, events = bar.events().count(), "quantized bar");
            quantized.push(bar);
        }

        Ok(Beat::group(&quantized))
    }

    /// Split a bar into its beats, then fit each beat to its best grid
    fn quantize_bar(&self, bar: &Beat) -> Result<Beat, RhythmError> {
        let beats = self.settings.time_signature.beats as u32;
        let (grid, error) = bar.divide_with_threshold(beats, self.settings.threshold)?;
        trace!(error, "bar split into beats");

        let fitted: Vec<Beat> = grid
            .children()
            .iter()
            .map(|beat| beat.best_divided(self.settings.allowed_divisions))
            .collect();

        Ok(Beat::group(&fitted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beat::BeatContent;
    use crate::settings::TimeSignature;

    fn pitch_of(beat: &Beat) -> Option<i8> {
        match beat.content() {
            BeatContent::Single(event) => Some(event.pitch()),
            _ => None,
        }
    }

    #[test]
    fn test_empty_performance() {
        let tree = Quantizer::default().quantize(&[]).unwrap();
        assert_eq!(tree, Beat::default());
    }

    #[test]
    fn test_bar_count() {
        let quantizer = Quantizer::default();
        assert_eq!(quantizer.bar_count(&[TimedEvent::new(0, 1920, 60, 90)]), Ok(1));
        assert_eq!(quantizer.bar_count(&[TimedEvent::new(0, 1921, 60, 90)]), Ok(2));
        assert_eq!(quantizer.bar_count(&[TimedEvent::new(1920, 0, 60, 90)]), Ok(2));

        let fixed = Quantizer::new(Settings {
            bars: Some(3),
            ..Settings::default()
        });
        assert_eq!(fixed.bar_count(&[TimedEvent::new(0, 10, 60, 90)]), Ok(3));
    }

    #[test]
    fn test_performance_longer_than_tick_range() {
        let quantizer = Quantizer::default();
        let events = [TimedEvent::new(0, i32::MAX, 60, 90)];

        assert!(matches!(
            quantizer.bar_count(&events),
            Err(RhythmError::SettingsError(_))
        ));
        assert!(quantizer.quantize(&events).is_err());

        // The end tick itself overflows i32
        let late = [TimedEvent::new(i32::MAX - 10, 100, 60, 90)];
        assert!(quantizer.quantize(&late).is_err());
    }

    #[test]
    fn test_fixed_bars_hold_very_long_note() {
        let settings = Settings {
            bars: Some(1),
            ..Settings::default()
        };
        let tree = Quantizer::new(settings)
            .quantize(&[TimedEvent::new(0, i32::MAX, 60, 90)])
            .unwrap();

        assert_eq!(tree.duration(), 1920);
        let bar = tree.sub_beat(0).unwrap();
        assert_eq!(bar.sub_beat_count(), 4);
        assert_eq!(bar.sub_beat(0).unwrap().events().count(), 1);
    }

    #[test]
    fn test_fixed_bars_beyond_tick_range() {
        let settings = Settings {
            bars: Some(u32::MAX),
            ..Settings::default()
        };
        let result = Quantizer::new(settings).quantize(&[TimedEvent::new(0, 480, 60, 90)]);
        assert!(matches!(result, Err(RhythmError::SettingsError(_))));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let settings = Settings {
            ticks_per_quarter: 1,
            time_signature: TimeSignature { beats: 1, beat_type: 8 },
            ..Settings::default()
        };
        let result = Quantizer::new(settings).quantize(&[TimedEvent::new(0, 1, 60, 90)]);
        assert!(matches!(result, Err(RhythmError::SettingsError(_))));
    }

    #[test]
    fn test_late_notes_snap_to_beats() {
        let events = [
            TimedEvent::new(0, 480, 60, 90),
            TimedEvent::new(497, 460, 62, 90),
            TimedEvent::new(965, 470, 64, 90),
            TimedEvent::new(1440, 480, 65, 90),
        ];
        let tree = Quantizer::default().quantize(&events).unwrap();

        assert_eq!(tree.sub_beat_count(), 1);
        let bar = tree.sub_beat(0).unwrap();
        assert_eq!(bar.duration(), 1920);
        assert_eq!(bar.sub_beat_count(), 4);

        for (index, pitch) in [60, 62, 64, 65].into_iter().enumerate() {
            let beat = bar.sub_beat(index).unwrap();
            assert_eq!(beat.tick(), 480 * index as i32);
            let leaves = beat.leaves();
            assert_eq!(leaves.len(), 1);
            assert_eq!(pitch_of(leaves[0]), Some(pitch));
        }
    }

    #[test]
    fn test_early_note_within_threshold() {
        // 455 is 25 ticks early, inside the 30 tick threshold
        let events = [TimedEvent::new(0, 400, 60, 90), TimedEvent::new(455, 400, 62, 90)];
        let tree = Quantizer::default().quantize(&events).unwrap();

        let bar = tree.sub_beat(0).unwrap();
        assert!(bar.sub_beat(0).unwrap().events().all(|(_, e)| e.pitch() == 60));
        assert!(bar.sub_beat(1).unwrap().events().all(|(_, e)| e.pitch() == 62));
        assert!(bar.sub_beat(1).unwrap().events().count() == 1);
    }

    #[test]
    fn test_triplet_beat() {
        let events = [
            TimedEvent::new(0, 480, 60, 90),
            TimedEvent::new(480, 160, 62, 90),
            TimedEvent::new(640, 160, 64, 90),
            TimedEvent::new(800, 160, 65, 90),
        ];
        let tree = Quantizer::default().quantize(&events).unwrap();

        let bar = tree.sub_beat(0).unwrap();
        assert_eq!(bar.sub_beat(0).unwrap().sub_beat_count(), 1);
        let triplet = bar.sub_beat(1).unwrap();
        assert_eq!(triplet.sub_beat_count(), 3);
        let pitches: Vec<Option<i8>> = triplet.children().iter().map(pitch_of).collect();
        assert_eq!(pitches, vec![Some(62), Some(64), Some(65)]);
    }

    #[test]
    fn test_note_across_barline_is_split() {
        let event = TimedEvent::new(1440, 960, 60, 90);
        let tree = Quantizer::default().quantize(&[event.clone()]).unwrap();

        assert_eq!(tree.sub_beat_count(), 2);
        assert_eq!(tree.duration(), 3840);

        let first = tree.sub_beat(0).unwrap().sub_beat(3).unwrap().event_list();
        let second = tree.sub_beat(1).unwrap().sub_beat(0).unwrap().event_list();
        assert_eq!((first[0].tick(), first[0].duration()), (0, 480));
        assert_eq!((second[0].tick(), second[0].duration()), (0, 480));
        assert!(first[0].shares_payload(&event));
        assert!(second[0].shares_payload(&event));
    }

    #[test]
    fn test_time_signature_sets_beats_per_bar() {
        let settings = Settings {
            time_signature: TimeSignature { beats: 3, beat_type: 4 },
            ..Settings::default()
        };
        let tree = Quantizer::new(settings)
            .quantize(&[TimedEvent::new(0, 2880, 60, 90)])
            .unwrap();

        assert_eq!(tree.sub_beat_count(), 2);
        for bar in tree.children() {
            assert_eq!(bar.duration(), 1440);
            assert_eq!(bar.sub_beat_count(), 3);
        }
    }

    #[test]
    fn test_fixed_bar_count_skips_late_events() {
        let settings = Settings {
            bars: Some(1),
            ..Settings::default()
        };
        let events = [TimedEvent::new(0, 480, 60, 90), TimedEvent::new(2000, 480, 62, 90)];
        let tree = Quantizer::new(settings).quantize(&events).unwrap();

        assert_eq!(tree.duration(), 1920);
        assert_eq!(tree.events().count(), 1);
    }
}
