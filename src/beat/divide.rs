//! Divider and best-fit search
//!
//! Rebuilds a beat as an even grid of children and re-dispatches every event it
//! held, scoring how well the events land on that grid. The best-fit search
//! runs the divider for each allowed division count and keeps the lowest score.

use serde::Deserialize;
use tracing::trace;

use super::types::{Beat, BeatContent, Subdivision, MAX_DIVISIONS};
use crate::error::RhythmError;

/// Largest division count the best-fit search will try
pub const MAX_BEST_FIT_DIVISIONS: u32 = 16;

/// Set of division counts the best-fit search may pick from
///
/// Bit `d` allows `d` divisions; only bits 1 through 16 are considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "Vec<u32>")]
pub struct DivisionSet(u32);

impl DivisionSet {
    /// Grids used when importing performances: halves, triplets, quarters,
    /// sextuplets and eighths of a beat
    pub const IMPORT_DEFAULT: DivisionSet =
        DivisionSet(1 << 1 | 1 << 2 | 1 << 3 | 1 << 4 | 1 << 6 | 1 << 8);

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Counts outside 1..=16 are ignored
    pub fn from_counts(counts: &[u32]) -> Self {
        let bits = counts
            .iter()
            .filter(|&&d| (1..=MAX_BEST_FIT_DIVISIONS).contains(&d))
            .fold(0, |bits, &d| bits | 1 << d);
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, divisions: u32) -> bool {
        (1..=MAX_BEST_FIT_DIVISIONS).contains(&divisions) && self.0 & (1 << divisions) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Allowed counts in increasing order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (1..=MAX_BEST_FIT_DIVISIONS).filter(move |&d| self.contains(d))
    }
}

/// Strict conversion used when reading settings: every count must be in 1..=16
impl TryFrom<Vec<u32>> for DivisionSet {
    type Error = RhythmError;

    fn try_from(counts: Vec<u32>) -> Result<Self, Self::Error> {
        if let Some(&bad) = counts
            .iter()
            .find(|&&d| !(1..=MAX_BEST_FIT_DIVISIONS).contains(&d))
        {
            return Err(RhythmError::SettingsError(format!(
                "division count {} is outside 1..={}",
                bad, MAX_BEST_FIT_DIVISIONS
            )));
        }
        Ok(DivisionSet::from_counts(&counts))
    }
}

impl Beat {
    /// Rebuild this beat as `divisions` equal children holding its events.
    ///
    /// Returns the new beat and the summed quantization error of every
    /// re-dispatched event. Zero divisions leave the beat as it is with no
    /// error; more than [`MAX_DIVISIONS`] is rejected because the onset and
    /// sounding masks could not describe the grid.
    pub fn divide(&self, divisions: u32) -> Result<(Beat, f64), RhythmError> {
        self.divide_inner(divisions, None)
    }

    /// [`Beat::divide`] dispatching with [`Beat::dispatch_with_threshold`],
    /// so the new grid records onset and sounding flags
    pub fn divide_with_threshold(&self, divisions: u32, threshold: i32) -> Result<(Beat, f64), RhythmError> {
        self.divide_inner(divisions, Some(threshold))
    }

    fn divide_inner(&self, divisions: u32, threshold: Option<i32>) -> Result<(Beat, f64), RhythmError> {
        if divisions < 1 {
            return Ok((self.clone(), 0.0));
        }
        if divisions > MAX_DIVISIONS {
            return Err(RhythmError::TooManyDivisions {
                divisions,
                max: MAX_DIVISIONS,
            });
        }

        let events = self.event_list();
        let grid = Subdivision::even(self.duration, divisions);
        let mut divided = Beat::from_parts(self.tick, self.duration, BeatContent::Subdivided(grid));

        let mut error = 0.0;
        for event in &events {
            // Events are local; the divided beat expects its parent's frame
            let event = event.translate(self.tick);
            error += match threshold {
                None => divided.dispatch(&event),
                Some(threshold) => divided.dispatch_with_threshold(&event, threshold),
            };
        }

        Ok((divided, error))
    }

    /// Best grid among `allowed`, with its error and division count.
    ///
    /// Ties keep the smallest division count. `None` when nothing is allowed.
    pub fn best_fit(&self, allowed: DivisionSet) -> Option<(Beat, f64, u32)> {
        let mut best: Option<(Beat, f64, u32)> = None;

        for divisions in allowed.iter() {
            let Ok((beat, error)) = self.divide(divisions) else {
                continue;
            };
            trace!(divisions, error, "best-fit candidate");

            let better = match &best {
                Some((_, best_error, _)) => error < *best_error,
                None => true,
            };
            if better {
                best = Some((beat, error, divisions));
            }
        }

        best
    }

    /// The beat divided along the best-fitting grid among `allowed`.
    ///
    /// An empty `allowed` set is a caller mistake and yields an empty
    /// zero-length beat.
    ///
    /// # Example
    /// ```
    /// use rhythm_tree::{Beat, DivisionSet, TimedEvent};
    ///
    /// let beat = Beat::rest(480)
    ///     .with_event(TimedEvent::new(0, 240, 60, 90))
    ///     .with_event(TimedEvent::new(240, 240, 62, 90));
    ///
    /// let best = beat.best_divided(DivisionSet::from_counts(&[2, 3]));
    /// assert_eq!(best.sub_beat_count(), 2);
    /// ```
    pub fn best_divided(&self, allowed: DivisionSet) -> Beat {
        self.best_fit(allowed)
            .map(|(beat, _, _)| beat)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_set_from_counts() {
        let set = DivisionSet::from_counts(&[2, 3, 4]);
        assert_eq!(set.bits(), 0b11100);
        assert!(set.contains(3));
        assert!(!set.contains(5));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_division_set_ignores_out_of_range() {
        let set = DivisionSet::from_counts(&[0, 17, 40]);
        assert!(set.is_empty());

        let set = DivisionSet::from_bits(1 << 0 | 1 << 17);
        assert!(set.is_empty());
    }

    #[test]
    fn test_import_default() {
        let counts: Vec<u32> = DivisionSet::IMPORT_DEFAULT.iter().collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 6, 8]);
    }

    #[test]
    fn test_division_set_from_yaml() {
        let set: DivisionSet = serde_yaml::from_str("[1, 2, 4]").unwrap();
        assert_eq!(set, DivisionSet::from_counts(&[1, 2, 4]));
    }

    #[test]
    fn test_division_set_rejects_out_of_range_counts() {
        assert!(serde_yaml::from_str::<DivisionSet>("[2, 20]").is_err());
        assert!(serde_yaml::from_str::<DivisionSet>("[0, 4]").is_err());
        assert!(matches!(
            DivisionSet::try_from(vec![3, 17]),
            Err(RhythmError::SettingsError(message)) if message.contains("17")
        ));
    }
}
