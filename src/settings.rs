//! # Quantization Settings
//!
//! Settings read from the YAML frontmatter of an input document.
//!
//! ## Keys
//! All keys are optional and kebab-case:
//! - `ticks-per-quarter` - resolution of the event ticks (default 480)
//! - `time-signature` - `N/D`, e.g. `3/4` (default 4/4)
//! - `threshold` - tick tolerance for onset/sustain detection (default a
//!   sixty-fourth note, `ticks-per-quarter / 16`)
//! - `allowed-divisions` - list of grids the best-fit search may pick
//!   (default `[1, 2, 3, 4, 6, 8]`)
//! - `bars` - number of bars to quantize (default: enough to hold every event)
//!
//! ## Example
//! ```rust
//! use rhythm_tree::Settings;
//!
//! let settings = Settings::from_yaml("time-signature: 3/4\nthreshold: 20").unwrap();
//! assert_eq!(settings.time_signature.beats, 3);
//! assert_eq!(settings.bar_duration(), 1440);
//! ```

use std::fmt;

use serde::Deserialize;

use crate::beat::DivisionSet;
use crate::error::RhythmError;

pub const DEFAULT_TICKS_PER_QUARTER: i32 = 480;

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSignature {
    pub beats: u8,
    pub beat_type: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            beats: 4,
            beat_type: 4,
        }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.beat_type)
    }
}

impl TimeSignature {
    /// Parse `N/D`; the denominator must be a power of two
    pub fn parse(s: &str) -> Result<Self, RhythmError> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 2 {
            return Err(RhythmError::SettingsError(format!(
                "Invalid time signature: {}",
                s
            )));
        }

        let beats: u8 = parts[0]
            .trim()
            .parse()
            .map_err(|_| RhythmError::SettingsError(format!("Invalid time signature beats: {}", s)))?;
        let beat_type: u8 = parts[1]
            .trim()
            .parse()
            .map_err(|_| RhythmError::SettingsError(format!("Invalid time signature beat type: {}", s)))?;

        if beats == 0 || !beat_type.is_power_of_two() {
            return Err(RhythmError::SettingsError(format!(
                "Invalid time signature: {}",
                s
            )));
        }

        Ok(Self { beats, beat_type })
    }
}

/// Raw settings for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawSettings {
    pub ticks_per_quarter: Option<i32>,
    pub time_signature: Option<String>,
    pub threshold: Option<i32>,
    pub allowed_divisions: Option<DivisionSet>,
    pub bars: Option<u32>,
}

/// Validated quantization settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub ticks_per_quarter: i32,
    pub time_signature: TimeSignature,
    pub threshold: i32,
    pub allowed_divisions: DivisionSet,
    pub bars: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ticks_per_quarter: DEFAULT_TICKS_PER_QUARTER,
            time_signature: TimeSignature::default(),
            threshold: DEFAULT_TICKS_PER_QUARTER / 16,
            allowed_divisions: DivisionSet::IMPORT_DEFAULT,
            bars: None,
        }
    }
}

impl Settings {
    pub fn from_yaml(content: &str) -> Result<Self, RhythmError> {
        if content.trim().is_empty() {
            return Self::from_raw(RawSettings::default());
        }

        let raw: RawSettings =
            serde_yaml::from_str(content).map_err(|e| RhythmError::SettingsError(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawSettings) -> Result<Self, RhythmError> {
        let ticks_per_quarter = raw.ticks_per_quarter.unwrap_or(DEFAULT_TICKS_PER_QUARTER);
        if ticks_per_quarter <= 0 {
            return Err(RhythmError::SettingsError(format!(
                "ticks-per-quarter must be positive, got {}",
                ticks_per_quarter
            )));
        }

        let time_signature = match &raw.time_signature {
            Some(ts) => TimeSignature::parse(ts)?,
            None => TimeSignature::default(),
        };

        let allowed_divisions = raw.allowed_divisions.unwrap_or(DivisionSet::IMPORT_DEFAULT);
        if allowed_divisions.is_empty() {
            return Err(RhythmError::SettingsError(
                "allowed-divisions must contain at least one count between 1 and 16".to_string(),
            ));
        }

        let settings = Self {
            ticks_per_quarter,
            time_signature,
            threshold: raw.threshold.unwrap_or(ticks_per_quarter / 16),
            allowed_divisions,
            bars: raw.bars,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the values that the parser alone cannot guarantee
    pub fn validate(&self) -> Result<(), RhythmError> {
        let bar_duration = self.bar_duration_i64();
        if bar_duration <= 0 || bar_duration > i64::from(i32::MAX) {
            return Err(RhythmError::SettingsError(format!(
                "bar length of {} ticks ({} at {} ticks per quarter) is out of range",
                bar_duration, self.time_signature, self.ticks_per_quarter
            )));
        }
        if self.threshold < 0 {
            return Err(RhythmError::SettingsError(format!(
                "threshold must not be negative, got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Length of one bar in ticks, saturating for unvalidated settings
    pub fn bar_duration(&self) -> i32 {
        self.bar_duration_i64().clamp(0, i64::from(i32::MAX)) as i32
    }

    fn bar_duration_i64(&self) -> i64 {
        i64::from(self.ticks_per_quarter) * 4 * i64::from(self.time_signature.beats)
            / i64::from(self.time_signature.beat_type.max(1))
    }
}
