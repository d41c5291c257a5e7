//! # Error Types
//!
//! This module defines the error type shared by the whole crate.
//!
//! The tree operations themselves are total: `divide` with zero divisions is a
//! no-op and `cut` clamps out-of-range ticks. Errors only come from the caller
//! boundary (reading an input document, bad settings) or from contract
//! violations that must not silently produce nonsense.
//!
//! ## Error Types
//! - `ParseError` - Malformed event line in an input document, with line number
//! - `SettingsError` - Invalid YAML frontmatter or out-of-range setting
//! - `SubBeatOutOfRange` - `sub_beat(idx)` on a beat that has no such child
//! - `TooManyDivisions` - Division count wider than the onset/sounding bitmasks
//!
//! ## Usage
//! ```rust
//! use rhythm_tree::{quantize, RhythmError};
//!
//! match quantize("0 480 60 90") {
//!     Ok(beat) => println!("{}", beat.to_pretty_string()),
//!     Err(RhythmError::ParseError { line, message }) => {
//!         eprintln!("Parse error at line {}: {}", line, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RhythmError {
    /// Parse error with location information.
    ///
    /// Occurs when an event line of an input document is not four integers.
    ///
    /// # Example
    /// ```
    /// # use rhythm_tree::RhythmError;
    /// let err = RhythmError::ParseError {
    ///     line: 7,
    ///     message: "expected 4 fields, found 3".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Parse error at line 7: expected 4 fields, found 3");
    /// ```
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid settings error.
    ///
    /// Occurs when the YAML frontmatter cannot be read or holds unsupported values.
    ///
    /// # Example
    /// ```
    /// # use rhythm_tree::RhythmError;
    /// let err = RhythmError::SettingsError("time-signature must be in format N/D".to_string());
    /// assert_eq!(err.to_string(), "Invalid settings: time-signature must be in format N/D");
    /// ```
    #[error("Invalid settings: {0}")]
    SettingsError(String),

    /// Sub-beat lookup past the end of a beat's children.
    ///
    /// A beat that is not subdivided has zero sub-beats.
    #[error("Sub-beat index {index} out of range for a beat with {count} sub-beats")]
    SubBeatOutOfRange { index: usize, count: usize },

    /// Division count wider than the onset/sounding flag masks.
    #[error("Division count {divisions} exceeds the maximum of {max}")]
    TooManyDivisions { divisions: u32, max: u32 },
}
