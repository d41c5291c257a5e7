//! # Input Documents
//!
//! Reads a performance from a plain text document: optional YAML frontmatter
//! with quantization [`Settings`], followed by one event per line.
//!
//! ## Format
//! ```text
//! ---
//! time-signature: 3/4
//! ---
//! # tick duration pitch velocity
//! 0    480 60 90
//! 497  460 62 90
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Every other line must
//! hold exactly four integers; pitch and velocity are MIDI values (0-127).

use crate::error::RhythmError;
use crate::event::TimedEvent;
use crate::settings::Settings;

/// A parsed input document
#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    pub settings: Settings,
    pub events: Vec<TimedEvent>,
}

/// Parse an input document into settings and events
pub fn parse(source: &str) -> Result<Performance, RhythmError> {
    let (frontmatter, body) = extract_frontmatter(source);

    let settings = match frontmatter {
        Some(yaml) => Settings::from_yaml(&yaml)?,
        None => Settings::default(),
    };

    let mut events = Vec::new();
    for (line_number, line) in body {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        events.push(parse_event(line, line_number)?);
    }

    tracing::debug!(events = events.len(), "parsed input document");
    Ok(Performance { settings, events })
}

/// Extract the YAML frontmatter between `---` markers.
///
/// Returns the frontmatter (if any) and the remaining lines paired with their
/// 1-based line numbers in the original source.
fn extract_frontmatter(source: &str) -> (Option<String>, Vec<(usize, &str)>) {
    let lines: Vec<&str> = source.lines().collect();

    // Frontmatter must open the document, ignoring leading blank lines
    let start = lines.iter().position(|line| !line.trim().is_empty());
    let start = match start {
        Some(i) if lines[i].trim() == "---" => i,
        _ => return (None, number_lines(&lines, 0)),
    };

    let end = lines[start + 1..]
        .iter()
        .position(|line| line.trim() == "---")
        .map(|offset| start + 1 + offset);

    match end {
        Some(end) => {
            let frontmatter = lines[start + 1..end].join("\n");
            (Some(frontmatter), number_lines(&lines[end + 1..], end + 1))
        }
        // Unterminated block: treat everything as events so the stray marker is reported
        None => (None, number_lines(&lines, 0)),
    }
}

fn number_lines<'a>(lines: &[&'a str], first_index: usize) -> Vec<(usize, &'a str)> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| (first_index + i + 1, *line))
        .collect()
}

fn parse_event(line: &str, line_number: usize) -> Result<TimedEvent, RhythmError> {
    let error = |message: String| RhythmError::ParseError {
        line: line_number,
        message,
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(error(format!(
            "expected 4 fields (tick duration pitch velocity), found {}",
            fields.len()
        )));
    }

    let tick: i32 = fields[0]
        .parse()
        .map_err(|_| error(format!("invalid tick: {}", fields[0])))?;
    let duration: i32 = fields[1]
        .parse()
        .map_err(|_| error(format!("invalid duration: {}", fields[1])))?;
    let pitch: i8 = fields[2]
        .parse()
        .ok()
        .filter(|p| *p >= 0)
        .ok_or_else(|| error(format!("pitch must be between 0 and 127, got {}", fields[2])))?;
    let velocity: i8 = fields[3]
        .parse()
        .ok()
        .filter(|v| *v >= 0)
        .ok_or_else(|| error(format!("velocity must be between 0 and 127, got {}", fields[3])))?;

    if tick < 0 {
        return Err(error(format!("tick must not be negative, got {}", tick)));
    }
    if duration < 0 {
        return Err(error(format!("duration must not be negative, got {}", duration)));
    }
    if tick.checked_add(duration).is_none() {
        return Err(error(format!(
            "event ends past the largest tick {}",
            i32::MAX
        )));
    }

    Ok(TimedEvent::new(tick, duration, pitch, velocity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events_without_frontmatter() {
        let performance = parse("0 480 60 90\n480 240 62 80\n").unwrap();
        assert_eq!(performance.settings, Settings::default());
        assert_eq!(
            performance.events,
            vec![
                TimedEvent::new(0, 480, 60, 90),
                TimedEvent::new(480, 240, 62, 80),
            ]
        );
    }

    #[test]
    fn test_parse_with_frontmatter() {
        let source = "---\ntime-signature: 3/4\nbars: 1\n---\n0 480 60 90\n";
        let performance = parse(source).unwrap();
        assert_eq!(performance.settings.time_signature.beats, 3);
        assert_eq!(performance.settings.bars, Some(1));
        assert_eq!(performance.events.len(), 1);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let source = "# header\n\n  0 480 60 90  \n# trailing\n";
        let performance = parse(source).unwrap();
        assert_eq!(performance.events, vec![TimedEvent::new(0, 480, 60, 90)]);
    }

    #[test]
    fn test_error_line_counts_frontmatter() {
        let source = "---\nthreshold: 10\n---\n0 480 60 90\n0 480 60\n";
        match parse(source) {
            Err(RhythmError::ParseError { line, message }) => {
                assert_eq!(line, 5);
                assert!(message.contains("found 3"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_out_of_range_pitch() {
        assert!(matches!(
            parse("0 480 128 90"),
            Err(RhythmError::ParseError { line: 1, .. })
        ));
        assert!(matches!(
            parse("0 480 60 -1"),
            Err(RhythmError::ParseError { line: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_non_numeric_and_negative() {
        assert!(parse("zero 480 60 90").is_err());
        assert!(parse("-10 480 60 90").is_err());
        assert!(parse("0 -480 60 90").is_err());
    }

    #[test]
    fn test_rejects_event_ending_past_tick_range() {
        assert!(parse("0 2147483647 60 90").is_ok());
        match parse("0 480 60 90\n10 2147483647 60 90") {
            Err(RhythmError::ParseError { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("largest tick"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_frontmatter_is_settings_error() {
        let source = "---\ntime-signature: 5/5\n---\n0 480 60 90\n";
        assert!(matches!(parse(source), Err(RhythmError::SettingsError(_))));
    }

    #[test]
    fn test_unterminated_frontmatter() {
        let source = "---\nbars: 1\n0 480 60 90\n";
        assert!(matches!(
            parse(source),
            Err(RhythmError::ParseError { line: 1, .. })
        ));
    }
}
