pub mod beat;
pub mod clip;
pub mod error;
pub mod event;
pub mod input;
pub mod quantize;
pub mod settings;
pub mod timeline;

pub use beat::{Beat, BeatContent, DivisionSet, Events, Subdivision, MAX_BEST_FIT_DIVISIONS, MAX_DIVISIONS};
pub use clip::Clip;
pub use error::*;
pub use event::{Payload, TimedEvent};
pub use input::{parse, Performance};
pub use quantize::Quantizer;
pub use settings::{Settings, TimeSignature};
pub use timeline::{Repeater, Temporal, Timeline, Window};

/// Quantize an input document into a rhythm tree.
/// This is the main entry point for the library.
pub fn quantize(source: &str) -> Result<Beat, RhythmError> {
    let performance = parse(source)?;
    Quantizer::new(performance.settings).quantize(&performance.events)
}
