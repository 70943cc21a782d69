pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod metadata;
pub mod playback;
pub mod timeline;

pub use ast::*;
pub use config::PlayerConfig;
pub use error::*;
pub use interpreter::{Event, Interpreter, PerformanceState};
pub use metadata::{parse_tune_file, TuneFile, TuneMetadata};
pub use playback::{Player, PlayerHandle, PlayerState, ToneGenerator};
pub use timeline::{render_timeline, Timeline};

/// Render a tune file (front matter plus tune) to its metadata and timeline.
/// This is the main entry point for offline use.
pub fn render(source: &str) -> Result<(TuneMetadata, Timeline), PlayError> {
    let file = parse_tune_file(source)?;
    let timeline = render_timeline(&file.tune)?;
    Ok((file.metadata, timeline))
}

/// Validate tune text without producing output. Returns the number of notes
/// and rests in one pass.
///
/// Errors are reported in the order playback would hit them.
pub fn check(tune: &str) -> Result<usize, TuneError> {
    Ok(render_timeline(tune)?.events.len())
}
