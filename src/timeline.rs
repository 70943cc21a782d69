//! # Timeline Rendering
//!
//! Offline counterpart of the [`Player`](crate::playback::Player): runs one
//! pass of a tune and lays out every note and rest on an absolute time axis,
//! without waiting. Timing is identical to a live performance: a note occupies
//! its sounding time and then the silence it owes, and the next event starts
//! after both.
//!
//! The result serializes with camelCase keys for JSON/YAML output:
//!
//! ```json
//! {
//!   "events": [
//!     { "startMicros": 0, "kind": "note", "scaleIndex": 49, "frequencyHz": 1046.5,
//!       "soundMicros": 437500, "silenceMicros": 62500 }
//!   ],
//!   "totalMicros": 500000,
//!   "repeats": false
//! }
//! ```

use serde::Serialize;

use crate::engine::pitch_of;
use crate::error::TuneError;
use crate::interpreter::{is_blank, Event, Interpreter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Note,
    Rest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedEvent {
    pub start_micros: u64,
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_index: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_hz: Option<f64>,
    /// Audible time for notes, the whole duration for rests
    pub sound_micros: u64,
    pub silence_micros: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub events: Vec<TimedEvent>,
    /// Length of one pass, including the silence after the last note
    pub total_micros: u64,
    /// Whether a live performance would start over after this pass
    pub repeats: bool,
}

/// Render one pass of `tune`.
///
/// Returns the first tune error instead of a partial timeline. A blank tune
/// is [`TuneError::EmptyOrClearedTune`].
pub fn render_timeline(tune: &str) -> Result<Timeline, TuneError> {
    if is_blank(tune) {
        return Err(TuneError::EmptyOrClearedTune);
    }

    let mut interpreter = Interpreter::new();
    interpreter.reset(tune);

    let mut events = Vec::new();
    let mut clock: u64 = 0;

    while let Some(event) = interpreter.next_event()? {
        let timed = match event {
            Event::Note { index, sound, silence } => TimedEvent {
                start_micros: clock,
                kind: EventKind::Note,
                scale_index: Some(index),
                frequency_hz: Some(pitch_of(index)),
                sound_micros: sound.as_micros() as u64,
                silence_micros: silence.as_micros() as u64,
            },
            Event::Rest { duration } => TimedEvent {
                start_micros: clock,
                kind: EventKind::Rest,
                scale_index: None,
                frequency_hz: None,
                sound_micros: duration.as_micros() as u64,
                silence_micros: 0,
            },
        };
        clock += timed.sound_micros + timed.silence_micros;
        events.push(timed);
    }

    Ok(Timeline {
        events,
        total_micros: clock,
        repeats: interpreter.repeat(),
    })
}
