//! # Tune Interpreter
//!
//! Gives meaning to the tokens produced by the [`Lexer`]: control tokens
//! update the [`PerformanceState`], notes and rests resolve to an [`Event`]
//! with physical durations from the [`engine`](crate::engine).
//!
//! The interpreter knows nothing about time passing. The
//! [`Player`](crate::playback::Player) decides when to ask for the next event;
//! the [`timeline`](crate::timeline) asks for all of them at once.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use playtone::interpreter::{Event, Interpreter};
//!
//! let mut interpreter = Interpreter::new();
//! interpreter.reset("T120 L4 C P8");
//!
//! match interpreter.next_event().unwrap() {
//!     Some(Event::Note { index, sound, silence }) => {
//!         assert_eq!(index, 49); // C, octave 4
//!         assert_eq!(sound, Duration::from_micros(437_500));
//!         assert_eq!(silence, Duration::from_micros(62_500));
//!     }
//!     other => panic!("expected a note, got {:?}", other),
//! }
//! assert_eq!(
//!     interpreter.next_event().unwrap(),
//!     Some(Event::Rest { duration: Duration::from_micros(250_000) })
//! );
//! assert_eq!(interpreter.next_event().unwrap(), None);
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::ast::{Accidental, LocatedToken, Mode, Token};
use crate::engine::{note_timing, rest_timing, LETTER_SEMITONES, MAX_SCALE_INDEX};
use crate::error::TuneError;
use crate::lexer::{is_space, Lexer};

pub const DEFAULT_TEMPO: u32 = 120;
pub const DEFAULT_NOTE_LENGTH: u32 = 4;
pub const DEFAULT_OCTAVE: u32 = 4;
pub const MAX_OCTAVE: u32 = 6;
pub const MIN_TEMPO: u32 = 32;
pub const MAX_TEMPO: u32 = 255;

/// Mutable state of one performance, reset at the start of every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceState {
    /// Quarter notes per minute, 32..=255
    pub tempo: u32,
    /// Default note length code (1 = whole, 4 = quarter, ...)
    pub note_length: u32,
    /// 0..=6
    pub octave: u32,
    pub mode: Mode,
    /// Restart from the top when the tune ends
    pub repeat: bool,
    /// Silence owed before the next event may start
    pub pending_silence: Duration,
}

impl Default for PerformanceState {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            note_length: DEFAULT_NOTE_LENGTH,
            octave: DEFAULT_OCTAVE,
            mode: Mode::Normal,
            repeat: false,
            pending_silence: Duration::ZERO,
        }
    }
}

/// One playable unit resolved from the tune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Sound scale index `index` for `sound`, then stay silent for `silence`.
    Note {
        index: u8,
        sound: Duration,
        silence: Duration,
    },
    /// Stay silent for `duration`.
    Rest { duration: Duration },
}

impl Event {
    /// Total time the event occupies, including the silence after a note.
    pub fn span(&self) -> Duration {
        match self {
            Event::Note { sound, silence, .. } => *sound + *silence,
            Event::Rest { duration } => *duration,
        }
    }
}

/// True when a tune has nothing but whitespace before its end.
pub fn is_blank(tune: &str) -> bool {
    tune.chars().take_while(|c| *c != '\0').all(is_space)
}

#[derive(Debug, Default)]
pub struct Interpreter {
    state: PerformanceState,
    lexer: Option<Lexer>,
    events_this_pass: usize,
    /// Sum of the spans of this pass's events
    time_this_pass: Duration,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore default state and put the cursor at the start of `tune`.
    pub fn reset(&mut self, tune: impl Into<Arc<str>>) {
        self.state = PerformanceState::default();
        self.lexer = Some(Lexer::new(tune));
        self.events_this_pass = 0;
        self.time_this_pass = Duration::ZERO;
    }

    /// Drop the tune view; the next call to `next_event` reports
    /// [`TuneError::EmptyOrClearedTune`].
    pub fn clear(&mut self) {
        self.lexer = None;
    }

    pub fn state(&self) -> &PerformanceState {
        &self.state
    }

    /// The tune currently being scanned
    pub fn source(&self) -> Option<&Arc<str>> {
        self.lexer.as_ref().map(Lexer::source)
    }

    pub fn repeat(&self) -> bool {
        self.state.repeat
    }

    pub fn events_this_pass(&self) -> usize {
        self.events_this_pass
    }

    /// Time the events of this pass occupy, owed silences included
    pub fn time_this_pass(&self) -> Duration {
        self.time_this_pass
    }

    /// Capture and clear the silence owed by the previous note.
    pub fn take_silence(&mut self) -> Duration {
        std::mem::take(&mut self.state.pending_silence)
    }

    /// Consume tokens until one resolves to a playable event.
    ///
    /// Returns `Ok(None)` at the end of the tune. On error the repeat flag is
    /// forced off so a broken tune never loops.
    pub fn next_event(&mut self) -> Result<Option<Event>, TuneError> {
        let result = self.scan();
        if result.is_err() {
            self.state.repeat = false;
        }
        result
    }

    fn scan(&mut self) -> Result<Option<Event>, TuneError> {
        loop {
            let lexer = self.lexer.as_mut().ok_or(TuneError::EmptyOrClearedTune)?;
            let Some(located) = lexer.next_token()? else {
                return Ok(None);
            };

            debug!(line = located.line, column = located.column, token = ?located.token, "token");

            if let Some(event) = self.apply(located)? {
                self.events_this_pass += 1;
                self.time_this_pass += event.span();
                return Ok(Some(event));
            }
        }
    }

    fn apply(&mut self, located: LocatedToken) -> Result<Option<Event>, TuneError> {
        let LocatedToken { token, line, column } = located;
        let state = &mut self.state;

        match token {
            Token::Length(length) => {
                if length < 1 {
                    return Err(TuneError::InvalidLengthCode { length, line, column });
                }
                state.note_length = length;
            }
            Token::Octave(octave) => state.octave = octave.min(MAX_OCTAVE),
            Token::OctaveDown => state.octave = state.octave.saturating_sub(1),
            Token::OctaveUp => state.octave = (state.octave + 1).min(MAX_OCTAVE),
            Token::Mode(mode) => state.mode = mode,
            Token::Repeat(repeat) => state.repeat = repeat,
            Token::Tempo(tempo) => {
                if !(MIN_TEMPO..=MAX_TEMPO).contains(&tempo) {
                    return Err(TuneError::TempoOutOfRange { tempo, line, column });
                }
                state.tempo = tempo;
            }
            Token::Pause { length, dots } => {
                let duration = rest_timing(length, dots, state.tempo);
                return Ok(Some(Event::Rest { duration }));
            }
            Token::Number { index, dots } => {
                if index > u32::from(MAX_SCALE_INDEX) {
                    return Err(TuneError::NoteIndexOutOfRange { index, line, column });
                }
                if index == 0 {
                    let duration = rest_timing(state.note_length, dots, state.tempo);
                    return Ok(Some(Event::Rest { duration }));
                }
                let note_length = state.note_length;
                return Ok(Some(self.note(index as u8, note_length, dots)));
            }
            Token::Note {
                letter,
                accidental,
                length,
                dots,
            } => {
                // octave is at most 6, so this stays within 1..=84
                let base = u32::from(LETTER_SEMITONES[letter.table_index()]) + state.octave * 12 + 1;
                let index = match accidental {
                    Accidental::Sharp => (base + 1).min(u32::from(MAX_SCALE_INDEX)),
                    Accidental::Flat => base.saturating_sub(1).max(1),
                    Accidental::Natural => base,
                };
                let note_length = if length == 0 { state.note_length } else { length };
                return Ok(Some(self.note(index as u8, note_length, dots)));
            }
        }

        Ok(None)
    }

    fn note(&mut self, index: u8, note_length: u32, dots: u32) -> Event {
        let timing = note_timing(note_length, dots, self.state.tempo, self.state.mode);
        self.state.pending_silence = timing.silence;
        Event::Note {
            index,
            sound: timing.sound,
            silence: timing.silence,
        }
    }
}
