//! # Error Types
//!
//! Two layers of errors:
//! - [`TuneError`] - problems in the tune text itself. During live playback these
//!   end the current pass (silence, no repeat) and are recorded on the player;
//!   offline APIs return them directly.
//! - [`PlayError`] - everything the library surface and CLI can fail with,
//!   wrapping `TuneError` plus metadata, configuration, I/O and output
//!   failures, and a player task that is no longer running.
//!
//! Tune errors carry the line and column of the token that caused them.
//!
//! ## Usage
//! ```rust
//! use playtone::{lexer::tokenize, TuneError};
//!
//! match tokenize("T120 C D Z") {
//!     Err(TuneError::MalformedToken { column, .. }) => assert_eq!(column, 10),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TuneError {
    /// Unrecognized character, or a command missing its required argument.
    ///
    /// # Example
    /// ```
    /// # use playtone::TuneError;
    /// let err = TuneError::MalformedToken {
    ///     line: 1,
    ///     column: 4,
    ///     message: "Unexpected character 'Z'".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Malformed token at line 1, column 4: Unexpected character 'Z'");
    /// ```
    #[error("Malformed token at line {line}, column {column}: {message}")]
    MalformedToken {
        line: usize,
        column: usize,
        message: String,
    },

    /// `T` with a value outside 32..=255.
    #[error("Tempo {tempo} at line {line}, column {column} is outside 32..=255")]
    TempoOutOfRange { tempo: u32, line: usize, column: usize },

    /// `N` with a value above 84.
    #[error("Note index {index} at line {line}, column {column} is outside 0..=84")]
    NoteIndexOutOfRange { index: u32, line: usize, column: usize },

    /// `L` with a value below 1 (including a missing number).
    #[error("Note length {length} at line {line}, column {column} must be at least 1")]
    InvalidLengthCode { length: u32, line: usize, column: usize },

    /// There is no tune to scan: none was supplied, it was blank, or it was
    /// replaced or cleared while playback was in progress.
    #[error("Tune is empty or was cleared during playback")]
    EmptyOrClearedTune,
}

#[derive(Error, Debug)]
pub enum PlayError {
    #[error(transparent)]
    Tune(#[from] TuneError),

    #[error("Invalid metadata: {0}")]
    MetadataError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Player task has shut down")]
    PlayerClosed,
}
