//! # Token Types
//!
//! Lexical units of the PLAY notation. Each token is recognized on its own by
//! the [`lexer`](crate::lexer) and only afterwards given meaning by the
//! [`interpreter`](crate::interpreter), which owns the performance state.
//!
//! ```text
//! Token
//!   ├── Length(n)        Ln      default note length (1 = whole, 4 = quarter)
//!   ├── Octave(n)        On      current octave, clamped to 0..=6
//!   ├── OctaveDown       <
//!   ├── OctaveUp         >
//!   ├── Mode(mode)       MN ML MS
//!   ├── Repeat(bool)     MB MF
//!   ├── Pause            Pn...   rest for length n, with dots
//!   ├── Tempo(n)         Tn      quarter notes per minute, 32..=255
//!   ├── Number           Nn...   absolute scale index 0..=84 (0 = rest)
//!   └── Note             A-G [#+-] [n] [...]
//! ```

/// Articulation mode: how much of a note's nominal time is audible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// 7/8 sounding, 1/8 silent
    #[default]
    Normal,
    /// full length, no gap
    Legato,
    /// 3/4 sounding, 1/4 silent
    Staccato,
}

/// Note letters A through G
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Letter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Letter {
    /// Position in the A..G lookup table
    pub fn table_index(self) -> usize {
        self as usize
    }
}

/// Semitone step written right after a note letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accidental {
    #[default]
    Natural,
    /// `#` or `+`
    Sharp,
    /// `-`
    Flat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Length(u32),
    Octave(u32),
    OctaveDown,
    OctaveUp,
    Mode(Mode),
    Repeat(bool),
    Pause {
        length: u32,
        dots: u32,
    },
    Tempo(u32),
    Number {
        index: u32,
        dots: u32,
    },
    Note {
        letter: Letter,
        accidental: Accidental,
        /// One-shot length override; 0 when none was written
        length: u32,
        dots: u32,
    },
}

/// A token with the position of its first character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedToken {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}
