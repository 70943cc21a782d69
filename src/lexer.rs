use std::sync::Arc;

use crate::ast::{Accidental, Letter, LocatedToken, Mode, Token};
use crate::error::TuneError;

/// Incremental scanner over a tune.
///
/// Whitespace is insignificant everywhere, including between the digits of a
/// number, and letters are case-insensitive. A NUL character ends the tune the
/// same way the end of the string does.
#[derive(Debug, Clone)]
pub struct Lexer {
    input: Arc<str>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: impl Into<Arc<str>>) -> Self {
        Self {
            input: input.into(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// The tune this lexer is scanning
    pub fn source(&self) -> &Arc<str> {
        &self.input
    }

    /// Byte offset of the cursor
    pub fn position(&self) -> usize {
        self.position
    }

    fn current(&self) -> Option<char> {
        match self.input[self.position..].chars().next() {
            Some('\0') | None => None,
            Some(c) => Some(c),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skip whitespace and return the upper-cased next character without
    /// consuming it.
    fn next_char(&mut self) -> Option<char> {
        while let Some(c) = self.current() {
            if !is_space(c) {
                return Some(c.to_ascii_uppercase());
            }
            self.advance();
        }
        None
    }

    /// Consume a decimal number; 0 when no digit follows.
    fn next_number(&mut self) -> u32 {
        let mut number: u32 = 0;
        while let Some(digit) = self.next_char().and_then(|c| c.to_digit(10)) {
            self.advance();
            number = number.saturating_mul(10).saturating_add(digit);
        }
        number
    }

    fn next_dots(&mut self) -> u32 {
        let mut dots = 0;
        while self.next_char() == Some('.') {
            self.advance();
            dots += 1;
        }
        dots
    }

    /// Scan the next token. `Ok(None)` marks the end of the tune.
    pub fn next_token(&mut self) -> Result<Option<LocatedToken>, TuneError> {
        let Some(c) = self.next_char() else {
            return Ok(None);
        };
        let line = self.line;
        let column = self.column;
        self.advance();

        let token = match c {
            'L' => Token::Length(self.next_number()),
            'O' => Token::Octave(self.next_number()),
            '<' => Token::OctaveDown,
            '>' => Token::OctaveUp,
            'M' => {
                let token = match self.next_char() {
                    Some('N') => Token::Mode(Mode::Normal),
                    Some('L') => Token::Mode(Mode::Legato),
                    Some('S') => Token::Mode(Mode::Staccato),
                    Some('F') => Token::Repeat(false),
                    Some('B') => Token::Repeat(true),
                    Some(other) => {
                        return Err(TuneError::MalformedToken {
                            line,
                            column,
                            message: format!("Unknown music option 'M{}'. Expected MN, ML, MS, MF or MB", other),
                        });
                    }
                    None => {
                        return Err(TuneError::MalformedToken {
                            line,
                            column,
                            message: "Tune ends after 'M'. Expected MN, ML, MS, MF or MB".to_string(),
                        });
                    }
                };
                self.advance();
                token
            }
            'P' => {
                let length = self.next_number();
                let dots = self.next_dots();
                Token::Pause { length, dots }
            }
            'T' => Token::Tempo(self.next_number()),
            'N' => {
                let index = self.next_number();
                let dots = self.next_dots();
                Token::Number { index, dots }
            }
            'A' => self.note(Letter::A),
            'B' => self.note(Letter::B),
            'C' => self.note(Letter::C),
            'D' => self.note(Letter::D),
            'E' => self.note(Letter::E),
            'F' => self.note(Letter::F),
            'G' => self.note(Letter::G),
            _ => {
                return Err(TuneError::MalformedToken {
                    line,
                    column,
                    message: format!("Unexpected character: '{}'", c),
                });
            }
        };

        Ok(Some(LocatedToken { token, line, column }))
    }

    /// Accidental, shorthand length and dots following a note letter.
    fn note(&mut self, letter: Letter) -> Token {
        let accidental = match self.next_char() {
            Some('#') | Some('+') => {
                self.advance();
                Accidental::Sharp
            }
            Some('-') => {
                self.advance();
                Accidental::Flat
            }
            _ => Accidental::Natural,
        };
        let length = self.next_number();
        let dots = self.next_dots();
        Token::Note {
            letter,
            accidental,
            length,
            dots,
        }
    }

    /// Scan the rest of the tune.
    pub fn tokenize(&mut self) -> Result<Vec<LocatedToken>, TuneError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// ASCII whitespace as the C locale defines it, vertical tab included.
pub(crate) fn is_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0B'
}

/// Tokenize a whole tune, stopping at the first error.
pub fn tokenize(source: &str) -> Result<Vec<LocatedToken>, TuneError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token_types(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_simple_notes() {
        assert_eq!(
            token_types("C D E"),
            vec![
                Token::Note { letter: Letter::C, accidental: Accidental::Natural, length: 0, dots: 0 },
                Token::Note { letter: Letter::D, accidental: Accidental::Natural, length: 0, dots: 0 },
                Token::Note { letter: Letter::E, accidental: Accidental::Natural, length: 0, dots: 0 },
            ]
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(token_types("t200 l8 c"), token_types("T200 L8 C"));
    }

    #[test]
    fn test_accidentals_and_shorthand_length() {
        assert_eq!(
            token_types("C#8. E-16 F+"),
            vec![
                Token::Note { letter: Letter::C, accidental: Accidental::Sharp, length: 8, dots: 1 },
                Token::Note { letter: Letter::E, accidental: Accidental::Flat, length: 16, dots: 0 },
                Token::Note { letter: Letter::F, accidental: Accidental::Sharp, length: 0, dots: 0 },
            ]
        );
    }

    #[test]
    fn test_whitespace_inside_numbers() {
        assert_eq!(token_types("L1 6"), vec![Token::Length(16)]);
        assert_eq!(token_types("T 1\t2\n0"), vec![Token::Tempo(120)]);
    }

    #[test]
    fn test_control_tokens() {
        assert_eq!(
            token_types("O3 < > MN ML MS MF MB"),
            vec![
                Token::Octave(3),
                Token::OctaveDown,
                Token::OctaveUp,
                Token::Mode(Mode::Normal),
                Token::Mode(Mode::Legato),
                Token::Mode(Mode::Staccato),
                Token::Repeat(false),
                Token::Repeat(true),
            ]
        );
    }

    #[test]
    fn test_pause_and_number() {
        assert_eq!(
            token_types("P4.. N0. N46"),
            vec![
                Token::Pause { length: 4, dots: 2 },
                Token::Number { index: 0, dots: 1 },
                Token::Number { index: 46, dots: 0 },
            ]
        );
    }

    #[test]
    fn test_missing_numbers_read_as_zero() {
        assert_eq!(token_types("L T O"), vec![Token::Length(0), Token::Tempo(0), Token::Octave(0)]);
    }

    #[test]
    fn test_huge_number_saturates() {
        assert_eq!(token_types("T99999999999999"), vec![Token::Tempo(u32::MAX)]);
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("C\n  D").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("C D Z").unwrap_err();
        match err {
            TuneError::MalformedToken { line, column, message } => {
                assert_eq!((line, column), (1, 5));
                assert!(message.contains("'Z'"));
            }
            other => panic!("Expected MalformedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_music_option() {
        assert!(matches!(tokenize("MX"), Err(TuneError::MalformedToken { .. })));
        assert!(matches!(tokenize("C M"), Err(TuneError::MalformedToken { column: 3, .. })));
    }

    #[test]
    fn test_only_ascii_whitespace_skipped() {
        assert_eq!(token_types("C\x0B\x0CD\r\n"), token_types("C D"));
        for tune in ["C\u{00A0}D", "C\u{3000}D"] {
            assert!(
                matches!(tokenize(tune), Err(TuneError::MalformedToken { column: 2, .. })),
                "{:?}",
                tune
            );
        }
    }

    #[test]
    fn test_every_letter() {
        let letters: Vec<Letter> = token_types("a b c d e f g")
            .into_iter()
            .map(|token| match token {
                Token::Note { letter, .. } => letter,
                other => panic!("Expected note, got {:?}", other),
            })
            .collect();
        assert_eq!(
            letters,
            vec![Letter::A, Letter::B, Letter::C, Letter::D, Letter::E, Letter::F, Letter::G]
        );
    }

    #[test]
    fn test_nul_ends_tune() {
        assert_eq!(token_types("C\0Z"), token_types("C"));
    }

    #[test]
    fn test_incremental_scanning() {
        let mut lexer = Lexer::new("T150 C");
        assert_eq!(lexer.next_token().unwrap().map(|t| t.token), Some(Token::Tempo(150)));
        // trailing whitespace is consumed while looking for more digits
        assert_eq!(lexer.position(), 5);
        assert!(lexer.next_token().unwrap().is_some());
        assert_eq!(lexer.next_token().unwrap(), None);
        assert_eq!(lexer.next_token().unwrap(), None);
    }
}
