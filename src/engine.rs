//! Duration and pitch arithmetic.
//!
//! All durations are computed in whole microseconds with `u32` integer math and
//! only converted to [`Duration`] at the end. Division truncates at every step,
//! including each dot extension, so multi-dot notes lose a little time the
//! same way on every host.

use std::time::Duration;

use crate::ast::Mode;

/// Semitone offsets from C for the letters A through G
pub const LETTER_SEMITONES: [u8; 7] = [9, 11, 0, 2, 4, 5, 7];

/// Highest scale index (B in octave 6)
pub const MAX_SCALE_INDEX: u8 = 84;

/// Scale index of the 880 Hz reference tone
pub const REFERENCE_INDEX: u8 = 46;

pub const REFERENCE_HZ: f64 = 880.0;

/// Microseconds in a whole note: 60,000,000 µs/min × 4 quarters ÷ tempo.
pub fn whole_note_micros(tempo: u32) -> u32 {
    240_000_000 / tempo.max(1)
}

/// Sounding and trailing-silence time of one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteTiming {
    pub sound: Duration,
    pub silence: Duration,
}

/// Split a note of the given length code into sounding time and the silence
/// owed after it, then extend the sounding part by `dots`.
///
/// ```
/// use std::time::Duration;
/// use playtone::{engine::note_timing, Mode};
///
/// // quarter note at T120: 500ms, 1/8 of it silent in normal mode
/// let t = note_timing(4, 0, 120, Mode::Normal);
/// assert_eq!(t.sound, Duration::from_micros(437_500));
/// assert_eq!(t.silence, Duration::from_micros(62_500));
/// ```
pub fn note_timing(note_length: u32, dots: u32, tempo: u32, mode: Mode) -> NoteTiming {
    let base = whole_note_micros(tempo) / note_length.max(1);

    let silence = match mode {
        Mode::Normal => base / 8,
        Mode::Staccato => base / 4,
        Mode::Legato => 0,
    };

    let sound = extend_by_dots(base - silence, dots);

    NoteTiming {
        sound: Duration::from_micros(u64::from(sound)),
        silence: Duration::from_micros(u64::from(silence)),
    }
}

/// Length of a rest; no articulation split, same dot extension as notes.
pub fn rest_timing(length: u32, dots: u32, tempo: u32) -> Duration {
    let base = whole_note_micros(tempo) / length.max(1);
    Duration::from_micros(u64::from(extend_by_dots(base, dots)))
}

fn extend_by_dots(period: u32, dots: u32) -> u32 {
    let mut period = period;
    let mut extension = period / 2;

    for _ in 0..dots {
        if extension == 0 {
            // every further dot adds nothing
            break;
        }
        period += extension;
        extension /= 2;
    }

    period
}

/// Equal-tempered frequency of a scale index, tuned to 880 Hz at index 46.
///
/// `index` must be in `1..=84`; 0 means "rest" and is resolved by the caller.
pub fn pitch_of(index: u8) -> f64 {
    let steps = f64::from(index) - f64::from(REFERENCE_INDEX);
    REFERENCE_HZ * (steps / 12.0).exp2()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_whole_note_period() {
        assert_eq!(whole_note_micros(120), 2_000_000);
        assert_eq!(whole_note_micros(32), 7_500_000);
        assert_eq!(whole_note_micros(255), 941_176);
    }

    #[test]
    fn test_articulation_split() {
        // quarter at T120 = 500_000us
        let normal = note_timing(4, 0, 120, Mode::Normal);
        assert_eq!(normal.silence, Duration::from_micros(62_500));
        assert_eq!(normal.sound, Duration::from_micros(437_500));

        let staccato = note_timing(4, 0, 120, Mode::Staccato);
        assert_eq!(staccato.silence, Duration::from_micros(125_000));
        assert_eq!(staccato.sound, Duration::from_micros(375_000));

        let legato = note_timing(4, 0, 120, Mode::Legato);
        assert_eq!(legato.silence, Duration::ZERO);
        assert_eq!(legato.sound, Duration::from_micros(500_000));
    }

    #[test]
    fn test_zero_length_treated_as_whole() {
        assert_eq!(note_timing(0, 0, 120, Mode::Legato).sound, Duration::from_micros(2_000_000));
        assert_eq!(rest_timing(0, 0, 120), Duration::from_micros(2_000_000));
    }

    #[test]
    fn test_single_dot() {
        // legato quarter: 500_000 + 250_000
        let t = note_timing(4, 1, 120, Mode::Legato);
        assert_eq!(t.sound, Duration::from_micros(750_000));
        assert_eq!(rest_timing(4, 1, 120), Duration::from_micros(750_000));
    }

    #[test]
    fn test_dot_extension_truncates_each_step() {
        // T255 L64: whole = 941_176, base = 14_705
        // normal: silence 1_838, sound 12_867, ext 6_433 -> 3_216 -> 1_608
        let t = note_timing(64, 3, 255, Mode::Normal);
        assert_eq!(t.silence, Duration::from_micros(1_838));
        assert_eq!(t.sound, Duration::from_micros(12_867 + 6_433 + 3_216 + 1_608));
    }

    #[test]
    fn test_dots_stop_contributing() {
        let many = rest_timing(4, 40, 120);
        let enough = rest_timing(4, 20, 120);
        assert_eq!(many, enough);
    }

    #[test]
    fn test_reference_pitches() {
        assert_eq!(pitch_of(46), 880.0);
        assert_relative_eq!(pitch_of(58), 1760.0, epsilon = 1e-9);
        assert_relative_eq!(pitch_of(34), 440.0, epsilon = 1e-9);
        assert_relative_eq!(pitch_of(47), 880.0 * 2f64.powf(1.0 / 12.0), epsilon = 1e-9);
    }

    #[test]
    fn test_letter_table() {
        assert_eq!(LETTER_SEMITONES, [9, 11, 0, 2, 4, 5, 7]);
    }
}
