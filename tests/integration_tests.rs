//! Integration tests for playtone
//!
//! Tests the path from a tune file through the public API to tone output.

use std::time::Duration;

use playtone::playback::{Finish, ManualTimer, Player, PlayerState, Recorder, ToneCall};
use playtone::{check, render, render_timeline, PlayError, TuneError};

#[test]
fn test_render_tune_file() {
    let source = r#"---
title: Ode to Joy
composer: Beethoven
---
T120 L4 E E F G
G F E D
C C D E
E. D8 D2
"#;
    let (metadata, timeline) = render(source).unwrap();
    assert_eq!(metadata.title.as_deref(), Some("Ode to Joy"));
    assert_eq!(metadata.composer.as_deref(), Some("Beethoven"));
    assert_eq!(timeline.events.len(), 15);
    // 16 beats at 120 bpm, less the 31.25ms a dot does not add to the owed silence
    assert_eq!(timeline.total_micros, 7_968_750);
    assert!(!timeline.repeats);
}

#[test]
fn test_render_reports_bad_metadata() {
    let result = render("---\ntitle: [\n---\nC");
    assert!(matches!(result, Err(PlayError::MetadataError(_))));
}

#[test]
fn test_render_reports_tune_errors() {
    let result = render("---\ntitle: Broken\n---\nC D\nE Q");
    match result {
        Err(PlayError::Tune(TuneError::MalformedToken { line, column, .. })) => {
            assert_eq!((line, column), (2, 3));
        }
        other => panic!("Expected malformed token, got {:?}", other),
    }
}

#[test]
fn test_check_counts_events() {
    assert_eq!(check("T200 MS L8 CDEFGAB>C"), Ok(8));
    assert_eq!(check("MB P4"), Ok(1));
    assert_eq!(
        check("L4 T300 C"),
        Err(TuneError::TempoOutOfRange { tempo: 300, line: 1, column: 4 })
    );
    assert_eq!(check(""), Err(TuneError::EmptyOrClearedTune));
}

#[test]
fn test_check_reports_first_error_in_playback_order() {
    // the bad tempo comes before the unknown character
    let expected = TuneError::TempoOutOfRange { tempo: 10, line: 1, column: 1 };
    assert_eq!(check("T10 C Z"), Err(expected.clone()));
    assert_eq!(render_timeline("T10 C Z"), Err(expected.clone()));

    let mut player = Player::new(Recorder::new(), ManualTimer::new());
    player.start("T10 C Z");
    assert_eq!(player.status().last_finish, Some(Finish::Failed(expected)));
}

#[test]
fn test_lowercase_and_compact_tunes() {
    let compact = render_timeline("t150l8o3cdefgab").unwrap();
    let spaced = render_timeline("T150 L8 O3 C D E F G A B").unwrap();
    assert_eq!(compact, spaced);
}

#[test]
fn test_whitespace_inside_numbers() {
    let split = render_timeline("T 1 5 0 L 1 6 C").unwrap();
    let joined = render_timeline("T150 L16 C").unwrap();
    assert_eq!(split.total_micros, joined.total_micros);
}

#[test]
fn test_player_follows_timeline() {
    let tune = "T140 O3 L8 MS E D# E D# E < B > D C < A4 P8 ML C E A B4";
    let timeline = render_timeline(tune).unwrap();

    let recorder = Recorder::new();
    let mut player = Player::new(recorder.clone(), ManualTimer::new());
    player.start(tune);
    player.run(1000);

    assert_eq!(player.state(), PlayerState::Stopped);
    assert_eq!(player.status().last_finish, Some(Finish::Completed));
    assert_eq!(player.timer().now(), Duration::from_micros(timeline.total_micros));

    let expected: Vec<f64> = timeline.events.iter().filter_map(|e| e.frequency_hz).collect();
    assert_eq!(recorder.sounded(), expected);
    assert_eq!(recorder.calls().last(), Some(&ToneCall::Silence));
}

#[test]
fn test_player_loops_until_stopped() {
    let recorder = Recorder::new();
    let mut player = Player::new(recorder.clone(), ManualTimer::new());
    player.start("MB T240 L16 C E G");
    player.run(60);
    assert_eq!(player.state(), PlayerState::Sounding);
    assert_eq!(player.status().passes, 11);

    player.stop();
    assert_eq!(player.run(10), 0);
    assert!(!recorder.is_sounding());
    assert_eq!(player.status().last_finish, Some(Finish::Cancelled));
}
