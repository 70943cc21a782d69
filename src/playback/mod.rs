//! # Playback Module
//!
//! Plays a tune on a monophonic tone generator in real time without ever
//! blocking the caller.
//!
//! ## Sub-modules
//! - `player` - the playback state machine
//! - `tone` - [`ToneGenerator`] trait plus the [`Recorder`] and [`TracingTone`] outputs
//! - `timer` - [`Timer`] trait, [`Wake`] tags and the virtual-time [`ManualTimer`]
//! - `runtime` - hosts a player on a tokio task behind a [`PlayerHandle`]
//!
//! ## States
//!
//! ```text
//!   Idle, Stopped    ── start/restart ─────────────►  ScanningSilence
//!   ScanningSilence  ── silence owed: wait, wake ──►  ScanningSilence
//!   ScanningSilence  ── nothing owed ──────────────►  ScanningToken
//!   ScanningToken    ── note or rest: wait ────────►  Sounding
//!   ScanningToken    ── end of tune, MB ───────────►  ScanningSilence (new pass)
//!   ScanningToken    ── end of tune, or error ─────►  Stopped
//!   Sounding         ── wake: silence ─────────────►  ScanningSilence
//!   any              ── stop ──────────────────────►  Stopped
//! ```
//!
//! A note is sounded, then the player waits out its sounding time, silences
//! the output and waits out the silence the note owes before scanning on. At
//! the end of the tune an `MB` tune starts over; otherwise playback stops. Any
//! tune error silences the output and stops playback.
//!
//! ## Example
//! ```rust
//! use playtone::playback::{ManualTimer, Player, PlayerState, Recorder};
//!
//! let recorder = Recorder::new();
//! let mut player = Player::new(recorder.clone(), ManualTimer::new());
//! player.start("T120 L4 C D E");
//! assert_eq!(player.state(), PlayerState::Sounding);
//!
//! player.run(100);
//! assert_eq!(player.state(), PlayerState::Stopped);
//! assert_eq!(recorder.sounded().len(), 3);
//! assert_eq!(player.timer().now().as_millis(), 1500);
//! ```

mod player;
mod runtime;
mod timer;
mod tone;


pub use player::{Finish, Player, PlayerOptions, PlayerState, PlayerStatus};
pub use runtime::{spawn_player, PlayerHandle, TokioTimer};
pub use timer::{ManualTimer, Timer, Wake};
pub use tone::{Recorder, ToneCall, ToneGenerator, TracingTone};
