//! Playback state machine
//!
//! Alternates between waiting out a note (or the silence it owes) and parsing
//! the next event, one timer wake at a time.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::timer::{ManualTimer, Timer, Wake};
use super::tone::ToneGenerator;
use crate::engine::pitch_of;
use crate::error::TuneError;
use crate::interpreter::{is_blank, Event, Interpreter, PerformanceState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// Never started
    #[default]
    Idle,
    /// Waiting out owed silence before scanning resumes
    ScanningSilence,
    /// Consuming tune characters (only observable mid-step)
    ScanningToken,
    /// A note or rest is being waited out
    Sounding,
    /// Tune finished, failed or was stopped; `restart` plays it again
    Stopped,
}

/// How the most recent run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finish {
    Completed,
    /// Halted by `stop()`
    Cancelled,
    Failed(TuneError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerStatus {
    pub state: PlayerState,
    /// Passes started since the last `start`/`restart`
    pub passes: u32,
    pub last_finish: Option<Finish>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerOptions {
    /// Cap on passes through a repeating (`MB`) tune; `None` loops forever
    pub max_passes: Option<u32>,
}

/// Drives one tone generator from one tune.
///
/// Every wait goes through the [`Timer`]; the player never blocks. `start`,
/// `restart` and `stop` bump a generation counter, so any wake issued for a
/// superseded run is ignored when it arrives.
pub struct Player<G, T> {
    tone: G,
    timer: T,
    options: PlayerOptions,
    tune: Option<Arc<str>>,
    interpreter: Interpreter,
    state: PlayerState,
    generation: u64,
    sequence: u64,
    passes: u32,
    last_finish: Option<Finish>,
}

impl<G: ToneGenerator, T: Timer> Player<G, T> {
    pub fn new(tone: G, timer: T) -> Self {
        Self::with_options(tone, timer, PlayerOptions::default())
    }

    pub fn with_options(tone: G, timer: T, options: PlayerOptions) -> Self {
        Self {
            tone,
            timer,
            options,
            tune: None,
            interpreter: Interpreter::new(),
            state: PlayerState::Idle,
            generation: 0,
            sequence: 0,
            passes: 0,
            last_finish: None,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            state: self.state,
            passes: self.passes,
            last_finish: self.last_finish.clone(),
        }
    }

    pub fn performance(&self) -> &PerformanceState {
        self.interpreter.state()
    }

    /// The tune as last supplied by the caller
    pub fn tune(&self) -> Option<&Arc<str>> {
        self.tune.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tone(&self) -> &G {
        &self.tone
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Replace the tune and play it from the top.
    pub fn start(&mut self, tune: impl Into<Arc<str>>) {
        self.tune = Some(tune.into());
        self.restart();
    }

    /// Play the retained tune from the top, superseding any run in progress.
    pub fn restart(&mut self) {
        self.supersede();
        self.passes = 0;
        self.last_finish = None;

        match self.tune.clone() {
            Some(tune) if !is_blank(&tune) => {
                debug!(generation = self.generation, "starting tune");
                self.begin_pass(tune);
                self.advance();
            }
            _ => {
                self.interpreter.clear();
                self.finish(Finish::Failed(TuneError::EmptyOrClearedTune));
            }
        }
    }

    /// Silence the output and halt. The tune is kept for `restart`.
    pub fn stop(&mut self) {
        self.supersede();
        if matches!(
            self.state,
            PlayerState::ScanningSilence | PlayerState::ScanningToken | PlayerState::Sounding
        ) {
            self.finish(Finish::Cancelled);
        } else {
            self.state = PlayerState::Stopped;
        }
    }

    /// Swap the supplied tune without restarting. A run in progress notices on
    /// its next step that its tune is gone and stops.
    pub fn replace_tune(&mut self, tune: Option<Arc<str>>) {
        debug!(present = tune.is_some(), "tune replaced");
        self.tune = tune;
    }

    pub fn clear_tune(&mut self) {
        self.replace_tune(None);
    }

    /// Resume after a wait scheduled through the timer.
    pub fn on_wake(&mut self, wake: Wake) {
        if wake.generation != self.generation || wake.sequence != self.sequence {
            trace!(?wake, generation = self.generation, sequence = self.sequence, "ignoring stale wake");
            return;
        }
        if !matches!(self.state, PlayerState::Sounding | PlayerState::ScanningSilence) {
            trace!(?wake, state = ?self.state, "ignoring wake while not waiting");
            return;
        }
        if !self.tune_is_current() {
            self.end_pass(Err(TuneError::EmptyOrClearedTune));
            return;
        }

        if self.state == PlayerState::Sounding {
            self.tone.silence();
            self.state = PlayerState::ScanningSilence;
        }
        self.advance();
    }

    fn supersede(&mut self) {
        self.generation += 1;
        self.timer.cancel();
        self.tone.silence();
    }

    fn begin_pass(&mut self, tune: Arc<str>) {
        self.interpreter.reset(tune);
        self.passes += 1;
        self.state = PlayerState::ScanningSilence;
    }

    fn advance(&mut self) {
        loop {
            match self.state {
                PlayerState::ScanningSilence => {
                    let silence = self.interpreter.take_silence();
                    if !silence.is_zero() {
                        self.tone.silence();
                        self.wait(silence);
                        return;
                    }
                    self.state = PlayerState::ScanningToken;
                }
                PlayerState::ScanningToken => {
                    if !self.tune_is_current() {
                        self.end_pass(Err(TuneError::EmptyOrClearedTune));
                        return;
                    }

                    match self.interpreter.next_event() {
                        Ok(Some(Event::Note { index, sound, silence })) => {
                            debug!(index, ?sound, ?silence, "note");
                            self.tone.sound(pitch_of(index));
                            self.state = PlayerState::Sounding;
                            self.wait(sound);
                            return;
                        }
                        Ok(Some(Event::Rest { duration })) => {
                            debug!(?duration, "rest");
                            self.tone.silence();
                            self.state = PlayerState::Sounding;
                            self.wait(duration);
                            return;
                        }
                        Ok(None) => {
                            if !self.end_pass(Ok(())) {
                                return;
                            }
                        }
                        Err(err) => {
                            self.end_pass(Err(err));
                            return;
                        }
                    }
                }
                PlayerState::Idle | PlayerState::Sounding | PlayerState::Stopped => return,
            }
        }
    }

    fn wait(&mut self, delay: Duration) {
        self.sequence += 1;
        self.timer.schedule(
            delay,
            Wake {
                generation: self.generation,
                sequence: self.sequence,
            },
        );
    }

    /// Decide between repeating and stopping. Returns true when a new pass
    /// has begun and scanning should continue.
    fn end_pass(&mut self, result: Result<(), TuneError>) -> bool {
        self.tone.silence();

        if let Err(err) = result {
            warn!(error = %err, "tune error, stopping playback");
            self.finish(Finish::Failed(err));
            return false;
        }

        if self.interpreter.repeat() {
            if self.interpreter.time_this_pass().is_zero() {
                warn!(events = self.interpreter.events_this_pass(), "repeating tune takes no time, stopping");
            } else if self.options.max_passes.map_or(true, |max| self.passes < max) {
                if let Some(tune) = self.tune.clone() {
                    debug!(pass = self.passes + 1, "repeating tune");
                    self.begin_pass(tune);
                    return true;
                }
            }
        }

        self.finish(Finish::Completed);
        false
    }

    fn finish(&mut self, finish: Finish) {
        debug!(?finish, passes = self.passes, "playback finished");
        self.state = PlayerState::Stopped;
        self.last_finish = Some(finish);
    }

    fn tune_is_current(&self) -> bool {
        match (self.tune.as_ref(), self.interpreter.source()) {
            (Some(supplied), Some(scanning)) => Arc::ptr_eq(supplied, scanning),
            _ => false,
        }
    }
}

impl<G: ToneGenerator> Player<G, ManualTimer> {
    /// Fire the pending wait, if any. Returns false when nothing was pending.
    pub fn pump(&mut self) -> bool {
        match self.timer.fire() {
            Some(wake) => {
                self.on_wake(wake);
                true
            }
            None => false,
        }
    }

    /// Pump until nothing is pending or `max_wakes` wakes have fired.
    /// Returns the number fired.
    pub fn run(&mut self, max_wakes: usize) -> usize {
        let mut fired = 0;
        while fired < max_wakes && self.pump() {
            fired += 1;
        }
        fired
    }
}
