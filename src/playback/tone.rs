//! Tone generator collaborators.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

/// A monophonic square-wave output.
///
/// Both calls are fire-and-forget and idempotent: `sound` replaces whatever
/// tone is playing, `silence` on a silent output does nothing.
pub trait ToneGenerator {
    fn sound(&mut self, frequency_hz: f64);
    fn silence(&mut self);
}

impl<G: ToneGenerator + ?Sized> ToneGenerator for Box<G> {
    fn sound(&mut self, frequency_hz: f64) {
        (**self).sound(frequency_hz)
    }

    fn silence(&mut self) {
        (**self).silence()
    }
}

/// A call made on a [`Recorder`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneCall {
    Sound(f64),
    Silence,
}

/// Captures every call for later inspection. Clones share one log, so a host
/// can keep a copy after handing the recorder to a player.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<ToneCall>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ToneCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Frequencies passed to `sound`, in order
    pub fn sounded(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ToneCall::Sound(hz) => Some(hz),
                ToneCall::Silence => None,
            })
            .collect()
    }

    /// Whether the output would currently be emitting a tone
    pub fn is_sounding(&self) -> bool {
        matches!(self.calls().last(), Some(ToneCall::Sound(_)))
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn push(&self, call: ToneCall) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);
    }
}

impl ToneGenerator for Recorder {
    fn sound(&mut self, frequency_hz: f64) {
        self.push(ToneCall::Sound(frequency_hz));
    }

    fn silence(&mut self) {
        self.push(ToneCall::Silence);
    }
}

/// Logs tone changes on an output channel instead of driving hardware.
#[derive(Debug)]
pub struct TracingTone {
    channel: u8,
    sounding: Option<f64>,
}

impl TracingTone {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            sounding: None,
        }
    }

    pub fn frequency(&self) -> Option<f64> {
        self.sounding
    }
}

impl ToneGenerator for TracingTone {
    fn sound(&mut self, frequency_hz: f64) {
        if self.sounding != Some(frequency_hz) {
            info!(channel = self.channel, frequency_hz, "tone on");
        }
        self.sounding = Some(frequency_hz);
    }

    fn silence(&mut self) {
        if self.sounding.take().is_some() {
            info!(channel = self.channel, "tone off");
        }
    }
}
