//! Tokio host for a [`Player`].
//!
//! One task owns the player. Commands from the [`PlayerHandle`] and wakes from
//! the [`TokioTimer`] arrive on separate channels; the task applies them one at
//! a time and publishes the resulting status on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::player::{Player, PlayerOptions, PlayerState, PlayerStatus};
use super::timer::{Timer, Wake};
use super::tone::ToneGenerator;
use crate::error::PlayError;

/// Timer backed by `tokio::time::sleep` tasks.
///
/// Scheduling aborts the previous sleep; a wake that was already queued when
/// the abort happened is filtered out by the player's generation check.
pub struct TokioTimer {
    wakes: mpsc::UnboundedSender<Wake>,
    pending: Option<JoinHandle<()>>,
}

impl TokioTimer {
    pub fn new(wakes: mpsc::UnboundedSender<Wake>) -> Self {
        Self { wakes, pending: None }
    }
}

impl Timer for TokioTimer {
    fn schedule(&mut self, delay: Duration, wake: Wake) {
        self.cancel();
        let wakes = self.wakes.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // the player task may already be gone
            let _ = wakes.send(wake);
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug)]
enum Command {
    Start(Arc<str>),
    Restart,
    Stop,
    ReplaceTune(Option<Arc<str>>),
    Shutdown,
}

/// Status as seen by a handle, tagged with how many commands were applied.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Published {
    status: PlayerStatus,
    applied: u64,
}

/// Control surface for a player running on the tokio runtime.
pub struct PlayerHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<Published>,
    sent: u64,
    task: JoinHandle<()>,
}

/// Spawn a player task driving `tone`. Must be called from within a tokio
/// runtime.
pub fn spawn_player<G>(tone: G, options: PlayerOptions) -> PlayerHandle
where
    G: ToneGenerator + Send + 'static,
{
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    let (wake_tx, mut wake_rx) = mpsc::unbounded_channel();
    let mut player = Player::with_options(tone, TokioTimer::new(wake_tx), options);
    let (status_tx, status_rx) = watch::channel(Published {
        status: player.status(),
        applied: 0,
    });

    let task = tokio::spawn(async move {
        let mut applied = 0;
        loop {
            tokio::select! {
                command = command_rx.recv() => {
                    let Some(command) = command else {
                        debug!("all player handles dropped");
                        player.stop();
                        break;
                    };
                    applied += 1;
                    debug!(?command, "player command");
                    match command {
                        Command::Start(tune) => player.start(tune),
                        Command::Restart => player.restart(),
                        Command::Stop => player.stop(),
                        Command::ReplaceTune(tune) => player.replace_tune(tune),
                        Command::Shutdown => {
                            player.stop();
                            break;
                        }
                    }
                }
                Some(wake) = wake_rx.recv() => player.on_wake(wake),
            }
            status_tx.send_replace(Published {
                status: player.status(),
                applied,
            });
        }
        status_tx.send_replace(Published {
            status: player.status(),
            applied,
        });
    });

    PlayerHandle {
        commands: command_tx,
        status: status_rx,
        sent: 0,
        task,
    }
}

impl PlayerHandle {
    fn send(&mut self, command: Command) -> Result<(), PlayError> {
        self.commands.send(command).map_err(|_| PlayError::PlayerClosed)?;
        self.sent += 1;
        Ok(())
    }

    /// Replace the tune and play it from the top.
    pub fn start(&mut self, tune: impl Into<Arc<str>>) -> Result<(), PlayError> {
        self.send(Command::Start(tune.into()))
    }

    pub fn restart(&mut self) -> Result<(), PlayError> {
        self.send(Command::Restart)
    }

    pub fn stop(&mut self) -> Result<(), PlayError> {
        self.send(Command::Stop)
    }

    pub fn replace_tune(&mut self, tune: Option<Arc<str>>) -> Result<(), PlayError> {
        self.send(Command::ReplaceTune(tune))
    }

    pub fn clear_tune(&mut self) -> Result<(), PlayError> {
        self.replace_tune(None)
    }

    /// Most recently published status
    pub fn status(&self) -> PlayerStatus {
        self.status.borrow().status.clone()
    }

    /// Wait until every command sent so far has been applied and the player
    /// has reached `Stopped`.
    pub async fn wait_for_stop(&mut self) -> Result<PlayerStatus, PlayError> {
        let sent = self.sent;
        let published = self
            .status
            .wait_for(|p| p.applied >= sent && p.status.state == PlayerState::Stopped)
            .await
            .map_err(|_| PlayError::PlayerClosed)?;
        Ok(published.status.clone())
    }

    /// Stop playback and wait for the player task to exit.
    pub async fn shutdown(mut self) -> Result<PlayerStatus, PlayError> {
        self.send(Command::Shutdown)?;
        (&mut self.task).await.map_err(|_| PlayError::PlayerClosed)?;
        let status = self.status.borrow().status.clone();
        Ok(status)
    }
}
