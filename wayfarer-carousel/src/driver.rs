//! Tokio-backed autoplay driver.
//!
//! Runs one [`AutoplayTimer`] on its own task and calls `on_advance` every
//! time the countdown expires. Control calls are stamped with the instant
//! they were made, so a command processed a little later still schedules
//! from the moment of the interaction.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::autoplay::AutoplayTimer;

#[derive(Debug, Clone, Copy)]
enum DriverCommand {
    Pause,
    Resume(Instant),
    Reset(Instant),
    Restart(Instant),
}

/// Handle to a running autoplay task. Dropping the handle stops the task.
#[derive(Debug)]
pub struct AutoplayDriver {
    commands: mpsc::UnboundedSender<DriverCommand>,
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl AutoplayDriver {
    /// Spawn the countdown on the current tokio runtime.
    pub fn start<F>(interval: Duration, mut on_advance: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let started_at = Instant::now();

        let handle = tokio::spawn(async move {
            let mut timer = AutoplayTimer::new();
            timer.start(interval, started_at.into_std());
            tracing::debug!(target: "carousel::driver", interval_ms = interval.as_millis() as u64, "autoplay driver started");

            loop {
                let deadline = timer.next_deadline().map(Instant::from_std);
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    cmd = rx.recv() => match cmd {
                        Some(DriverCommand::Pause) => timer.pause(),
                        Some(DriverCommand::Resume(at)) => timer.resume(at.into_std()),
                        Some(DriverCommand::Reset(at)) => timer.reset(at.into_std()),
                        Some(DriverCommand::Restart(at)) => {
                            timer.resume(at.into_std());
                            timer.reset(at.into_std());
                        }
                        None => break,
                    },
                    _ = sleep_until_deadline(deadline) => {
                        let now = Instant::now().into_std();
                        timer.fire_due(now, &mut on_advance);
                    }
                }
            }

            timer.stop();
            tracing::debug!(target: "carousel::driver", "autoplay driver stopped");
        });

        Self {
            commands: tx,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Hold the countdown until [`AutoplayDriver::resume`].
    pub fn pause(&self) {
        self.send(DriverCommand::Pause);
    }

    /// Resume with a full fresh interval.
    pub fn resume(&self) {
        self.send(DriverCommand::Resume(Instant::now()));
    }

    /// Restart the countdown after a manual interaction.
    pub fn reset(&self) {
        self.send(DriverCommand::Reset(Instant::now()));
    }

    /// A full fresh interval from now, whether paused or running.
    pub fn restart(&self) {
        self.send(DriverCommand::Restart(Instant::now()));
    }

    /// Cancel the countdown and release the task. Idempotent.
    pub fn stop(&mut self) {
        self.shutdown.cancel();
        self.handle.take();
    }

    /// `true` once [`AutoplayDriver::stop`] ran or the handle is dropping.
    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn send(&self, cmd: DriverCommand) {
        if self.is_stopped() {
            return;
        }
        if self.commands.send(cmd).is_err() {
            tracing::debug!(target: "carousel::driver", ?cmd, "autoplay driver already gone");
        }
    }
}

impl Drop for AutoplayDriver {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
