use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Cancellable once-per-second tick source for a timed session.
///
/// The task only emits on the channel; the driver forwards each emission to
/// `ReviewSessionController::tick`. Stopping aborts the task, so after
/// `stop()` returns no further tick can be delivered. The controller
/// additionally ignores ticks outside `Active`, which covers an emission
/// already sitting in the channel when the session closes.
#[derive(Debug)]
pub struct SessionTimer {
    handle: JoinHandle<()>,
}

impl SessionTimer {
    /// Spawn the tick task. Emissions start one second after the call.
    #[must_use]
    pub fn start(ticks: mpsc::UnboundedSender<()>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick fires immediately; swallow it so the
            // session gets its full first second.
            interval.tick().await;
            loop {
                interval.tick().await;
                if ticks.send(()).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    /// Cancel the tick task. Must be called the instant the session leaves
    /// `Active`.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A running timer paired with the receiving end of its channel, owned by a
/// timed session for its `Active` lifetime.
#[derive(Debug)]
pub(crate) struct SessionTicks {
    timer: SessionTimer,
    rx: mpsc::UnboundedReceiver<()>,
}

impl SessionTicks {
    pub(crate) fn start() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            timer: SessionTimer::start(tx),
            rx,
        }
    }

    pub(crate) async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    pub(crate) fn stop(&self) {
        self.timer.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn timer_emits_once_per_second() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = SessionTimer::start(tx);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());

        timer.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_timer_emits_nothing_further() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = SessionTimer::start(tx);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(rx.try_recv().is_ok());

        timer.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}
