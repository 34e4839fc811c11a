//! Interrupt handling for the controller.
//!
//! OS signals and programmatic requests are fanned out to the running
//! attempt over a `tokio::sync::broadcast` channel. The attempt treats any
//! of them as a user interrupt: relay blocked, no verdict.

use std::fmt;
use tokio::signal;
use tokio::sync::broadcast;

/// Why an attempt was interrupted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    Sigint,
    Sigterm,
    /// [`ShutdownController::shutdown`] was called.
    Requested,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sigint => f.write_str("SIGINT"),
            Self::Sigterm => f.write_str("SIGTERM"),
            Self::Requested => f.write_str("requested"),
        }
    }
}

/// Source of interrupts for one process.
///
/// Receivers from [`subscribe`](Self::subscribe) are awaited with
/// [`interrupted`] inside a `select!` next to the attempt.
pub struct ShutdownController {
    tx: broadcast::Sender<Interrupt>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(4);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Interrupt> {
        self.tx.subscribe()
    }

    /// Interrupt programmatically.
    pub fn shutdown(&self) {
        self.send(Interrupt::Requested);
    }

    fn send(&self, cause: Interrupt) {
        // No receivers just means no attempt is running.
        let _ = self.tx.send(cause);
    }

    /// Forward the first SIGINT or SIGTERM. A handler that cannot be
    /// installed is logged and never fires.
    pub async fn wait_for_signal(&self) {
        let sigint = async {
            match signal::ctrl_c().await {
                Ok(()) => Interrupt::Sigint,
                Err(e) => {
                    tracing::error!(error = %e, "cannot listen for SIGINT");
                    std::future::pending().await
                }
            }
        };

        #[cfg(unix)]
        let sigterm = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    Interrupt::Sigterm
                }
                Err(e) => {
                    tracing::error!(error = %e, "cannot listen for SIGTERM");
                    std::future::pending().await
                }
            }
        };

        #[cfg(not(unix))]
        let sigterm = std::future::pending::<Interrupt>();

        let cause = tokio::select! {
            cause = sigint => cause,
            cause = sigterm => cause,
        };
        tracing::warn!(%cause, "interrupt received");
        self.send(cause);
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve with the cause once an interrupt is broadcast.
///
/// A closed channel means nothing can interrupt any more, so this stays
/// pending rather than report a spurious interrupt.
pub async fn interrupted(rx: &mut broadcast::Receiver<Interrupt>) -> Interrupt {
    match rx.recv().await {
        Ok(cause) => cause,
        Err(broadcast::error::RecvError::Lagged(_)) => Interrupt::Requested,
        Err(broadcast::error::RecvError::Closed) => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn requested_interrupt_reaches_every_subscriber() {
        let controller = ShutdownController::new();
        let mut a = controller.subscribe();
        let mut b = controller.subscribe();
        controller.shutdown();
        assert_eq!(interrupted(&mut a).await, Interrupt::Requested);
        assert_eq!(interrupted(&mut b).await, Interrupt::Requested);
    }

    #[tokio::test]
    async fn closed_channel_is_not_an_interrupt() {
        let controller = ShutdownController::new();
        let mut rx = controller.subscribe();
        drop(controller);
        let waited = tokio::time::timeout(Duration::from_millis(50), interrupted(&mut rx)).await;
        assert!(waited.is_err());
    }

    #[test]
    fn causes_display_as_signal_names() {
        assert_eq!(Interrupt::Sigterm.to_string(), "SIGTERM");
        assert_eq!(Interrupt::Requested.to_string(), "requested");
    }
}
