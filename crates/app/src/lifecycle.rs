//! Lifecycle manager — state machine bracketing the running period.
//!
//! ```text
//! Idle -> Starting -> Running -> Draining -> Closed
//!             \________________________________/
//!                     (listen failure)
//! ```
//!
//! `Closed` is terminal.

use std::fmt;

use tokio::sync::watch;

/// Phase of an engine's running period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Idle,
    Starting,
    Running,
    Draining,
    Closed,
}

impl LifecycleState {
    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Starting)
                | (Self::Starting, Self::Running | Self::Closed)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Closed)
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Closed => "closed",
        })
    }
}

/// Rejected state transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid lifecycle transition {from} -> {to}")]
pub struct TransitionError {
    pub from: LifecycleState,
    pub to: LifecycleState,
}

/// Observable holder of the current [`LifecycleState`].
#[derive(Debug)]
pub struct Lifecycle {
    state: watch::Sender<LifecycleState>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: watch::channel(LifecycleState::Idle).0,
        }
    }
}

impl Lifecycle {
    /// Create a lifecycle in the `Idle` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Watch state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Move to `next` if the transition is legal.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] and leaves the state untouched otherwise.
    pub fn advance(&self, next: LifecycleState) -> Result<(), TransitionError> {
        let mut result = Ok(());
        self.state.send_if_modified(|current| {
            if current.can_advance_to(next) {
                tracing::debug!(from = %current, to = %next, "lifecycle transition");
                *current = next;
                true
            } else {
                result = Err(TransitionError {
                    from: *current,
                    to: next,
                });
                false
            }
        });
        result
    }
}

/// Create a linked shutdown trigger and signal.
#[must_use]
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger(tx), ShutdownSignal(rx))
}

/// Sending half: asks the listener to stop accepting connections.
#[derive(Debug)]
pub struct ShutdownTrigger(watch::Sender<bool>);

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.0.send_replace(true);
    }
}

/// Receiving half handed to the router adapter's serve loop.
#[derive(Debug, Clone)]
pub struct ShutdownSignal(watch::Receiver<bool>);

impl ShutdownSignal {
    /// Whether shutdown has been triggered.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolve once shutdown has been triggered or the trigger was dropped.
    pub async fn recv(mut self) {
        let _ = self.0.wait_for(|stop| *stop).await;
    }
}

/// Resolve on the first operator interrupt (Ctrl-C, or SIGTERM on unix).
pub async fn interrupt() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
