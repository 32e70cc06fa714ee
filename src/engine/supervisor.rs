//! Channel-backed execution controller
//!
//! `RunController` keeps its pause and interrupt flags in a
//! `tokio::sync::watch` channel so waiters wake on change instead of
//! polling. Client interactions queue on an unbounded mpsc channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info};

use super::controller::{ClientInteraction, ExecutionController};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ControlState {
    paused: bool,
    interrupted: bool,
}

/// Controller shared between a running test and its supervisor
///
/// Clones share the same state.
#[derive(Clone, Debug)]
pub struct RunController {
    state: Arc<watch::Sender<ControlState>>,
    interactions_tx: mpsc::UnboundedSender<ClientInteraction>,
    interactions_rx: Arc<Mutex<mpsc::UnboundedReceiver<ClientInteraction>>>,
}

impl RunController {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ControlState::default());
        let (interactions_tx, interactions_rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(state),
            interactions_tx,
            interactions_rx: Arc::new(Mutex::new(interactions_rx)),
        }
    }

    fn current(&self) -> ControlState {
        *self.state.borrow()
    }

    /// Supervisor side: pause the run
    pub fn pause(&self) {
        self.state.send_modify(|s| s.paused = true);
        info!("Test run paused");
    }

    /// Supervisor side: release the pause gate
    pub fn resume(&self) {
        self.state.send_modify(|s| s.paused = false);
        info!("Test run resumed");
    }

    /// Supervisor side: hand client input to a waiting test
    ///
    /// Returns false once the run has been interrupted.
    pub fn submit_interaction(&self, interaction: ClientInteraction) -> bool {
        if self.current().interrupted {
            debug!("Dropping client interaction, run interrupted");
            return false;
        }
        self.interactions_tx.send(interaction).is_ok()
    }

    async fn wait_until(&self, predicate: impl Fn(&ControlState) -> bool) {
        let mut rx = self.state.subscribe();
        loop {
            let ready = predicate(&rx.borrow_and_update());
            if ready {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for RunController {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionController for RunController {
    fn is_paused(&self) -> bool {
        self.current().paused
    }

    fn is_interrupted(&self) -> bool {
        self.current().interrupted
    }

    fn try_pause(&self) {
        self.state.send_modify(|s| s.paused = !s.paused);
        debug!("Pause toggled, paused={}", self.is_paused());
    }

    fn try_interruption(&self) {
        self.state.send_modify(|s| s.interrupted = true);
        info!("Test run interrupted");
    }

    async fn sleep(&self, duration: Duration) {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.wait_until(|s| s.interrupted) => {
                debug!("Sleep cut short by interruption");
            }
        }
    }

    async fn receive_client_interaction(&self) -> Option<ClientInteraction> {
        let mut rx = self.interactions_rx.lock().await;
        tokio::select! {
            biased;
            _ = self.wait_until(|s| s.interrupted) => None,
            interaction = rx.recv() => interaction,
        }
    }

    async fn wait_while_paused(&self) {
        self.wait_until(|s| !s.paused || s.interrupted).await;
    }
}
