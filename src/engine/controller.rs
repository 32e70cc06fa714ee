//! Execution control contract
//!
//! A running test polls its controller at suspension points to honour pause
//! and interrupt requests issued by a supervisor.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ControlError;
use crate::models::Property;

/// Outcome reported by a client interaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionStatus {
    Passed,
    Failed,
    Skipped,
}

impl fmt::Display for InteractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InteractionStatus::Passed => "passed",
            InteractionStatus::Failed => "failed",
            InteractionStatus::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// Input supplied by an external client while a test waits for it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientInteraction {
    pub status: InteractionStatus,
    pub message: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl ClientInteraction {
    pub fn new(status: InteractionStatus) -> Self {
        Self {
            status,
            message: None,
            properties: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }
}

/// Cooperative pause, interrupt and wait surface of a test run
///
/// Flag queries and the `try_*` requests never block. The async operations
/// return promptly once the run is interrupted.
#[async_trait]
pub trait ExecutionController: Send + Sync + fmt::Debug {
    fn is_paused(&self) -> bool;

    fn is_interrupted(&self) -> bool;

    /// Toggle the pause flag
    fn try_pause(&self);

    /// Latch the interrupt flag and release paused waiters
    fn try_interruption(&self);

    /// Sleep for `duration`, or until interrupted
    async fn sleep(&self, duration: Duration);

    /// Wait for client input; `None` when interrupted first
    async fn receive_client_interaction(&self) -> Option<ClientInteraction>;

    /// Block while paused; returns on resume or interrupt
    async fn wait_while_paused(&self);

    /// Suspension point for running tests
    async fn checkpoint(&self) -> Result<(), ControlError> {
        self.wait_while_paused().await;
        if self.is_interrupted() {
            return Err(ControlError::Interrupted);
        }
        Ok(())
    }
}
