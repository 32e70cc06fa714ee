//! Execution control
//!
//! The `ExecutionController` contract and the channel-backed `RunController`.

pub mod controller;
pub mod supervisor;

pub use controller::{ClientInteraction, ExecutionController, InteractionStatus};
pub use supervisor::RunController;
