//! Test run property context
//!
//! Typed, hierarchical run properties with dotted-path lookup, reference
//! resolution and layered merging, plus the cooperative pause and interrupt
//! surface a supervisor uses to steer a running test.
//!
//! ```no_run
//! use testrun_context::context::TestContext;
//! use testrun_context::property::helper::{add, create_integer_property, create_property_list};
//!
//! let mut context = TestContext::new();
//! let mut server = create_property_list("server");
//! add(create_integer_property("port", 8080), &mut server).unwrap();
//! context.put(server);
//!
//! assert!(context.get_property("server.port").is_some());
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod models;
pub mod output;
pub mod property;
pub mod snapshot;
pub mod utils;

pub use context::TestContext;
pub use engine::{ClientInteraction, ExecutionController, RunController};
pub use error::{ControlError, PropertyError};
pub use models::{Property, PropertyContainer, PropertyType, PropertyValue};
