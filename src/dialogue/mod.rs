//! # Dialogue Module
//!
//! Data-driven branching dialogue:
//! - Content store decoded once from the dialogue file
//! - Materialization of stored entries into displayable nodes
//! - The per-agent session state machine
//! - The coordinator holding the shared interaction lock

pub mod content;
pub mod coordinator;
pub mod materialize;
pub mod session;

pub use content::*;
pub use coordinator::*;
pub use materialize::*;
pub use session::*;
