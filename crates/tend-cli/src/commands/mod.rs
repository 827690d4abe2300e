//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, seed) and shared utilities (open_db)
//! - `focus` - Focus area commands (list, pin, unpin)
//! - `log` - Outcome logging command
//! - `status` - Database status command
//! - `suggest` - Daily suggestion command
//! - `week` - Weekly review command

pub mod core;
pub mod focus;
pub mod log;
pub mod status;
pub mod suggest;
pub mod week;

// Re-export command functions for main.rs
pub use core::*;
pub use focus::*;
pub use log::*;
pub use status::*;
pub use suggest::*;
pub use week::*;
