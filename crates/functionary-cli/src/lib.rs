//! functionary-yaml library - expose modules for testing
//!
//! The binary is a thin clap front end over these modules.

pub mod commands;
pub mod common;

pub use common::GlobalOpts;
pub use functionary_logger as logger;
