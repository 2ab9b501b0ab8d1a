// src/proc/mod.rs

//! External-process execution layer.
//!
//! - [`spec`] describes *what* to run: the command line, working directory,
//!   and environment overrides, fixed once constructed.
//! - [`supervisor`] actually runs it: spawns the child with all three
//!   standard streams redirected, pumps stdout/stderr concurrently, and
//!   drives the polling loop until exit.

pub mod spec;
pub mod supervisor;

pub use spec::CommandSpec;
pub use supervisor::{Supervisor, SupervisorOptions};
