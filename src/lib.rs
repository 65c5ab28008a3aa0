//! Declarative single-host provisioning.
//!
//! Reads a flat configuration whose lines are classified as `STANDARD`,
//! `OPTIONAL` or `DISABLED`, binds its `KEY=VALUE` assignments, and applies
//! host-hardening and tooling handlers with per-step confirmation.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: load tiered declarations and bind typed parameters
//! - **[`resources`]**: the closed set of side-effecting [`resources::Action`]s
//! - **[`tasks`]**: handlers, the confirmation gate, and the dispatch table
//! - **[`commands`]**: the provision run that ties them together
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod prompt;
pub mod resources;
pub mod tasks;
