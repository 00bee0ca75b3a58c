//! binshim-lib: resolve, fetch and launch a pre-built binary
//!
//! This crate provides the two halves of a binary shim shipped inside a
//! distribution package:
//! - `acquire`: the install-time step that downloads, unpacks and verifies the
//!   platform's release artifact, downgrading every failure to a warning
//! - `resolve` + `launch`: the run-time step that finds the installed binary
//!   among ordered candidate locations and execs it with signal relay
//!
//! Both halves are pure functions of a [`config::Config`] and reach the
//! outside world only through the [`transport::Transport`] and
//! [`fs::FileSystem`] capabilities.

pub mod acquire;
pub mod archive;
pub mod config;
pub mod consts;
pub mod fs;
pub mod launch;
pub mod platform;
pub mod resolve;
pub mod target;
pub mod transport;
pub mod util;
