#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! Core of nodepack: a uniform contract over npm, yarn and pnpm.
//!
//! Library crates only emit `tracing` events; installing a subscriber is
//! left to the binary.

pub mod config;
pub mod error;
pub mod packager;
pub mod paths;
pub mod process;

pub use config::Config;
pub use error::{codes, Error, Result, SpawnError};
pub use packager::{
    AnyPackager, DependencyGraph, Executable, IgnoredError, Npm, Packager, PackagerId, Pnpm, Yarn,
};
pub use paths::{find_project_root, find_project_root_from, find_up};
pub use process::{spawn_process, ProcessResult, SpawnOptions};
