//! treemirror
//!
//! Watches a directory tree and mirrors every completed file into a flat
//! output directory.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod config;
pub mod error;
pub mod mirror;
pub mod observability;
pub mod watcher;

pub use config::Config;
pub use error::{Error, Result};
