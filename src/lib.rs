//! Hostswitch - toggleable host groups projected onto the system hosts file.

pub mod cli;
pub mod config;
pub mod error;
pub mod group;
pub mod hosts;
pub mod lock;
pub mod logging;
pub mod merge;
pub mod migrate;
pub mod platform;
pub mod service;
pub mod store;

pub use error::{Error, Result};
