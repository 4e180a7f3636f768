//! `gator`, a command line feed aggregator.
//!
//! Users register locally, follow RSS feeds and let [`scheduler::Scheduler`]
//! collect new posts in the background.

pub mod auth;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod fetcher;
pub mod ingest;
pub mod scheduler;

pub use self::error::{Error, Result};
