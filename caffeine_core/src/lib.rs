#![forbid(unsafe_code)]

//! Core domain model and business logic for the caffeine monitor.
//!
//! This crate provides:
//! - Domain types (beverages, level record, pending sub-doses)
//! - Half-life decay
//! - Absorption scheduling and pending-event replay
//! - Persistence (level record, future events, activity log)
//! - Configuration and environment selection

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod decay;
pub mod absorption;
pub mod processor;
pub mod future;
pub mod state;
pub mod journal;
pub mod walltime;
pub mod monitor;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, Environment, StorePaths};
pub use decay::{decay, HALF_LIFE_MINUTES};
pub use future::{FutureStore, JsonFutureFile};
pub use state::{JsonStateFile, LoadedLevel, StateStore};
pub use journal::{prepare_stores, ActivityLog};
pub use walltime::{parse_walltime, walltime_to_minutes_ago};
pub use monitor::{CaffeineMonitor, Report};
