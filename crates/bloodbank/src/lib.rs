//! `bloodbank` - A local blood donor registry
//!
//! This library provides donor registration, per-group availability against
//! configurable targets, and the persistent key-value store behind them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod donor;
pub mod error;
pub mod logging;
pub mod registry;
pub mod storage;
pub mod targets;
pub mod view;

pub use aggregate::{count_by_group, most_needed, percent_of_target, GroupCounts};
pub use config::Config;
pub use donor::{BloodGroup, DonorRecord, NewDonor};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use registry::{Interaction, Registry};
pub use storage::{Repository, Storage, StorageStats};
pub use targets::{default_target, TargetTable};
