//! Domain types for the reelflow production-sync platform.
//!
//! This crate has no internal dependencies and holds the data model
//! shared by the status adapters, the sync service, and the API
//! surface: normalized updates, notifications, status vocabulary,
//! and configuration.

pub mod config;
pub mod error;
pub mod notification;
pub mod status;
pub mod types;
pub mod update;
