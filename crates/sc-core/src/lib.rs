//! # sc-core
//!
//! Core types and pure decision logic for the shrinkcast pipeline.
//!
//! This crate provides:
//!
//! - **Errors** ([`Error`], [`Result`]) -- the unified failure type all
//!   shrinkcast crates funnel into.
//! - **Configuration** ([`Config`], [`Limits`], [`Targets`]) -- decision
//!   thresholds and encode targets, loaded from TOML with full defaults.
//! - **Planning** ([`SourceInfo`], [`AudioEstimate`], [`TranscodePlan`],
//!   [`decide`]) -- the pure function that turns measured source properties
//!   into per-parameter change flags.
//! - **Events** ([`ProgressEvent`]) -- normalized progress updates emitted
//!   while a transcode runs.
//! - **Units** ([`units`]) -- `HH:MM:SS` and byte-magnitude formatting.
//!
//! Nothing in this crate spawns processes; all subprocess I/O lives in
//! `sc-av`.

pub mod config;
pub mod error;
pub mod events;
pub mod plan;
pub mod units;

// ---- Re-exports for convenience ----

pub use config::{Config, Limits, Targets, ToolsConfig};
pub use error::{Error, Result};
pub use events::{percent_complete, ProgressEvent};
pub use plan::{decide, AudioEstimate, SourceInfo, TranscodePlan};
