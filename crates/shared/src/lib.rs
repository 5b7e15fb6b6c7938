//! Shared types, errors, and configuration for Tijara.
//!
//! This crate provides common types used across all other crates:
//! - Money rounding helpers with decimal precision
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management (database, ledger settings, logging)
//! - Tracing subscriber setup for the binaries

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::{AppConfig, EclRates, LedgerSettings};
pub use error::{AppError, AppResult};
