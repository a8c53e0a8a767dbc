//! Shared type definitions for revenue attestation

mod log_level;

pub use log_level::LogLevel;
