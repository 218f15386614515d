//! Core error types for focusalarm-core.
//!
//! The engine is deliberately hard to kill: resource-not-ready degrades to
//! a skipped tick, commands in a terminal phase are no-ops, and releasing
//! an already-released audio handle counts as success. The types below
//! exist so ports can report precisely *why* a tick was skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Audio port errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Audio-port errors. `NotLoaded` is expected during startup: sound
/// assets load asynchronously and a tick may race the loader.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Sound asset for a level is not loaded yet
    #[error("Sound for urgency level {level} not loaded")]
    NotLoaded { level: u8 },

    /// Backend playback failure
    #[error("Audio backend error: {0}")]
    Backend(String),

    /// Release called on an already-released backend.
    /// Callers treat this as already-satisfied.
    #[error("Audio resources already released")]
    AlreadyReleased,
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Value out of range
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
