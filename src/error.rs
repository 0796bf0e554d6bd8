// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for tiergov
//!
//! Two layers: `TierGovError` for everything a caller can observe, and
//! `ProbeError` for individual environment probes. Probe errors are absorbed
//! by capability assessment and never reach the caller.

use thiserror::Error;

/// Main error type for tiergov operations
#[derive(Error, Debug)]
pub enum TierGovError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Dev-mode override requested while dev tools are off
    #[error("Dev tools are disabled; set governor.dev_tools = true to toggle low-power mode")]
    DevToolsDisabled,

    /// The process-wide tier publisher was already handed out
    #[error("The global tier publisher has already been claimed")]
    PublisherClaimed,

    /// Runtime wiring errors
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Failure of a single environment probe.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Creating a rendering context threw
    #[error("Context creation failed: {0}")]
    ContextCreation(String),

    /// A test allocation could not be satisfied
    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    /// The host does not expose this probe at all
    #[error("Probe unsupported: {0}")]
    Unsupported(&'static str),

    /// Reading host telemetry failed
    #[error("Probe IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tiergov operations
pub type Result<T> = std::result::Result<T, TierGovError>;
