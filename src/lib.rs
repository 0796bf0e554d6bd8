// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! tiergov - adaptive rendering governor.
//!
//! This crate exposes the shared runtime used by:
//! - the `tiergov` CLI (`src/main.rs`)
//! - hosts embedding decorative animation that must degrade gracefully
//!
//! Architecture highlights:
//! - `probe`: one-shot capability assessment of the host
//! - `sampler`, `frame`: rolling frame-rate measurement over a frame clock
//! - `governor`: the tier state machine and its single publisher
//! - `flag`: the globally observable tier marker every consumer reads
//! - `component`: adaptive components that animate or go static per tier
//! - `runtime`: wiring of probe, governor, preferences and sampler

pub mod cli;
pub mod commands;
pub mod component;
pub mod config;
pub mod error;
pub mod flag;
pub mod frame;
pub mod governor;
pub mod probe;
pub mod runtime;
pub mod sampler;

pub use error::{Result, TierGovError};
pub use flag::{TierFlag, TierPublisher};
pub use governor::{PerformanceGovernor, PerformanceTier};
pub use runtime::{GovernorRuntime, HostSignals};
