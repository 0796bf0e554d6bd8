// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tier selection
//!
//! Folds the one-shot capability verdict and the live frame-rate samples
//! into a single [`PerformanceTier`] with hysteresis, and publishes every
//! change to the tier flag.

#[allow(clippy::module_inception)]
mod governor;
mod state;
mod tier;

pub use governor::{GovernorSnapshot, PerformanceGovernor, Subscription};
pub use state::{GovernorInput, GovernorState, TierChange, TransitionCause};
pub use tier::PerformanceTier;
