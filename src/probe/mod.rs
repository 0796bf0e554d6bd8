// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Capability probing
//!
//! Runs once at startup and condenses the host environment into a
//! [`CapabilityVerdict`]: which signals were seen, which ones tripped, and
//! the tier those imply. Probing is total; a probe that throws is read as
//! the conservative answer for that one check.

pub mod detector;
pub mod environment;
pub mod raster;
pub mod snapshot;
pub mod system;
pub mod verdict;

pub use detector::*;
pub use environment::*;
pub use snapshot::*;
pub use system::*;
pub use verdict::*;
