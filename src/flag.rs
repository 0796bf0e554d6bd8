// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Process-wide tier marker.
//!
//! The flag is a single-writer, multi-reader broadcast of the current
//! [`PerformanceTier`]. The governor owns the only [`TierPublisher`]; any
//! number of decorative components hold a cloned [`TierFlag`] and either
//! poll it with [`TierFlag::current`] or follow it with
//! [`TierFlag::observe`] / [`TierFlag::subscribe`]. Nothing needs a
//! reference to the governor itself.
//!
//! An uninitialized flag reads as `Minimal`: a component that mounts before
//! the governor has published must not start animating.

use std::sync::{Arc, Mutex, OnceLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{Result, TierGovError};
use crate::governor::PerformanceTier;

/// Value carried by the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSignal {
    /// Last published tier, `None` until the first publish
    pub tier: Option<PerformanceTier>,
    /// Bumped on every publish
    pub generation: u64,
}

impl TierSignal {
    /// Tier a reader should act on.
    pub fn effective(&self) -> PerformanceTier {
        self.tier.unwrap_or(PerformanceTier::Minimal)
    }
}

/// Read side of the tier marker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TierFlag {
    tx: Arc<watch::Sender<TierSignal>>,
}

/// Write side of the tier marker. Exactly one exists per flag.
#[derive(Debug)]
pub struct TierPublisher {
    tx: Arc<watch::Sender<TierSignal>>,
}

/// Live observation started by [`TierFlag::observe`]. Dropping it unobserves.
#[derive(Debug)]
pub struct Observation {
    handle: JoinHandle<()>,
}

struct GlobalFlag {
    flag: TierFlag,
    publisher: Mutex<Option<TierPublisher>>,
}

static GLOBAL: OnceLock<GlobalFlag> = OnceLock::new();

fn global_slot() -> &'static GlobalFlag {
    GLOBAL.get_or_init(|| {
        let (publisher, flag) = TierFlag::new();
        GlobalFlag {
            flag,
            publisher: Mutex::new(Some(publisher)),
        }
    })
}

impl TierFlag {
    /// Create a fresh, unpublished flag and its sole publisher.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (TierPublisher, TierFlag) {
        let (tx, _rx) = watch::channel(TierSignal {
            tier: None,
            generation: 0,
        });
        let tx = Arc::new(tx);
        (
            TierPublisher {
                tx: Arc::clone(&tx),
            },
            TierFlag { tx },
        )
    }

    /// The process-wide flag.
    pub fn global() -> TierFlag {
        global_slot().flag.clone()
    }

    /// Current tier; `Minimal` if nothing has been published yet.
    pub fn current(&self) -> PerformanceTier {
        self.tx.borrow().effective()
    }

    /// Raw signal including the publish generation.
    pub fn signal(&self) -> TierSignal {
        *self.tx.borrow()
    }

    /// Whether the governor has published at least once.
    pub fn is_initialized(&self) -> bool {
        self.tx.borrow().tier.is_some()
    }

    /// Marker class a DOM host would mirror onto the document root.
    pub fn marker_class(&self) -> Option<&'static str> {
        self.current().marker_class()
    }

    /// Receiver that wakes on every publish after this call.
    pub fn subscribe(&self) -> watch::Receiver<TierSignal> {
        self.tx.subscribe()
    }

    /// Wait for the next publish after this call and return the new tier.
    pub async fn changed(&self) -> PerformanceTier {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns on a publish
        let _ = rx.changed().await;
        let signal = *rx.borrow_and_update();
        signal.effective()
    }

    /// Call `callback` now with the current tier and again after every
    /// publish until the returned [`Observation`] is dropped.
    ///
    /// Rapid publishes may be coalesced; the callback always ends on the
    /// last published tier. Must be called from within a tokio runtime.
    pub fn observe<F>(&self, mut callback: F) -> Observation
    where
        F: FnMut(PerformanceTier) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        callback(rx.borrow_and_update().effective());

        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let tier = rx.borrow_and_update().effective();
                callback(tier);
            }
        });

        Observation { handle }
    }
}

impl TierPublisher {
    /// Take the publisher for the process-wide flag. Succeeds once.
    pub fn claim_global() -> Result<TierPublisher> {
        let slot = global_slot();
        let mut guard = slot
            .publisher
            .lock()
            .map_err(|_| TierGovError::Runtime("global flag lock poisoned".to_string()))?;
        guard.take().ok_or(TierGovError::PublisherClaimed)
    }

    /// Write `tier` to the flag and wake every reader. Returns the new generation.
    pub fn publish(&self, tier: PerformanceTier) -> u64 {
        let mut generation = 0;
        self.tx.send_modify(|signal| {
            signal.tier = Some(tier);
            signal.generation += 1;
            generation = signal.generation;
        });
        tracing::debug!(
            target: "tiergov.flag",
            %tier,
            generation,
            observers = self.tx.receiver_count(),
            "tier published"
        );
        generation
    }

    /// A reader for the flag this publisher writes to.
    pub fn flag(&self) -> TierFlag {
        TierFlag {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl Observation {
    /// Stop observing.
    pub fn unobserve(self) {}
}

impl Drop for Observation {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
