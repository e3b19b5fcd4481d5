// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::Utc;

use crate::{api::cors::OriginPolicy, pinning::PinningService};

#[derive(Clone)]
pub struct AppState {
    /// Shared pinning client, constructed once at startup.
    pub pinner: Arc<dyn PinningService>,
    pub origins: Arc<OriginPolicy>,
    pub clock: Arc<MonotonicClock>,
}

impl AppState {
    pub fn new(pinner: Arc<dyn PinningService>, origins: OriginPolicy) -> Self {
        Self {
            pinner,
            origins: Arc::new(origins),
            clock: Arc::new(MonotonicClock::default()),
        }
    }
}

/// Wall-clock milliseconds that never go backwards within the process.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: AtomicI64,
}

impl MonotonicClock {
    pub fn now_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self.last.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }
}
