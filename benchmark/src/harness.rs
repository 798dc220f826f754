// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Wall-clock timing for benchmarked operations.
//!
//! Timings use the monotonic clock. Whatever the operation returns, including
//! an `Err`, is handed back untouched next to the elapsed time.

use std::future::Future;
use std::time::{Duration, Instant};

/// Timer for measuring individual operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since the timer started.
    pub fn elapsed(self) -> Duration {
        self.start.elapsed()
    }
}

/// Measure the execution time of a closure.
pub fn measure<F, T>(f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let timer = Timer::start();
    let result = f();
    (result, timer.elapsed())
}

/// Measure the time until a future completes.
pub async fn measure_async<F, T>(future: F) -> (T, Duration)
where
    F: Future<Output = T>,
{
    let timer = Timer::start();
    let result = future.await;
    (result, timer.elapsed())
}
