// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Automatic forward stepping.
//!
//! Playback is a single pending deadline polled from the UI update loop. Each
//! due poll yields one tick and schedules the next, so there is never more
//! than one driver regardless of how often playback is toggled.

use std::time::{Duration, Instant};

/// Increment applied by the speed controls, in seconds.
pub const SPEED_STEP: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    scrolling: bool,
    /// Delay between steps in seconds; 0 steps every frame.
    scroll_speed: f64,
    next_tick: Option<Instant>,
}

impl PlaybackScheduler {
    pub fn new(scroll_speed: f64) -> Self {
        Self {
            scrolling: false,
            scroll_speed: scroll_speed.max(0.0),
            next_tick: None,
        }
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    pub fn scroll_speed(&self) -> f64 {
        self.scroll_speed
    }

    /// Delays too long for a `Duration` saturate rather than panic.
    fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.scroll_speed).unwrap_or(Duration::MAX)
    }

    /// Deadline one interval after `now`; `None` if it lies beyond what
    /// `Instant` can represent, so playback never fires.
    fn deadline(&self, now: Instant) -> Option<Instant> {
        now.checked_add(self.interval())
    }

    /// Start or stop playback. Starting schedules the first step one
    /// interval from `now`.
    pub fn toggle(&mut self, now: Instant) {
        self.scrolling = !self.scrolling;
        self.next_tick = if self.scrolling { self.deadline(now) } else { None };
        log::info!("playback {}", if self.scrolling { "started" } else { "stopped" });
    }

    pub fn stop(&mut self) {
        self.scrolling = false;
        self.next_tick = None;
    }

    /// Change the delay by `delta` seconds, floored at zero. A pending step
    /// is rescheduled relative to `now` with the new delay.
    pub fn adjust_speed(&mut self, delta: f64, now: Instant) {
        let speed = (self.scroll_speed + delta).max(0.0);
        // Keep repeated 0.1 steps from accumulating float noise.
        self.scroll_speed = (speed * 1000.0).round() / 1000.0;
        if self.scrolling {
            self.next_tick = self.deadline(now);
        }
        log::info!("scroll speed set to {:.1}s", self.scroll_speed);
    }

    /// Returns true when a step is due at `now` and schedules the next one.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_tick {
            Some(due) if self.scrolling && now >= due => {
                self.next_tick = self.deadline(now);
                true
            }
            _ => false,
        }
    }

    /// How long the event loop may sleep before the next poll is needed.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        if !self.scrolling {
            return None;
        }
        self.next_tick.map(|due| due.saturating_duration_since(now))
    }
}
