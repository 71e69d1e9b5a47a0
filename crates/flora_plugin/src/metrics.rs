//! Engine-agnostic metrics for template generation and LOD rendering.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use flora_plugin::metrics::{LodMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // Read after a frame:
//! let metrics = world.manager().metrics();
//! println!("{} visible, {:.1}us avg", metrics.total_visible(), metrics.avg_frame_timing_us());
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::lod::BufferUpdate;

/// Levels tracked individually; deeper levels are folded into the last slot.
pub const TRACKED_LEVELS: usize = 8;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create a new rolling window with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Iterate over values (oldest to newest).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    /// Get the most recent value.
    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }
}

impl<T: Copy + Default + std::ops::Add<Output = T>> RollingWindow<T> {
    /// Compute the sum of all values.
    pub fn sum(&self) -> T {
        self.buffer.iter().copied().fold(T::default(), |acc, x| acc + x)
    }
}

impl RollingWindow<u64> {
    /// Compute the average of all values.
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.sum() as f64 / self.buffer.len() as f64
        }
    }

    /// Get min and max values.
    pub fn min_max(&self) -> Option<(u64, u64)> {
        let first = *self.buffer.front()?;
        Some(
            self.buffer
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }
}

impl Default for RollingWindow<u64> {
    fn default() -> Self {
        Self::new(128) // ~2 seconds at 60fps
    }
}

/// Rendering statistics updated by the LOD manager each frame.
#[derive(Debug, Clone)]
pub struct LodMetrics {
    // Visibility (last frame)
    /// Visible instances per LOD level (index = level).
    pub visible_per_level: [u32; TRACKED_LEVELS],
    /// Instances indexed across all species.
    pub indexed_instances: u64,

    // Buffers (cumulative)
    pub buffer_reallocations: u64,
    pub buffer_overwrites: u64,

    // Timing
    /// Rolling window of render times in microseconds.
    pub frame_timings: RollingWindow<u64>,
    /// Rolling window of template generation times in microseconds.
    pub generation_timings: RollingWindow<u64>,

    /// Last render time in microseconds.
    pub last_frame_us: u64,
    /// Frames rendered this session.
    pub total_frames: u64,
}

impl Default for LodMetrics {
    fn default() -> Self {
        Self {
            visible_per_level: [0; TRACKED_LEVELS],
            indexed_instances: 0,
            buffer_reallocations: 0,
            buffer_overwrites: 0,
            frame_timings: RollingWindow::new(128),
            generation_timings: RollingWindow::new(128),
            last_frame_us: 0,
            total_frames: 0,
        }
    }
}

impl LodMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all metrics to zero.
    pub fn reset(&mut self) {
        self.visible_per_level.fill(0);
        self.indexed_instances = 0;
        self.buffer_reallocations = 0;
        self.buffer_overwrites = 0;
        self.frame_timings.clear();
        self.generation_timings.clear();
        self.last_frame_us = 0;
        // total_frames is cumulative
    }

    /// Clear last-frame visibility before a new frame is classified.
    pub fn begin_frame(&mut self) {
        if is_enabled() {
            self.visible_per_level.fill(0);
        }
    }

    /// Add `count` visible instances at `level`.
    pub fn record_level(&mut self, level: usize, count: usize) {
        if !is_enabled() {
            return;
        }
        let slot = level.min(TRACKED_LEVELS - 1);
        self.visible_per_level[slot] = self.visible_per_level[slot].saturating_add(count as u32);
    }

    pub fn record_buffer_update(&mut self, update: BufferUpdate) {
        if !is_enabled() {
            return;
        }
        match update {
            BufferUpdate::Overwritten => self.buffer_overwrites += 1,
            BufferUpdate::Reallocated => self.buffer_reallocations += 1,
        }
    }

    /// Record a completed frame.
    pub fn record_frame_timing(&mut self, timing_us: u64) {
        if is_enabled() {
            self.frame_timings.push(timing_us);
            self.last_frame_us = timing_us;
            self.total_frames += 1;
        }
    }

    /// Record a template generation timing.
    pub fn record_generation_timing(&mut self, timing_us: u64) {
        if is_enabled() {
            self.generation_timings.push(timing_us);
        }
    }

    /// Visible instances across all levels in the last frame.
    pub fn total_visible(&self) -> u64 {
        self.visible_per_level.iter().map(|&n| n as u64).sum()
    }

    pub fn avg_frame_timing_us(&self) -> f64 {
        self.frame_timings.average()
    }

    pub fn avg_generation_timing_us(&self) -> f64 {
        self.generation_timings.average()
    }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_window() {
        let mut window = RollingWindow::new(3);
        assert!(window.is_empty());

        window.push(10u64);
        window.push(20);
        window.push(30);
        assert_eq!(window.len(), 3);
        assert_eq!(window.sum(), 60);
        assert_eq!(window.average(), 20.0);

        // Push one more, oldest should be evicted
        window.push(40);
        assert_eq!(window.len(), 3);
        assert_eq!(window.sum(), 90);
        assert_eq!(window.min_max(), Some((20, 40)));
        assert_eq!(window.last(), Some(&40));
    }

    #[test]
    fn test_empty_window() {
        let window = RollingWindow::<u64>::default();
        assert_eq!(window.average(), 0.0);
        assert_eq!(window.min_max(), None);
    }

    #[test]
    fn test_level_counts() {
        let mut metrics = LodMetrics::new();
        metrics.record_level(0, 12);
        metrics.record_level(1, 5);
        metrics.record_level(0, 3);
        metrics.record_level(40, 2);

        assert_eq!(metrics.visible_per_level[0], 15);
        assert_eq!(metrics.visible_per_level[1], 5);
        assert_eq!(metrics.visible_per_level[TRACKED_LEVELS - 1], 2);
        assert_eq!(metrics.total_visible(), 22);

        metrics.begin_frame();
        assert_eq!(metrics.total_visible(), 0);
    }

    #[test]
    fn test_buffer_and_timing() {
        let mut metrics = LodMetrics::new();
        metrics.record_buffer_update(BufferUpdate::Reallocated);
        metrics.record_buffer_update(BufferUpdate::Overwritten);
        metrics.record_buffer_update(BufferUpdate::Overwritten);
        assert_eq!(metrics.buffer_reallocations, 1);
        assert_eq!(metrics.buffer_overwrites, 2);

        metrics.record_frame_timing(1000);
        metrics.record_frame_timing(3000);
        assert_eq!(metrics.avg_frame_timing_us(), 2000.0);
        assert_eq!(metrics.last_frame_us, 3000);
        assert_eq!(metrics.total_frames, 2);

        metrics.reset();
        assert_eq!(metrics.buffer_reallocations, 0);
        assert_eq!(metrics.total_frames, 2);
    }
}
