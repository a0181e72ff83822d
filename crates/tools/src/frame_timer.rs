use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// Rolling window over the most recent frame durations.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    window: VecDeque<Duration>,
    capacity: usize,
    total_frames: u64,
}

impl FrameTimer {
    /// A window of `capacity` frames; at least one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            total_frames: 0,
        }
    }

    /// Add one frame, evicting the oldest when the window is full.
    pub fn record(&mut self, frame: Duration) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(frame);
        self.total_frames += 1;
    }

    /// Frames currently in the window.
    pub fn count(&self) -> usize {
        self.window.len()
    }

    /// Frames recorded over the timer's lifetime.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn last(&self) -> Option<Duration> {
        self.window.back().copied()
    }

    pub fn average(&self) -> Duration {
        if self.window.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.window.iter().sum();
        total / self.window.len() as u32
    }

    pub fn min(&self) -> Duration {
        self.window.iter().copied().min().unwrap_or(Duration::ZERO)
    }

    pub fn max(&self) -> Duration {
        self.window.iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            frames: self.total_frames,
            average: self.average(),
            min: self.min(),
            max: self.max(),
        }
    }
}

/// Point-in-time summary of a [`FrameTimer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub frames: u64,
    pub average: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl FrameStats {
    /// Frames per second implied by the average, zero when nothing was timed.
    pub fn fps(&self) -> f64 {
        let secs = self.average.as_secs_f64();
        if secs > 0.0 { 1.0 / secs } else { 0.0 }
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frames={} avg={:.3}ms min={:.3}ms max={:.3}ms ({:.1} fps)",
            self.frames,
            self.average.as_secs_f64() * 1000.0,
            self.min.as_secs_f64() * 1000.0,
            self.max.as_secs_f64() * 1000.0,
            self.fps()
        )
    }
}
