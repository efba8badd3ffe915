//! Frame timing and the session countdown
//!
//! The clock turns raw frame time into simulation steps and is the only
//! authority on whether the session is over.

use super::config::{SimConfig, TimestepMode};

/// Steps to run for one rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSteps {
    pub count: u32,
    pub delta: f32,
}

impl FrameSteps {
    pub const NONE: FrameSteps = FrameSteps {
        count: 0,
        delta: 0.0,
    };
}

#[derive(Debug, Clone)]
pub struct SimulationClock {
    mode: TimestepMode,
    max_delta: f32,
    accumulator: f32,
    elapsed: f32,
    delta: f32,
    frame: u64,
    session_length: f32,
    remaining: f32,
}

impl SimulationClock {
    pub fn new(mode: TimestepMode, max_delta: f32, session_length: f32) -> Self {
        Self {
            mode,
            max_delta,
            accumulator: 0.0,
            elapsed: 0.0,
            delta: 0.0,
            frame: 0,
            session_length,
            remaining: session_length,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.timestep, config.max_delta, config.session_length)
    }

    /// Turn one frame's raw delta into simulation steps.
    ///
    /// The raw delta is clamped to `[0, max_delta]` first. Does not advance
    /// elapsed time; call `step` for each step actually run.
    pub fn begin_frame(&mut self, raw_delta: f32) -> FrameSteps {
        self.frame += 1;
        if self.is_session_over() {
            return FrameSteps::NONE;
        }

        let delta = if raw_delta.is_finite() {
            raw_delta.clamp(0.0, self.max_delta)
        } else {
            0.0
        };

        match self.mode {
            TimestepMode::Variable => FrameSteps { count: 1, delta },
            TimestepMode::Fixed {
                step,
                max_steps_per_frame,
            } => {
                self.accumulator += delta;
                let available = (self.accumulator / step).floor() as u32;
                let count = available.min(max_steps_per_frame);
                self.accumulator -= count as f32 * step;
                // Drop backlog the frame could not run rather than spiral
                if available > max_steps_per_frame {
                    self.accumulator = self.accumulator.min(step);
                }
                FrameSteps { count, delta: step }
            }
        }
    }

    /// Account for one simulation step of `delta` seconds; returns the delta
    /// actually applied to the session countdown
    pub fn step(&mut self, delta: f32) -> f32 {
        self.delta = delta;
        self.elapsed += delta;
        let applied = delta.min(self.remaining);
        self.remaining = (self.remaining - delta).max(0.0);
        applied
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Delta of the most recent step
    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn session_length(&self) -> f32 {
        self.session_length
    }

    pub fn is_session_over(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn mode(&self) -> TimestepMode {
        self.mode
    }
}
