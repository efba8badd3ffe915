//! Session state tracking for the courier game
//!
//! This module tracks the courier's earnings and delivery record for the
//! current session.

/// Earnings and delivery counters for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    /// Total rewards collected
    pub earnings: u32,

    /// Orders delivered successfully
    pub deliveries_completed: usize,

    /// Orders cancelled or timed out
    pub deliveries_failed: usize,

    /// Ground distance the courier has moved
    pub distance_travelled: f32,

    /// Session time in seconds
    pub time: f32,
}

impl GameState {
    /// Create a new game state with nothing earned yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed delivery and its reward
    pub fn record_delivery(&mut self, reward: u32) {
        self.deliveries_completed += 1;
        self.earnings = self.earnings.saturating_add(reward);
    }

    /// Record a failed delivery
    pub fn record_failure(&mut self) {
        self.deliveries_failed += 1;
    }

    /// Update session time and distance covered
    pub fn update(&mut self, delta_secs: f32, moved: f32) {
        self.time += delta_secs;
        self.distance_travelled += moved;
    }

    /// Share of finished orders that were delivered, in percent
    pub fn success_rate(&self) -> f32 {
        let finished = self.deliveries_completed + self.deliveries_failed;
        if finished == 0 {
            0.0
        } else {
            self.deliveries_completed as f32 / finished as f32 * 100.0
        }
    }

    /// Get a summary string for display
    pub fn summary(&self) -> String {
        format!(
            "Earnings: ${} | Delivered: {} | Failed: {} | Distance: {:.0} | Time: {:.1}s",
            self.earnings,
            self.deliveries_completed,
            self.deliveries_failed,
            self.distance_travelled,
            self.time
        )
    }
}
