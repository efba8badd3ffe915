//! Load-time configuration for the delivery simulation
//!
//! All knobs are plain numbers. `validate` runs before anything is generated
//! so a degenerate setup fails fast instead of producing a broken world.

use anyhow::{bail, Result};

use super::types::{BUILDING_MARGIN, MIN_FOOTPRINT};

/// Largest supported grid size (blocks per half axis)
pub const MAX_GRID_SIZE: u32 = 64;

/// Largest supported agent pool per kind
pub const MAX_AGENTS_PER_KIND: usize = 1024;

/// How the clock turns frame time into simulation steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimestepMode {
    /// One step per frame with the (clamped) frame delta
    Variable,
    /// Zero or more steps of exactly `step` seconds per frame
    Fixed { step: f32, max_steps_per_frame: u32 },
}

/// Simulation configuration
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Blocks on each side of the origin, per axis
    pub grid_size: u32,
    /// Road line spacing; also the block size
    pub block_size: f32,
    /// Carriageway width of every road
    pub road_width: f32,
    /// Open ground between the city edge and the map edge
    pub outskirts: f32,

    pub vehicle_count: usize,
    pub pedestrian_count: usize,
    /// Agents closer than this to the player stop for the tick
    pub yield_radius: f32,
    /// Chance that a vehicle turns at each crossed intersection
    pub turn_probability: f64,

    /// Maximum number of outstanding orders
    pub order_cap: usize,
    /// Seconds between background order generation attempts
    pub order_interval: f32,
    pub pickup_radius: f32,
    pub delivery_radius: f32,
    /// Fail the active order automatically when its time runs out
    pub fail_overdue_orders: bool,

    /// Length of a play session in seconds
    pub session_length: f32,
    /// Frame deltas are clamped to this to survive long stalls
    pub max_delta: f32,
    pub timestep: TimestepMode,

    /// Seed for reproducible runs; `None` uses ambient randomness
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: 4,
            block_size: 30.0,
            road_width: 8.0,
            outskirts: 50.0,
            vehicle_count: 20,
            pedestrian_count: 15,
            yield_radius: 4.0,
            turn_probability: 0.3,
            order_cap: 3,
            order_interval: 5.0,
            pickup_radius: 3.0,
            delivery_radius: 5.0,
            fail_overdue_orders: false,
            session_length: 300.0,
            max_delta: 0.1,
            timestep: TimestepMode::Variable,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Half the width of the road grid
    pub fn city_half_extent(&self) -> f32 {
        self.grid_size as f32 * self.block_size
    }

    /// Half the width of the whole map including outskirts
    pub fn map_half_extent(&self) -> f32 {
        self.city_half_extent() + self.outskirts
    }

    /// Inner span of a block left for buildings after roads and margins
    pub fn usable_block_span(&self) -> f32 {
        self.block_size - self.road_width - 2.0 * BUILDING_MARGIN
    }

    /// Check every knob; called before any world, agent or order exists
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            bail!(
                "grid size {} out of range 1..={}",
                self.grid_size,
                MAX_GRID_SIZE
            );
        }
        if !(self.block_size.is_finite() && self.block_size > 0.0) {
            bail!("block size must be positive, got {}", self.block_size);
        }
        if !(self.road_width.is_finite() && self.road_width > 0.0) {
            bail!("road width must be positive, got {}", self.road_width);
        }
        if self.usable_block_span() < MIN_FOOTPRINT {
            bail!(
                "block size {} leaves {:.1} units after road width {} and margins; need at least {}",
                self.block_size,
                self.usable_block_span(),
                self.road_width,
                MIN_FOOTPRINT
            );
        }
        if !(self.outskirts.is_finite() && self.outskirts >= 0.0) {
            bail!("outskirts must be non-negative, got {}", self.outskirts);
        }
        if self.vehicle_count > MAX_AGENTS_PER_KIND || self.pedestrian_count > MAX_AGENTS_PER_KIND
        {
            bail!(
                "agent pools are limited to {} per kind (vehicles {}, pedestrians {})",
                MAX_AGENTS_PER_KIND,
                self.vehicle_count,
                self.pedestrian_count
            );
        }
        if !(self.yield_radius.is_finite() && self.yield_radius >= 0.0) {
            bail!("yield radius must be non-negative, got {}", self.yield_radius);
        }
        if !(0.0..=1.0).contains(&self.turn_probability) {
            bail!(
                "turn probability must be within [0, 1], got {}",
                self.turn_probability
            );
        }
        if self.order_cap == 0 {
            bail!("order cap must be at least 1");
        }
        if !(self.order_interval.is_finite() && self.order_interval > 0.0) {
            bail!("order interval must be positive, got {}", self.order_interval);
        }
        if !(self.pickup_radius > 0.0 && self.delivery_radius > 0.0) {
            bail!(
                "pickup and delivery radii must be positive, got {} and {}",
                self.pickup_radius,
                self.delivery_radius
            );
        }
        if !(self.session_length.is_finite() && self.session_length > 0.0) {
            bail!("session length must be positive, got {}", self.session_length);
        }
        if !(self.max_delta.is_finite() && self.max_delta > 0.0) {
            bail!("max delta must be positive, got {}", self.max_delta);
        }
        if let TimestepMode::Fixed {
            step,
            max_steps_per_frame,
        } = self.timestep
        {
            if !(step.is_finite() && step > 0.0) || max_steps_per_frame == 0 {
                bail!(
                    "fixed timestep needs a positive step and at least one step per frame, got {} / {}",
                    step,
                    max_steps_per_frame
                );
            }
        }
        Ok(())
    }
}
