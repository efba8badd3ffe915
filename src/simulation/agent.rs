//! Agent movement logic for the delivery simulation
//!
//! Vehicles and pedestrians share one model: follow a list of waypoints with
//! a damped heading, and stop while the player is close.

use std::f32::consts::FRAC_PI_4;

use super::effects::{EffectsPort, SimEvent};
use super::path_planner::PathPlanner;
use super::rng::SimRng;
use super::types::{normalize_angle, AgentId, Point2, Position, ARRIVAL_THRESHOLD, TURN_RATE};

/// Kind of agent in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// Car on the carriageway
    Vehicle,
    /// Walker on the sidewalk
    Pedestrian,
}

/// Result of an agent update indicating what happened this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentUpdateResult {
    /// Agent stopped for the player
    Yielded,
    /// Agent moved towards its current waypoint
    Moving,
    /// Agent reached a waypoint and targets the next one
    Arrived,
    /// Agent ran out of path and was given a new one
    Repathed,
}

/// An agent in the simulation
#[derive(Debug, Clone)]
pub struct SimAgent {
    pub id: AgentId,
    pub kind: AgentKind,
    pub position: Position,
    /// Y-axis rotation, 0 facing +z
    pub heading: f32,
    pub speed: f32,
    pub path: Vec<Position>,
    pub path_index: usize,
    /// Right-hand offset from the road centreline
    pub lane_offset: f32,
    pub stopped: bool,
    /// Path index of a pending turn transition
    pub turn_at: Option<usize>,
}

impl SimAgent {
    pub fn new(id: AgentId, kind: AgentKind, speed: f32, lane_offset: f32) -> Self {
        Self {
            id,
            kind,
            position: Position::default(),
            heading: 0.0,
            speed,
            path: Vec::new(),
            path_index: 0,
            lane_offset,
            stopped: false,
            turn_at: None,
        }
    }

    /// Current target waypoint, if any
    pub fn target(&self) -> Option<&Position> {
        self.path.get(self.path_index)
    }

    /// Place the agent at `start_index` of its current path, facing the next
    /// waypoint
    pub fn place_on_path(&mut self, start_index: usize) {
        let start_index = start_index.min(self.path.len().saturating_sub(1));
        if let Some(start) = self.path.get(start_index).copied() {
            self.position = start;
            self.path_index = start_index + 1;
            if let Some(next) = self.path.get(start_index + 1) {
                self.heading = start.angle_to(next);
            }
        }
    }

    /// Plan a brand-new path into the agent's own buffer and restart on it
    pub fn repath(&mut self, planner: &PathPlanner, rng: &mut SimRng) {
        self.turn_at = planner.fill_random_path(&mut self.path, self.lane_offset, rng);
        self.place_on_path(0);
    }

    /// A waypoint well off the nose and closer than the turning radius
    /// (`speed / TURN_RATE`) can only be circled, never reached
    fn inside_turning_circle(&self, distance: f32, heading_error: f32) -> bool {
        distance <= self.speed / TURN_RATE && heading_error.abs() > FRAC_PI_4
    }

    /// Advance this agent by one tick
    pub fn update(
        &mut self,
        delta_secs: f32,
        player: &Point2,
        yield_radius: f32,
        planner: &PathPlanner,
        rng: &mut SimRng,
        effects: &mut dyn EffectsPort,
    ) -> AgentUpdateResult {
        // Re-evaluated every tick; no memory of the previous decision
        if self.position.ground_distance(player) <= yield_radius {
            self.stopped = true;
            return AgentUpdateResult::Yielded;
        }
        self.stopped = false;

        let Some(target) = self.target().copied() else {
            self.repath(planner, rng);
            return AgentUpdateResult::Repathed;
        };

        let dx = target.x - self.position.x;
        let dz = target.z - self.position.z;
        let distance = (dx * dx + dz * dz).sqrt();

        let delta = normalize_angle(dx.atan2(dz) - self.heading);
        if distance > ARRIVAL_THRESHOLD && !self.inside_turning_circle(distance, delta) {
            let fraction = (TURN_RATE * delta_secs).min(1.0);
            self.heading = normalize_angle(self.heading + delta * fraction);

            let step = (self.speed * delta_secs).min(distance);
            self.position.x += self.heading.sin() * step;
            self.position.z += self.heading.cos() * step;
            return AgentUpdateResult::Moving;
        }

        if self.turn_at == Some(self.path_index) {
            effects.emit(&SimEvent::AgentTurned { agent: self.id });
            self.turn_at = None;
        }

        self.path_index += 1;
        if self.path_index >= self.path.len() {
            self.repath(planner, rng);
            return AgentUpdateResult::Repathed;
        }
        AgentUpdateResult::Arrived
    }
}
