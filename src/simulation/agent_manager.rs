//! Agent pool management for the delivery simulation
//!
//! The pool is allocated once at world load and updated in place every tick.
//! Agents are never added or removed while the simulation runs; teardown
//! releases the whole pool at once.

use log::{debug, info};

use super::agent::{AgentKind, AgentUpdateResult, SimAgent};
use super::config::SimConfig;
use super::effects::EffectsPort;
use super::path_planner::PathPlanner;
use super::rng::SimRng;
use super::types::{AgentId, Point2, SimId};
use super::world_gen::CityMap;

/// Vehicle speed range in units per second
pub const VEHICLE_SPEED_MIN: f32 = 6.0;
pub const VEHICLE_SPEED_MAX: f32 = 10.0;

/// Pedestrian speed range in units per second
pub const PEDESTRIAN_SPEED_MIN: f32 = 1.2;
pub const PEDESTRIAN_SPEED_MAX: f32 = 2.0;

/// Per-tick tallies from one pool update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentTickSummary {
    pub moving: usize,
    pub yielded: usize,
    pub arrived: usize,
    pub repathed: usize,
}

/// Position and heading of an agent, for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentTransform {
    pub id: AgentId,
    pub kind: AgentKind,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub heading: f32,
    pub stopped: bool,
}

pub struct AgentSimulator {
    agents: Vec<SimAgent>,
    planner: PathPlanner,
    yield_radius: f32,
    released: bool,
}

impl AgentSimulator {
    /// Spawn the full pool of vehicles and pedestrians, scattered along
    /// their first paths
    pub fn new(config: &SimConfig, city: &CityMap, rng: &mut SimRng) -> Self {
        let planner = PathPlanner::new(city, config.turn_probability);
        let vehicle_lane = city.road_width / 4.0;
        let sidewalk = city.road_width / 2.0 + 0.5;

        let total = config.vehicle_count + config.pedestrian_count;
        let mut agents = Vec::with_capacity(total);

        for index in 0..total {
            let (kind, speed, lane_offset) = if index < config.vehicle_count {
                (
                    AgentKind::Vehicle,
                    rng.random_inclusive(VEHICLE_SPEED_MIN, VEHICLE_SPEED_MAX),
                    vehicle_lane,
                )
            } else {
                (
                    AgentKind::Pedestrian,
                    rng.random_inclusive(PEDESTRIAN_SPEED_MIN, PEDESTRIAN_SPEED_MAX),
                    sidewalk,
                )
            };

            let mut agent = SimAgent::new(AgentId(SimId(index)), kind, speed, lane_offset);
            agent.turn_at = planner.fill_random_path(&mut agent.path, lane_offset, rng);
            // Start somewhere along the path so the pool doesn't begin on the edges
            let last_start = agent.path.len().saturating_sub(2);
            let start = rng.random_index(last_start + 1);
            agent.place_on_path(start);
            agents.push(agent);
        }

        info!(
            "Spawned {} vehicles and {} pedestrians",
            config.vehicle_count, config.pedestrian_count
        );

        Self {
            agents,
            planner,
            yield_radius: config.yield_radius,
            released: false,
        }
    }

    /// Update all agents in place
    pub fn update(
        &mut self,
        delta_secs: f32,
        player: &Point2,
        rng: &mut SimRng,
        effects: &mut dyn EffectsPort,
    ) -> AgentTickSummary {
        let mut summary = AgentTickSummary::default();

        for agent in self.agents.iter_mut() {
            match agent.update(
                delta_secs,
                player,
                self.yield_radius,
                &self.planner,
                rng,
                effects,
            ) {
                AgentUpdateResult::Yielded => summary.yielded += 1,
                AgentUpdateResult::Moving => summary.moving += 1,
                AgentUpdateResult::Arrived => summary.arrived += 1,
                AgentUpdateResult::Repathed => {
                    debug!("Agent {:?} ({:?}) repathed", agent.id.0, agent.kind);
                    summary.repathed += 1;
                }
            }
        }

        summary
    }

    /// Release the pool; further updates do nothing
    pub fn release(&mut self) {
        if !self.released {
            info!("Releasing agent pool of {}", self.agents.len());
        }
        self.agents.clear();
        self.agents.shrink_to_fit();
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn agents(&self) -> &[SimAgent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn count_of(&self, kind: AgentKind) -> usize {
        self.agents.iter().filter(|agent| agent.kind == kind).count()
    }

    pub fn planner(&self) -> &PathPlanner {
        &self.planner
    }

    pub fn transforms(&self) -> Vec<AgentTransform> {
        self.agents
            .iter()
            .map(|agent| AgentTransform {
                id: agent.id,
                kind: agent.kind,
                x: agent.position.x,
                y: agent.position.y,
                z: agent.position.z,
                heading: agent.heading,
                stopped: agent.stopped,
            })
            .collect()
    }
}
