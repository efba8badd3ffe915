//! Standalone delivery simulation module
//!
//! This module contains the city generator, collision, path planning,
//! agent traffic and the order lifecycle. It has no rendering or audio
//! dependencies and can be driven headless from the console.

mod agent;
mod agent_manager;
mod clock;
mod collision;
mod config;
mod effects;
mod game_state;
mod order;
mod order_lifecycle;
mod path_planner;
mod player;
mod rng;
mod types;
mod world;
mod world_gen;

// Re-export public types for external use
pub use agent::{AgentKind, AgentUpdateResult, SimAgent};
pub use agent_manager::{
    AgentSimulator, AgentTickSummary, AgentTransform, PEDESTRIAN_SPEED_MAX, PEDESTRIAN_SPEED_MIN,
    VEHICLE_SPEED_MAX, VEHICLE_SPEED_MIN,
};
pub use clock::{FrameSteps, SimulationClock};
pub use collision::{CollisionBox, CollisionSystem, OCCLUSION_PULLBACK, OCCLUSION_STEPS};
pub use config::{SimConfig, TimestepMode, MAX_AGENTS_PER_KIND, MAX_GRID_SIZE};
pub use effects::{EffectsPort, LogEffects, NoEffects, RecordedEffects, SimEvent};
pub use game_state::GameState;
pub use order::{
    reward_for_distance, time_limit_for_distance, Order, OrderError, OrderKind, OrderStatus,
    BASE_REWARD, BASE_TIME, MIN_TIME_LIMIT,
};
pub use order_lifecycle::{OrderEvent, OrderLifecycle, OrderTickOutcome, MAX_SEPARATION_ATTEMPTS};
pub use path_planner::{CardinalDirection, PathPlanner, TrafficPath, TURN_TRANSITION_LENGTH};
pub use player::{
    PlayerInput, PlayerState, TrailingCamera, CAMERA_DISTANCE, CAMERA_HEIGHT, SPRINT_MULTIPLIER,
    WALK_SPEED,
};
pub use rng::SimRng;
pub use types::{
    normalize_angle, AgentId, BuildingId, MapBounds, OrderId, Point2, Position, SimId,
    ARRIVAL_THRESHOLD, BUILDING_MARGIN, MAX_BUILDING_HEIGHT, MAX_FOOTPRINT, MIN_BUILDING_HEIGHT,
    MIN_FOOTPRINT, MIN_ORDER_SEPARATION, PLAYER_RADIUS, TURN_RATE,
};
pub use world::{ActiveOrderView, FrameSnapshot, SimWorld, TickOutcome};
pub use world_gen::{
    avenue_name, generate, street_name, Building, CityMap, Landmark, LocationKind, NamedLocation,
    RoadAxis, RoadClass, RoadSegment, WorldBlock, PLAZA_CHANCE,
};
