//! Main simulation world that ties everything together
//!
//! `SimWorld` owns the generated city, the collision index, the agent pool,
//! the order lifecycle and the clock, and runs them in a fixed order each
//! step. Presentation reads a `FrameSnapshot`.

use anyhow::{Context, Result};
use log::info;

use super::agent::AgentKind;
use super::agent_manager::{AgentSimulator, AgentTickSummary, AgentTransform};
use super::clock::SimulationClock;
use super::collision::CollisionSystem;
use super::config::SimConfig;
use super::effects::{EffectsPort, NoEffects, SimEvent};
use super::game_state::GameState;
use super::order::{Order, OrderError, OrderStatus};
use super::order_lifecycle::{OrderEvent, OrderLifecycle};
use super::player::{PlayerInput, PlayerState, TrailingCamera};
use super::rng::SimRng;
use super::types::{OrderId, Point2};
use super::world_gen::{self, CityMap, NamedLocation};

/// What one call to `tick` did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Simulation steps run for the frame
    pub steps: u32,
    /// Agent tallies from the last step
    pub agents: AgentTickSummary,
    pub generated_orders: Vec<OrderId>,
    pub order_events: Vec<OrderEvent>,
    /// Rewards collected during the frame
    pub reward: u32,
    pub session_over: bool,
}

/// The active order as the HUD needs it
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveOrderView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub target: NamedLocation,
    pub time_remaining: f32,
    pub reward: u32,
    /// Navigation overlay from the player to the target
    pub route: Vec<Point2>,
}

/// Immutable per-frame state handed to presentation
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub elapsed: f32,
    pub delta: f32,
    pub remaining: f32,
    pub session_over: bool,
    pub player: Point2,
    pub player_facing: f32,
    pub camera: TrailingCamera,
    pub agents: Vec<AgentTransform>,
    pub active_order: Option<ActiveOrderView>,
    pub available_orders: usize,
    pub stats: GameState,
}

/// The main simulation world
pub struct SimWorld<E: EffectsPort = NoEffects> {
    config: SimConfig,

    /// Generated geometry, read-only after load
    pub city: CityMap,

    pub collision: CollisionSystem,

    pub agents: AgentSimulator,

    pub orders: OrderLifecycle,

    pub clock: SimulationClock,

    pub player: PlayerState,

    pub camera: TrailingCamera,

    /// Earnings and delivery record
    pub game_state: GameState,

    rng: SimRng,

    effects: E,

    session_reported: bool,

    torn_down: bool,
}

impl SimWorld<NoEffects> {
    pub fn new(config: SimConfig) -> Result<Self> {
        Self::with_effects(config, NoEffects)
    }

    /// Create a world with a seeded RNG for reproducible simulations
    pub fn new_with_seed(mut config: SimConfig, seed: u64) -> Result<Self> {
        config.seed = Some(seed);
        Self::new(config)
    }
}

impl<E: EffectsPort> SimWorld<E> {
    /// Validate the config, then generate the city, the agent pool and the
    /// initial orders
    pub fn with_effects(config: SimConfig, mut effects: E) -> Result<Self> {
        config.validate().context("invalid simulation config")?;

        let mut rng = SimRng::new(config.seed);
        let city = world_gen::generate(&config, &mut rng);
        let collision = CollisionSystem::from_city(&city);
        let agents = AgentSimulator::new(&config, &city, &mut rng);
        let mut orders = OrderLifecycle::new(&config, &city);
        orders.fill_to_cap(&mut rng, &mut effects);

        // The origin is always a road intersection
        let player = PlayerState::new(Point2::ZERO);
        let camera = TrailingCamera::follow(&player, &collision);
        let clock = SimulationClock::from_config(&config);

        info!(
            "World ready: {} agents, {} orders, session {:.0}s{}",
            agents.len(),
            orders.outstanding(),
            config.session_length,
            if rng.is_seeded() { " (seeded)" } else { "" }
        );

        Ok(Self {
            config,
            city,
            collision,
            agents,
            orders,
            clock,
            player,
            camera,
            game_state: GameState::new(),
            rng,
            effects,
            session_reported: false,
            torn_down: false,
        })
    }

    /// Advance one rendered frame
    pub fn tick(&mut self, raw_delta: f32, input: &PlayerInput) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.torn_down {
            return outcome;
        }

        let steps = self.clock.begin_frame(raw_delta);
        for step in 0..steps.count {
            // Only the first step starts from the controller's position
            let step_input = if step == 0 {
                *input
            } else {
                PlayerInput {
                    position: self.player.position,
                    ..*input
                }
            };
            self.step(steps.delta, &step_input, &mut outcome);
            outcome.steps += 1;
            if self.clock.is_session_over() {
                break;
            }
        }

        if steps.count > 0 {
            self.camera = TrailingCamera::follow(&self.player, &self.collision);
        }
        if self.clock.is_session_over() {
            self.end_session();
        }
        outcome.session_over = self.clock.is_session_over();
        outcome
    }

    /// One simulation step in the fixed order: clock, player, agents, orders
    fn step(&mut self, delta: f32, input: &PlayerInput, outcome: &mut TickOutcome) {
        let applied = self.clock.step(delta);

        let moved = self.player.apply_input(
            input,
            applied,
            &self.city.bounds,
            &self.collision,
        );

        outcome.agents = self.agents.update(
            applied,
            &self.player.position,
            &mut self.rng,
            &mut self.effects,
        );

        let order_outcome = self.orders.update(
            &self.player.position,
            applied,
            &mut self.rng,
            &mut self.effects,
        );
        if let Some(order) = order_outcome.generated {
            outcome.generated_orders.push(order);
        }
        if let Some(event) = order_outcome.transition {
            match event {
                OrderEvent::Delivered { reward, .. } => {
                    self.game_state.record_delivery(reward);
                    outcome.reward += reward;
                }
                OrderEvent::Failed { .. } => self.game_state.record_failure(),
                OrderEvent::PickedUp { .. } => {}
            }
            outcome.order_events.push(event);
        }

        self.game_state.update(applied, moved);
    }

    fn end_session(&mut self) {
        if self.session_reported {
            return;
        }
        self.session_reported = true;
        self.orders.stop_generation();
        info!("Session over: {}", self.game_state.summary());
        self.effects.emit(&SimEvent::SessionOver {
            earnings: self.game_state.earnings,
        });
    }

    /// Accept an available order as the player's active order
    pub fn accept_order(&mut self, id: OrderId) -> Result<(), OrderError> {
        self.orders.accept(id, &mut self.effects)
    }

    /// Cancel an order; a cancelled order counts as failed
    pub fn cancel_order(&mut self, id: OrderId) -> Result<(), OrderError> {
        self.orders.cancel(id, &mut self.effects)?;
        self.game_state.record_failure();
        Ok(())
    }

    pub fn available_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.available_orders()
    }

    pub fn active_order(&self) -> Option<&Order> {
        self.orders.active_order()
    }

    /// Stop order generation and release the agent pool. Idempotent.
    pub fn shutdown(&mut self) {
        if self.torn_down {
            return;
        }
        self.orders.stop_generation();
        self.agents.release();
        self.torn_down = true;
        info!("Simulation torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn is_session_over(&self) -> bool {
        self.clock.is_session_over()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut E {
        &mut self.effects
    }

    /// Navigation route from the player to a point
    pub fn route_to(&self, target: Point2) -> Vec<Point2> {
        self.agents.planner().route(self.player.position, target)
    }

    /// Owned view of the current state for presentation
    pub fn snapshot(&self) -> FrameSnapshot {
        let active_order = self.orders.active_order().and_then(|order| {
            order.target().map(|target| ActiveOrderView {
                id: order.id,
                status: order.status,
                target: target.clone(),
                time_remaining: order.time_remaining,
                reward: order.reward,
                route: self.route_to(target.position),
            })
        });

        FrameSnapshot {
            frame: self.clock.frame(),
            elapsed: self.clock.elapsed(),
            delta: self.clock.delta(),
            remaining: self.clock.remaining(),
            session_over: self.clock.is_session_over(),
            player: self.player.position,
            player_facing: self.player.facing,
            camera: self.camera,
            agents: self.agents.transforms(),
            active_order,
            available_orders: self.orders.available_orders().count(),
            stats: self.game_state.clone(),
        }
    }

    /// Log a summary of the world state
    pub fn log_summary(&self) {
        info!("=== Courier Simulation Summary ===");
        info!(
            "Time: {:.2}s elapsed, {:.2}s remaining",
            self.clock.elapsed(),
            self.clock.remaining()
        );
        info!(
            "City: {} blocks ({} plazas), {} buildings, {} roads",
            self.city.blocks.len(),
            self.city.blocks.iter().filter(|b| b.is_plaza()).count(),
            self.city.building_count(),
            self.city.road_count()
        );
        info!(
            "Agents: {} vehicles ({} stopped), {} pedestrians",
            self.agents.count_of(AgentKind::Vehicle),
            self.agents.agents().iter().filter(|a| a.stopped).count(),
            self.agents.count_of(AgentKind::Pedestrian)
        );
        info!(
            "Player at ({:.1}, {:.1})",
            self.player.position.x, self.player.position.z
        );
        match self.orders.active_order() {
            Some(order) => info!(
                "Active order {}: {} -> '{}' ({:.0}s left, ${})",
                order.id,
                order.status,
                order.target().map(|t| t.label.as_str()).unwrap_or("-"),
                order.time_remaining,
                order.reward
            ),
            None => info!(
                "No active order, {} available",
                self.orders.available_orders().count()
            ),
        }
        info!("{}", self.game_state.summary());
    }

    /// Draw the world as text, `units_per_cell` world units per character
    pub fn ascii_map(&self, units_per_cell: f32) -> String {
        let scale = units_per_cell.max(0.5);
        let bounds = self.city.bounds;
        let width = ((bounds.max.x - bounds.min.x) / scale).ceil() as usize + 1;
        let height = ((bounds.max.z - bounds.min.z) / scale).ceil() as usize + 1;
        let mut grid = vec![vec![' '; width]; height];

        // North (+z) at the top
        let to_grid = |p: Point2| -> Option<(usize, usize)> {
            if !bounds.contains(&p) {
                return None;
            }
            let col = ((p.x - bounds.min.x) / scale) as usize;
            let row = ((bounds.max.z - p.z) / scale) as usize;
            Some((row.min(height - 1), col.min(width - 1)))
        };

        for road in &self.city.roads {
            let samples = (road.length() / scale).ceil() as usize;
            for i in 0..=samples {
                let t = i as f32 / samples.max(1) as f32;
                if let Some((row, col)) = to_grid(road.start.lerp(&road.end, t)) {
                    grid[row][col] = '.';
                }
            }
        }

        for building in self.city.buildings() {
            let (min, max) = (building.min(), building.max());
            let mut z = min.z;
            while z <= max.z {
                let mut x = min.x;
                while x <= max.x {
                    if let Some((row, col)) = to_grid(Point2::new(x, z)) {
                        grid[row][col] = '#';
                    }
                    x += scale;
                }
                z += scale;
            }
        }

        for agent in self.agents.agents() {
            if let Some((row, col)) = to_grid(agent.position.ground()) {
                grid[row][col] = match agent.kind {
                    AgentKind::Vehicle => 'v',
                    AgentKind::Pedestrian => 'p',
                };
            }
        }

        if let Some(order) = self.orders.active_order() {
            if let Some((row, col)) = to_grid(order.pickup.position) {
                grid[row][col] = 'P';
            }
            if let Some((row, col)) = to_grid(order.delivery.position) {
                grid[row][col] = 'D';
            }
        }

        if let Some((row, col)) = to_grid(self.player.position) {
            grid[row][col] = '@';
        }

        let mut out = String::with_capacity((width + 1) * (height + 3));
        out.push_str("Legend: #=Building, .=Road, v=Vehicle, p=Pedestrian, P=Pickup, D=Delivery, @=Courier\n");
        for row in &grid {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }
}
