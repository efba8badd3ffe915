//! Order generation and the delivery state machine
//!
//! The lifecycle owns every outstanding order and the single active-order
//! slot. `accept` is the only way into the slot; completion and failure are
//! the only ways out. Terminal orders leave the outstanding set immediately.

use log::{debug, info, warn};
use ordered_float::OrderedFloat;

use super::config::SimConfig;
use super::effects::{EffectsPort, SimEvent};
use super::order::{Order, OrderError, OrderKind, OrderStatus};
use super::rng::SimRng;
use super::types::{MapBounds, OrderId, Point2, SimId, MIN_ORDER_SEPARATION};
use super::world_gen::{CityMap, LocationKind, NamedLocation};

/// Attempts at finding a well separated delivery before falling back to the
/// farthest one
pub const MAX_SEPARATION_ATTEMPTS: usize = 32;

const CUSTOMER_NAMES: [&str; 16] = [
    "Alex Morgan",
    "Sam Rivera",
    "Jordan Lee",
    "Taylor Kim",
    "Casey Patel",
    "Riley Chen",
    "Jamie Novak",
    "Avery Santos",
    "Quinn Okafor",
    "Morgan Silva",
    "Drew Tanaka",
    "Robin Haddad",
    "Skyler Jensen",
    "Reese Moreau",
    "Parker Ivanov",
    "Rowan Adeyemi",
];

/// A transition fired by the lifecycle during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    PickedUp { order: OrderId },
    Delivered { order: OrderId, reward: u32 },
    Failed { order: OrderId },
}

/// What happened to orders during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderTickOutcome {
    pub generated: Option<OrderId>,
    pub transition: Option<OrderEvent>,
}

pub struct OrderLifecycle {
    /// Outstanding (non-terminal) orders in creation order
    orders: Vec<Order>,
    /// The player's current order; only `accept` sets it
    active: Option<OrderId>,
    pickups: Vec<NamedLocation>,
    deliveries: Vec<NamedLocation>,
    bounds: MapBounds,
    next_id: usize,

    order_cap: usize,
    order_interval: f32,
    generation_timer: f32,
    generating: bool,

    pickup_radius: f32,
    delivery_radius: f32,
    fail_overdue_orders: bool,

    completed: usize,
    failed: usize,
}

impl OrderLifecycle {
    /// Create a lifecycle with no orders
    pub fn new(config: &SimConfig, city: &CityMap) -> Self {
        Self {
            orders: Vec::with_capacity(config.order_cap),
            active: None,
            pickups: city
                .landmarks_of(LocationKind::Business)
                .map(|landmark| landmark.location.clone())
                .collect(),
            deliveries: city
                .landmarks_of(LocationKind::Residence)
                .map(|landmark| landmark.location.clone())
                .collect(),
            bounds: city.bounds,
            next_id: 0,
            order_cap: config.order_cap,
            order_interval: config.order_interval,
            generation_timer: 0.0,
            generating: true,
            pickup_radius: config.pickup_radius,
            delivery_radius: config.delivery_radius,
            fail_overdue_orders: config.fail_overdue_orders,
            completed: 0,
            failed: 0,
        }
    }

    /// Top the outstanding set up to the cap
    pub fn fill_to_cap(&mut self, rng: &mut SimRng, effects: &mut dyn EffectsPort) {
        while self.generating && self.orders.len() < self.order_cap {
            match self.generate_order(rng) {
                Some(order) => effects.emit(&SimEvent::OrderGenerated { order }),
                None => break,
            }
        }
    }

    fn next_order_id(&mut self) -> OrderId {
        let id = OrderId(SimId(self.next_id));
        self.next_id += 1;
        id
    }

    /// Generate a random `Available` order from the location table.
    ///
    /// Pickup and delivery are re-drawn while they lie within 20 units of
    /// each other on both axes. Returns `None` when the table is empty.
    pub fn generate_order(&mut self, rng: &mut SimRng) -> Option<OrderId> {
        let pickup = rng.choose(&self.pickups)?.clone();
        let delivery = self.pick_delivery(&pickup.position, rng)?;

        let kind = OrderKind::ALL[rng.random_index(OrderKind::ALL.len())];
        let (min_weight, max_weight) = kind.weight_range();
        let weight = (rng.random_inclusive(min_weight, max_weight) * 10.0).round() / 10.0;
        let fragile = rng.chance(kind.fragile_chance());
        let customer = CUSTOMER_NAMES[rng.random_index(CUSTOMER_NAMES.len())];

        let id = self.next_order_id();
        let order = Order::new(id, kind, pickup, delivery, weight, fragile, customer);
        debug!(
            "Generated order {}: {:?} from '{}' to '{}' ({:.1} units, ${}, {}s)",
            id, kind, order.pickup.label, order.delivery.label, order.distance, order.reward,
            order.time_limit
        );
        self.orders.push(order);
        Some(id)
    }

    fn pick_delivery(&self, pickup: &Point2, rng: &mut SimRng) -> Option<NamedLocation> {
        for _ in 0..MAX_SEPARATION_ATTEMPTS {
            let candidate = rng.choose(&self.deliveries)?;
            let dx = (candidate.position.x - pickup.x).abs();
            let dz = (candidate.position.z - pickup.z).abs();
            if dx >= MIN_ORDER_SEPARATION || dz >= MIN_ORDER_SEPARATION {
                return Some(candidate.clone());
            }
        }
        self.deliveries
            .iter()
            .max_by_key(|location| OrderedFloat(location.position.distance(pickup)))
            .cloned()
    }

    /// Add a caller-specified order. Both locations must be on the map.
    pub fn post_order(
        &mut self,
        kind: OrderKind,
        pickup: NamedLocation,
        delivery: NamedLocation,
        customer_name: &str,
    ) -> Result<OrderId, OrderError> {
        for location in [&pickup, &delivery] {
            if !self.bounds.contains(&location.position) {
                return Err(OrderError::OutOfBounds {
                    x: location.position.x,
                    z: location.position.z,
                });
            }
        }

        let (min_weight, max_weight) = kind.weight_range();
        let id = self.next_order_id();
        let order = Order::new(
            id,
            kind,
            pickup,
            delivery,
            (min_weight + max_weight) / 2.0,
            false,
            customer_name,
        );
        self.orders.push(order);
        Ok(id)
    }

    /// Take an `Available` order. Rejected while another order is active.
    pub fn accept(&mut self, id: OrderId, effects: &mut dyn EffectsPort) -> Result<(), OrderError> {
        if let Some(active) = self.active {
            warn!("Rejected accept of order {}: order {} is active", id, active);
            return Err(OrderError::ActiveOrderExists { active });
        }

        let order = self.get_mut(id)?;
        order.transition(OrderStatus::Accepted)?;
        order.time_remaining = order.time_limit as f32;
        self.active = Some(id);

        info!("Accepted order {}", id);
        effects.emit(&SimEvent::OrderAccepted { order: id });
        Ok(())
    }

    /// Collect the active order's goods; the player must be at the pickup
    pub fn pick_up(
        &mut self,
        id: OrderId,
        player: &Point2,
        effects: &mut dyn EffectsPort,
    ) -> Result<(), OrderError> {
        let radius = self.pickup_radius;
        let order = self.get_mut(id)?;
        if !order.status.can_transition_to(OrderStatus::PickedUp) {
            return Err(OrderError::InvalidTransition {
                order: id,
                from: order.status,
                to: OrderStatus::PickedUp,
            });
        }
        let distance = order.pickup.position.distance(player);
        if distance > radius {
            return Err(OrderError::NotInRange { order: id, distance });
        }
        order.transition(OrderStatus::PickedUp)?;

        info!("Picked up order {} at '{}'", id, order.pickup.label);
        effects.emit(&SimEvent::OrderPickedUp { order: id });
        Ok(())
    }

    /// Hand over the active order; returns the reward
    pub fn deliver(
        &mut self,
        id: OrderId,
        player: &Point2,
        effects: &mut dyn EffectsPort,
    ) -> Result<u32, OrderError> {
        let order = self.get(id).ok_or(OrderError::UnknownOrder(id))?;
        if !order.status.can_transition_to(OrderStatus::Completed) {
            return Err(OrderError::InvalidTransition {
                order: id,
                from: order.status,
                to: OrderStatus::Completed,
            });
        }
        let distance = order.delivery.position.distance(player);
        if distance > self.delivery_radius {
            return Err(OrderError::NotInRange { order: id, distance });
        }

        let mut order = self.remove(id)?;
        order.transition(OrderStatus::Completed)?;
        if self.active == Some(id) {
            self.active = None;
        }
        self.completed += 1;

        info!(
            "Delivered order {} to {} at '{}' for ${}",
            id, order.customer_name, order.delivery.label, order.reward
        );
        effects.emit(&SimEvent::OrderDelivered {
            order: id,
            reward: order.reward,
        });
        Ok(order.reward)
    }

    /// Fail any non-terminal order
    pub fn cancel(&mut self, id: OrderId, effects: &mut dyn EffectsPort) -> Result<(), OrderError> {
        let status = self.get(id).ok_or(OrderError::UnknownOrder(id))?.status;
        if !status.can_transition_to(OrderStatus::Failed) {
            return Err(OrderError::InvalidTransition {
                order: id,
                from: status,
                to: OrderStatus::Failed,
            });
        }

        let mut order = self.remove(id)?;
        order.transition(OrderStatus::Failed)?;
        if self.active == Some(id) {
            self.active = None;
        }
        self.failed += 1;

        info!("Order {} failed (was {})", id, status);
        effects.emit(&SimEvent::OrderFailed { order: id });
        Ok(())
    }

    /// Advance timers and fire at most one proximity transition
    pub fn update(
        &mut self,
        player: &Point2,
        delta_secs: f32,
        rng: &mut SimRng,
        effects: &mut dyn EffectsPort,
    ) -> OrderTickOutcome {
        let mut outcome = OrderTickOutcome::default();

        if self.generating {
            self.generation_timer += delta_secs;
            if self.generation_timer >= self.order_interval {
                self.generation_timer -= self.order_interval;
                if self.orders.len() < self.order_cap {
                    outcome.generated = self.generate_order(rng);
                    if let Some(order) = outcome.generated {
                        effects.emit(&SimEvent::OrderGenerated { order });
                    }
                }
            }
        }

        let pickup_radius = self.pickup_radius;
        let delivery_radius = self.delivery_radius;
        let Some(active) = self.active_order_mut() else {
            return outcome;
        };
        let id = active.id;
        active.time_remaining = (active.time_remaining - delta_secs).max(0.0);
        let status = active.status;
        let overdue = active.is_overdue();
        let near_pickup = active.pickup.position.distance(player) <= pickup_radius;
        let near_delivery = active.delivery.position.distance(player) <= delivery_radius;

        outcome.transition = match status {
            OrderStatus::Accepted if near_pickup => self
                .pick_up(id, player, effects)
                .ok()
                .map(|_| OrderEvent::PickedUp { order: id }),
            OrderStatus::PickedUp if near_delivery => self
                .deliver(id, player, effects)
                .ok()
                .map(|reward| OrderEvent::Delivered { order: id, reward }),
            _ if overdue && self.fail_overdue_orders => {
                warn!("Order {} ran out of time", id);
                self.cancel(id, effects)
                    .ok()
                    .map(|_| OrderEvent::Failed { order: id })
            }
            _ => None,
        };

        outcome
    }

    /// Stop background generation for good. Safe to call repeatedly.
    pub fn stop_generation(&mut self) {
        if self.generating {
            info!("Order generation stopped");
        }
        self.generating = false;
        self.generation_timer = 0.0;
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }

    fn get_mut(&mut self, id: OrderId) -> Result<&mut Order, OrderError> {
        self.orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(OrderError::UnknownOrder(id))
    }

    fn remove(&mut self, id: OrderId) -> Result<Order, OrderError> {
        let index = self
            .orders
            .iter()
            .position(|order| order.id == id)
            .ok_or(OrderError::UnknownOrder(id))?;
        Ok(self.orders.remove(index))
    }

    pub fn active_id(&self) -> Option<OrderId> {
        self.active
    }

    pub fn active_order(&self) -> Option<&Order> {
        self.active.and_then(|id| self.get(id))
    }

    fn active_order_mut(&mut self) -> Option<&mut Order> {
        let id = self.active?;
        self.orders.iter_mut().find(|order| order.id == id)
    }

    /// All outstanding orders, oldest first
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn available_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders
            .iter()
            .filter(|order| order.status == OrderStatus::Available)
    }

    pub fn outstanding(&self) -> usize {
        self.orders.len()
    }

    pub fn order_cap(&self) -> usize {
        self.order_cap
    }

    pub fn completed_count(&self) -> usize {
        self.completed
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    pub fn bounds(&self) -> &MapBounds {
        &self.bounds
    }
}
