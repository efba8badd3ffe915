//! Delivery orders
//!
//! An order moves through a fixed set of states. Reward and time limit are
//! pure functions of the pickup-to-delivery distance.

use std::fmt;

use thiserror::Error;

use super::types::{OrderId, Point2};
use super::world_gen::NamedLocation;

/// Flat bonus added to every reward
pub const BASE_REWARD: u32 = 50;

/// Shortest time limit any order gets, in seconds
pub const MIN_TIME_LIMIT: u32 = 60;

/// Seconds added on top of the distance-derived time
pub const BASE_TIME: u32 = 30;

/// Order status. Terminal states are `Completed` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Available,
    Accepted,
    PickedUp,
    Completed,
    Failed,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Failed)
    }

    /// Accepted or picked up: the order the player is working on
    pub fn is_in_progress(&self) -> bool {
        matches!(self, OrderStatus::Accepted | OrderStatus::PickedUp)
    }

    /// Whether `self -> next` is a legal single step
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Available, OrderStatus::Accepted)
                | (OrderStatus::Accepted, OrderStatus::PickedUp)
                | (OrderStatus::PickedUp, OrderStatus::Completed)
                | (OrderStatus::Available, OrderStatus::Failed)
                | (OrderStatus::Accepted, OrderStatus::Failed)
                | (OrderStatus::PickedUp, OrderStatus::Failed)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Available => "available",
            OrderStatus::Accepted => "accepted",
            OrderStatus::PickedUp => "picked up",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What is being delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Food,
    Grocery,
    Parcel,
    Documents,
    Flowers,
}

impl OrderKind {
    pub const ALL: [OrderKind; 5] = [
        OrderKind::Food,
        OrderKind::Grocery,
        OrderKind::Parcel,
        OrderKind::Documents,
        OrderKind::Flowers,
    ];

    /// Weight range in kilograms
    pub fn weight_range(&self) -> (f32, f32) {
        match self {
            OrderKind::Food => (0.5, 3.0),
            OrderKind::Grocery => (2.0, 12.0),
            OrderKind::Parcel => (0.5, 20.0),
            OrderKind::Documents => (0.1, 1.0),
            OrderKind::Flowers => (0.5, 2.5),
        }
    }

    /// Probability that an order of this kind is fragile
    pub fn fragile_chance(&self) -> f64 {
        match self {
            OrderKind::Food => 0.3,
            OrderKind::Grocery => 0.2,
            OrderKind::Parcel => 0.25,
            OrderKind::Documents => 0.0,
            OrderKind::Flowers => 0.8,
        }
    }
}

/// Rejected calls into the order lifecycle. State is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    #[error("order {0} does not exist")]
    UnknownOrder(OrderId),
    #[error("order {active} is already active")]
    ActiveOrderExists { active: OrderId },
    #[error("order {order} cannot go from {from} to {to}")]
    InvalidTransition {
        order: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },
    #[error("order {order} is {distance:.1} units away")]
    NotInRange { order: OrderId, distance: f32 },
    #[error("location ({x:.1}, {z:.1}) is outside the map")]
    OutOfBounds { x: f32, z: f32 },
}

/// `floor(distance * 2) + 50`
pub fn reward_for_distance(distance: f32) -> u32 {
    (distance.max(0.0) * 2.0).floor() as u32 + BASE_REWARD
}

/// `max(60, floor(distance / 2) + 30)`, in seconds
pub fn time_limit_for_distance(distance: f32) -> u32 {
    ((distance.max(0.0) / 2.0).floor() as u32 + BASE_TIME).max(MIN_TIME_LIMIT)
}

/// A delivery order
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub kind: OrderKind,
    pub pickup: NamedLocation,
    pub delivery: NamedLocation,
    pub distance: f32,
    /// Seconds allowed from acceptance
    pub time_limit: u32,
    pub reward: u32,
    pub weight: f32,
    pub fragile: bool,
    pub customer_name: String,
    pub status: OrderStatus,
    pub picked_up: bool,
    /// Seconds left once accepted
    pub time_remaining: f32,
}

impl Order {
    pub fn new(
        id: OrderId,
        kind: OrderKind,
        pickup: NamedLocation,
        delivery: NamedLocation,
        weight: f32,
        fragile: bool,
        customer_name: impl Into<String>,
    ) -> Self {
        let distance = pickup.position.distance(&delivery.position);
        let time_limit = time_limit_for_distance(distance);
        Self {
            id,
            kind,
            pickup,
            delivery,
            distance,
            time_limit,
            reward: reward_for_distance(distance),
            weight,
            fragile,
            customer_name: customer_name.into(),
            status: OrderStatus::Available,
            picked_up: false,
            time_remaining: time_limit as f32,
        }
    }

    /// Where the player should head next, if anywhere
    pub fn target(&self) -> Option<&NamedLocation> {
        match self.status {
            OrderStatus::Available | OrderStatus::Accepted => Some(&self.pickup),
            OrderStatus::PickedUp => Some(&self.delivery),
            OrderStatus::Completed | OrderStatus::Failed => None,
        }
    }

    pub fn target_position(&self) -> Option<Point2> {
        self.target().map(|location| location.position)
    }

    pub fn is_overdue(&self) -> bool {
        self.status.is_in_progress() && self.time_remaining <= 0.0
    }

    /// Apply a single legal step, or explain why it is not legal
    pub fn transition(&mut self, next: OrderStatus) -> Result<OrderStatus, OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                order: self.id,
                from: self.status,
                to: next,
            });
        }
        let previous = self.status;
        self.status = next;
        if next == OrderStatus::PickedUp {
            self.picked_up = true;
        }
        Ok(previous)
    }
}
