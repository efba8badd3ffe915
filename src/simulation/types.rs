//! Core types for the delivery simulation
//!
//! These are standalone types with no rendering dependencies.

use std::fmt;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for agent IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentId(pub SimId);

/// A wrapper type for order IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(pub SimId);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 .0)
    }
}

/// A wrapper type for building IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildingId(pub SimId);

/// A point on the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f32,
    pub z: f32,
}

impl Point2 {
    pub const ZERO: Point2 = Point2 { x: 0.0, z: 0.0 };

    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub fn distance(&self, other: &Point2) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector
    pub fn normalized(&self) -> Point2 {
        let len = self.length();
        if len > 0.0 {
            Point2::new(self.x / len, self.z / len)
        } else {
            Point2::ZERO
        }
    }

    pub fn lerp(&self, other: &Point2, t: f32) -> Point2 {
        Point2 {
            x: self.x + (other.x - self.x) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// A 3D position in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance on the ground plane, ignoring height
    pub fn ground_distance(&self, other: &Point2) -> f32 {
        self.ground().distance(other)
    }

    pub fn ground(&self) -> Point2 {
        Point2::new(self.x, self.z)
    }

    pub fn lerp(&self, other: &Position, t: f32) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Calculate the angle from this position to another (Y-axis rotation)
    pub fn angle_to(&self, other: &Position) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        let direction_len = (dx * dx + dz * dz).sqrt();
        if direction_len > 0.0 {
            (dx / direction_len).atan2(dz / direction_len)
        } else {
            0.0
        }
    }
}

/// Axis-aligned rectangle that contains everything reachable on the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub min: Point2,
    pub max: Point2,
}

impl MapBounds {
    /// Square bounds centred on the origin
    pub fn centered(half_extent: f32) -> Self {
        Self {
            min: Point2::new(-half_extent, -half_extent),
            max: Point2::new(half_extent, half_extent),
        }
    }

    pub fn contains(&self, point: &Point2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.z >= self.min.z && point.z <= self.max.z
    }

    pub fn clamp(&self, point: Point2) -> Point2 {
        Point2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.z.clamp(self.min.z, self.max.z),
        )
    }
}

/// Wrap an angle into [-PI, PI]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let mut wrapped = angle % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped < -PI {
        wrapped += TAU;
    }
    wrapped
}

/// Radius of the player's collision circle
pub const PLAYER_RADIUS: f32 = 0.5;

/// Distance at which an agent considers a waypoint reached
pub const ARRIVAL_THRESHOLD: f32 = 0.5;

/// Fraction of the heading error an agent corrects per second
pub const TURN_RATE: f32 = 5.0;

/// Clear space kept between a building footprint and the road edge
pub const BUILDING_MARGIN: f32 = 1.0;

/// Smallest building footprint side
pub const MIN_FOOTPRINT: f32 = 4.0;

/// Largest building footprint side
pub const MAX_FOOTPRINT: f32 = 10.0;

/// Building height range
pub const MIN_BUILDING_HEIGHT: f32 = 10.0;
pub const MAX_BUILDING_HEIGHT: f32 = 30.0;

/// Pickup and delivery must differ by at least this much on one axis
pub const MIN_ORDER_SEPARATION: f32 = 20.0;
