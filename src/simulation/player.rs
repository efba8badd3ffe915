//! Player movement and the trailing camera
//!
//! The controller layer owns input; the core turns an intent into a
//! collision-free position and keeps the camera out of buildings.

use super::collision::CollisionSystem;
use super::types::{MapBounds, Point2, Position};

/// Walking speed in units per second
pub const WALK_SPEED: f32 = 8.0;

/// Speed multiplier while sprinting
pub const SPRINT_MULTIPLIER: f32 = 1.75;

/// Camera distance behind the player
pub const CAMERA_DISTANCE: f32 = 10.0;

/// Camera height above the ground
pub const CAMERA_HEIGHT: f32 = 6.0;

/// Height of the point the camera looks at
pub const CAMERA_ANCHOR_HEIGHT: f32 = 1.5;

/// Input consumed every tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerInput {
    /// Current position reported by the controller
    pub position: Point2,
    /// Desired movement direction; any length, zero for standing still
    pub intent: Point2,
    pub sprint: bool,
}

impl PlayerInput {
    /// Stand still at `position`
    pub fn at(position: Point2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Move from `position` along `intent`
    pub fn moving(position: Point2, intent: Point2, sprint: bool) -> Self {
        Self {
            position,
            intent,
            sprint,
        }
    }
}

/// The player as seen by the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub position: Point2,
    /// Y-axis rotation of the last movement, 0 facing +z
    pub facing: f32,
}

impl PlayerState {
    pub fn new(position: Point2) -> Self {
        Self {
            position,
            facing: 0.0,
        }
    }

    /// Apply one tick of input; returns the ground distance moved
    pub fn apply_input(
        &mut self,
        input: &PlayerInput,
        delta_secs: f32,
        bounds: &MapBounds,
        collision: &CollisionSystem,
    ) -> f32 {
        let start = bounds.clamp(input.position);
        let direction = input.intent.normalized();
        let speed = if input.sprint {
            WALK_SPEED * SPRINT_MULTIPLIER
        } else {
            WALK_SPEED
        };

        let desired = bounds.clamp(Point2::new(
            start.x + direction.x * speed * delta_secs,
            start.z + direction.z * speed * delta_secs,
        ));
        let (x, z) = collision.resolve_player_move(desired.x, desired.z);
        let resolved = Point2::new(x, z);

        if direction.length() > 0.0 {
            self.facing = direction.x.atan2(direction.z);
        }
        let moved = self.position.distance(&resolved);
        self.position = resolved;
        moved
    }
}

/// Camera that follows behind the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailingCamera {
    pub position: Position,
    pub target: Position,
}

impl TrailingCamera {
    /// Camera placed behind `player`, pulled in front of any building in the
    /// way
    pub fn follow(player: &PlayerState, collision: &CollisionSystem) -> Self {
        let anchor = Position::new(player.position.x, CAMERA_ANCHOR_HEIGHT, player.position.z);
        let desired = Position::new(
            player.position.x - player.facing.sin() * CAMERA_DISTANCE,
            CAMERA_HEIGHT,
            player.position.z - player.facing.cos() * CAMERA_DISTANCE,
        );
        Self {
            position: collision.resolve_camera_occlusion(desired, anchor),
            target: anchor,
        }
    }
}
