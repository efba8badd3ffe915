//! Static collision against building footprints
//!
//! The index is a flat list of AABBs rebuilt from a generated city; it is
//! never mutated afterwards. Resolution is single-pass: only the first box
//! the point falls into is used, and a second overlap is left to the next
//! frame's check.

use super::types::{Point2, Position, PLAYER_RADIUS};
use super::world_gen::{Building, CityMap};

/// Number of samples taken when marching the camera ray
pub const OCCLUSION_STEPS: u32 = 20;

/// How far towards the last clear sample the camera is placed on a hit
pub const OCCLUSION_PULLBACK: f32 = 0.9;

/// Read-only box derived from a building
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionBox {
    pub min: Point2,
    pub max: Point2,
    pub height: f32,
}

impl CollisionBox {
    pub fn from_building(building: &Building) -> Self {
        Self {
            min: building.min(),
            max: building.max(),
            height: building.height,
        }
    }

    /// Box grown by `radius` on every side of the footprint
    pub fn expanded(&self, radius: f32) -> CollisionBox {
        CollisionBox {
            min: Point2::new(self.min.x - radius, self.min.z - radius),
            max: Point2::new(self.max.x + radius, self.max.z + radius),
            height: self.height,
        }
    }

    /// Strict containment; a point on the edge is outside
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x > self.min.x && x < self.max.x && z > self.min.z && z < self.max.z
    }

    /// Containment in 3D, treating the box as a column from the ground up
    pub fn contains_position(&self, position: &Position) -> bool {
        position.y < self.height && self.contains(position.x, position.z)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollisionSystem {
    boxes: Vec<CollisionBox>,
    player_radius: f32,
}

impl CollisionSystem {
    pub fn new<'a>(buildings: impl IntoIterator<Item = &'a Building>) -> Self {
        Self {
            boxes: buildings
                .into_iter()
                .map(CollisionBox::from_building)
                .collect(),
            player_radius: PLAYER_RADIUS,
        }
    }

    pub fn from_city(city: &CityMap) -> Self {
        Self::new(city.buildings())
    }

    pub fn boxes(&self) -> &[CollisionBox] {
        &self.boxes
    }

    pub fn player_radius(&self) -> f32 {
        self.player_radius
    }

    /// True when a player circle centred here would overlap any building
    pub fn is_blocked(&self, point: &Point2) -> bool {
        self.boxes
            .iter()
            .any(|b| b.expanded(self.player_radius).contains(point.x, point.z))
    }

    /// Push a desired player position out of the first building it overlaps.
    ///
    /// The point leaves along the axis with the smaller penetration; Z wins
    /// ties.
    pub fn resolve_player_move(&self, new_x: f32, new_z: f32) -> (f32, f32) {
        let mut x = new_x;
        let mut z = new_z;

        let hit = self
            .boxes
            .iter()
            .map(|b| b.expanded(self.player_radius))
            .find(|b| b.contains(x, z));

        if let Some(b) = hit {
            let overlap_left = x - b.min.x;
            let overlap_right = b.max.x - x;
            let overlap_back = z - b.min.z;
            let overlap_front = b.max.z - z;

            let overlap_x = overlap_left.min(overlap_right);
            let overlap_z = overlap_back.min(overlap_front);

            if overlap_x < overlap_z {
                x = if overlap_left < overlap_right {
                    b.min.x
                } else {
                    b.max.x
                };
            } else {
                z = if overlap_back < overlap_front {
                    b.min.z
                } else {
                    b.max.z
                };
            }
        }

        (x, z)
    }

    /// Keep a trailing camera from passing through buildings.
    ///
    /// Marches from `anchor` towards `desired`; the first step whose midpoint
    /// is inside a building pulls the camera back to 90% of the last clear
    /// step.
    pub fn resolve_camera_occlusion(&self, desired: Position, anchor: Position) -> Position {
        if self.boxes.is_empty() {
            return desired;
        }

        let mut last_clear = anchor;
        for step in 1..=OCCLUSION_STEPS {
            let t_mid = (step as f32 - 0.5) / OCCLUSION_STEPS as f32;
            let midpoint = anchor.lerp(&desired, t_mid);

            if self.boxes.iter().any(|b| b.contains_position(&midpoint)) {
                return anchor.lerp(&last_clear, OCCLUSION_PULLBACK);
            }

            last_clear = anchor.lerp(&desired, step as f32 / OCCLUSION_STEPS as f32);
        }

        desired
    }
}
