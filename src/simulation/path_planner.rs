//! Grid-snapped path planning
//!
//! Two kinds of paths come out of here: navigation routes for the player's
//! overlay, which staircase along the road grid between two points, and
//! traffic paths that drive an agent from one city edge to another with an
//! occasional turn at an intersection.

use super::rng::SimRng;
use super::types::{MapBounds, Point2, Position};
use super::world_gen::CityMap;

/// Distance of each turn transition waypoint from the lane corner
pub const TURN_TRANSITION_LENGTH: f32 = 2.0;

/// Direction of travel along a road
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalDirection {
    /// +z
    North,
    /// -z
    South,
    /// +x
    East,
    /// -x
    West,
}

impl CardinalDirection {
    pub const ALL: [CardinalDirection; 4] = [
        CardinalDirection::North,
        CardinalDirection::South,
        CardinalDirection::East,
        CardinalDirection::West,
    ];

    pub fn vector(&self) -> Point2 {
        match self {
            CardinalDirection::North => Point2::new(0.0, 1.0),
            CardinalDirection::South => Point2::new(0.0, -1.0),
            CardinalDirection::East => Point2::new(1.0, 0.0),
            CardinalDirection::West => Point2::new(-1.0, 0.0),
        }
    }

    /// +1 when travelling towards increasing coordinates
    pub fn sign(&self) -> i32 {
        match self {
            CardinalDirection::North | CardinalDirection::East => 1,
            CardinalDirection::South | CardinalDirection::West => -1,
        }
    }

    /// Travel along x (East/West) rather than z
    pub fn is_along_x(&self) -> bool {
        matches!(self, CardinalDirection::East | CardinalDirection::West)
    }

    /// The two directions at right angles to this one
    pub fn perpendicular(&self) -> [CardinalDirection; 2] {
        if self.is_along_x() {
            [CardinalDirection::North, CardinalDirection::South]
        } else {
            [CardinalDirection::East, CardinalDirection::West]
        }
    }

    /// Lane side for this direction of travel
    pub fn lane_side(&self) -> Point2 {
        let d = self.vector();
        Point2::new(-d.z, d.x)
    }
}

/// A planned traffic path
#[derive(Debug, Clone, Default)]
pub struct TrafficPath {
    pub waypoints: Vec<Position>,
    /// Index of the first waypoint of the turn transition, if one fired
    pub turn_at: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct PathPlanner {
    spacing: f32,
    grid_size: i32,
    bounds: MapBounds,
    turn_probability: f64,
}

impl PathPlanner {
    pub fn new(city: &CityMap, turn_probability: f64) -> Self {
        Self {
            spacing: city.block_size,
            grid_size: city.grid_size as i32,
            bounds: city.bounds,
            turn_probability,
        }
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn turn_probability(&self) -> f64 {
        self.turn_probability
    }

    /// Nearest in-bounds grid index for a coordinate
    fn snap_index(&self, value: f32, min: f32, max: f32) -> i32 {
        let lowest = (min / self.spacing).ceil() as i32;
        let highest = (max / self.spacing).floor() as i32;
        let index = if value.is_finite() {
            (value / self.spacing).round() as i32
        } else {
            0
        };
        index.clamp(lowest, highest)
    }

    /// Snap a point onto the nearest in-bounds road intersection
    pub fn snap(&self, point: Point2) -> Point2 {
        let ix = self.snap_index(point.x, self.bounds.min.x, self.bounds.max.x);
        let iz = self.snap_index(point.z, self.bounds.min.z, self.bounds.max.z);
        Point2::new(ix as f32 * self.spacing, iz as f32 * self.spacing)
    }

    /// Manhattan route between two points on the road grid.
    ///
    /// Starts at the snapped `from`, then alternates single grid steps along
    /// X and Z until the snapped `to` is reached.
    pub fn route(&self, from: Point2, to: Point2) -> Vec<Point2> {
        let mut gx = self.snap_index(from.x, self.bounds.min.x, self.bounds.max.x);
        let mut gz = self.snap_index(from.z, self.bounds.min.z, self.bounds.max.z);
        let tx = self.snap_index(to.x, self.bounds.min.x, self.bounds.max.x);
        let tz = self.snap_index(to.z, self.bounds.min.z, self.bounds.max.z);

        let steps = (tx - gx).unsigned_abs() + (tz - gz).unsigned_abs();
        let mut waypoints = Vec::with_capacity(steps as usize + 1);
        waypoints.push(Point2::new(gx as f32 * self.spacing, gz as f32 * self.spacing));

        let mut step_x = true;
        while gx != tx || gz != tz {
            if (step_x && gx != tx) || gz == tz {
                gx += (tx - gx).signum();
            } else {
                gz += (tz - gz).signum();
            }
            step_x = !step_x;
            waypoints.push(Point2::new(gx as f32 * self.spacing, gz as f32 * self.spacing));
        }

        waypoints
    }

    /// A fresh traffic path along road line `road_index`
    pub fn create_path(
        &self,
        road_index: i32,
        direction: CardinalDirection,
        lane_offset: f32,
        rng: &mut SimRng,
    ) -> TrafficPath {
        let mut path = TrafficPath::default();
        path.turn_at = self.fill_path(&mut path.waypoints, road_index, direction, lane_offset, rng);
        path
    }

    /// Pick a random road and direction and plan into `buf`
    pub fn fill_random_path(
        &self,
        buf: &mut Vec<Position>,
        lane_offset: f32,
        rng: &mut SimRng,
    ) -> Option<usize> {
        let line_count = (2 * self.grid_size + 1) as usize;
        let road_index = rng.random_index(line_count) as i32 - self.grid_size;
        let direction = CardinalDirection::ALL[rng.random_index(CardinalDirection::ALL.len())];
        self.fill_path(buf, road_index, direction, lane_offset, rng)
    }

    /// Plan a traffic path into an existing buffer, reusing its allocation.
    ///
    /// The path starts on one city edge and ends on the opposite edge, or on
    /// the edge reached after a turn. Returns the index of the turn
    /// transition's first waypoint when a turn fired.
    pub fn fill_path(
        &self,
        buf: &mut Vec<Position>,
        road_index: i32,
        direction: CardinalDirection,
        lane_offset: f32,
        rng: &mut SimRng,
    ) -> Option<usize> {
        buf.clear();
        let g = self.grid_size;
        let line = road_index.clamp(-g, g);
        let sign = direction.sign();
        let edge = g as f32 * self.spacing;

        buf.push(self.lane_point(direction, line, -(sign as f32) * edge, lane_offset));

        // Interior intersections in travel order
        let mut crossing = -sign * (g - 1);
        while crossing.abs() < g {
            if rng.chance(self.turn_probability) {
                let turn_at = buf.len();
                self.push_turn(buf, direction, line, crossing, lane_offset, rng);
                return Some(turn_at);
            }
            buf.push(self.lane_point(direction, line, crossing as f32 * self.spacing, lane_offset));
            crossing += sign;
        }

        buf.push(self.lane_point(direction, line, sign as f32 * edge, lane_offset));
        None
    }

    /// Turn off `line` at `crossing` onto the perpendicular road and drive it
    /// to the city edge
    fn push_turn(
        &self,
        buf: &mut Vec<Position>,
        direction: CardinalDirection,
        line: i32,
        crossing: i32,
        lane_offset: f32,
        rng: &mut SimRng,
    ) {
        let g = self.grid_size;
        let options = direction.perpendicular();
        let mut new_direction = options[rng.random_index(options.len())];
        // Turning outwards on an edge road would leave the grid immediately
        if line == g * new_direction.sign() {
            new_direction = if new_direction == options[0] {
                options[1]
            } else {
                options[0]
            };
        }

        let new_sign = new_direction.sign();
        let crossing_coord = crossing as f32 * self.spacing;

        // Transition pair around the corner where the two lanes meet: still
        // in the old lane short of it, then in the new lane past it, so both
        // points lie ahead of the agent
        let new_side = new_direction.lane_side();
        let side_along_old = if direction.is_along_x() {
            new_side.x
        } else {
            new_side.z
        };
        let corner = self.lane_point(
            direction,
            line,
            crossing_coord + side_along_old * lane_offset,
            lane_offset,
        );
        let (old_step, new_step) = (direction.vector(), new_direction.vector());
        buf.push(self.clamp(Position::new(
            corner.x - old_step.x * TURN_TRANSITION_LENGTH,
            0.0,
            corner.z - old_step.z * TURN_TRANSITION_LENGTH,
        )));
        buf.push(self.clamp(Position::new(
            corner.x + new_step.x * TURN_TRANSITION_LENGTH,
            0.0,
            corner.z + new_step.z * TURN_TRANSITION_LENGTH,
        )));

        let mut next = line + new_sign;
        while next.abs() < g {
            buf.push(self.lane_point(new_direction, crossing, next as f32 * self.spacing, lane_offset));
            next += new_sign;
        }
        let edge = g as f32 * self.spacing;
        buf.push(self.lane_point(new_direction, crossing, new_sign as f32 * edge, lane_offset));
    }

    /// Point `along` the road on `line`, shifted into the lane for
    /// `direction`
    fn lane_point(&self, direction: CardinalDirection, line: i32, along: f32, lane_offset: f32) -> Position {
        let line_coord = line as f32 * self.spacing;
        let side = direction.lane_side();
        let (x, z) = if direction.is_along_x() {
            (along, line_coord)
        } else {
            (line_coord, along)
        };
        self.clamp(Position::new(x + side.x * lane_offset, 0.0, z + side.z * lane_offset))
    }

    fn clamp(&self, position: Position) -> Position {
        let ground = self.bounds.clamp(position.ground());
        Position::new(ground.x, position.y, ground.z)
    }
}
