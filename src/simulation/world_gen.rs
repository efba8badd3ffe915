//! Procedural city generation
//!
//! Produces the road grid, one candidate building per block and the table
//! of named road-side locations used for orders. Placement keeps every
//! footprint inside its block's inner span, so buildings never overlap each
//! other or the roads and never leave the map.

use log::{debug, info};

use super::config::SimConfig;
use super::rng::SimRng;
use super::types::{
    BuildingId, MapBounds, Point2, SimId, MAX_BUILDING_HEIGHT, MAX_FOOTPRINT, MIN_BUILDING_HEIGHT,
    MIN_FOOTPRINT,
};

/// Chance that a block is left empty as a plaza
pub const PLAZA_CHANCE: f64 = 0.15;

const COLOR_TAGS: [&str; 6] = [
    "brick",
    "sandstone",
    "slate",
    "concrete",
    "glass",
    "terracotta",
];

const BUSINESS_NAMES: [&str; 12] = [
    "Pizza Palace",
    "Noodle Bar",
    "Corner Bakery",
    "Green Grocer",
    "Taco Stand",
    "Sushi Spot",
    "Burger Joint",
    "Flower Shop",
    "Pharmacy",
    "Book Nook",
    "Coffee House",
    "Deli",
];

const AVENUE_NAMES: [&str; 10] = [
    "Oak", "Pine", "Maple", "Cedar", "Elm", "Birch", "Ash", "Willow", "Spruce", "Alder",
];

/// Road hierarchy, alternating by grid line parity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadClass {
    Main,
    Secondary,
}

impl RoadClass {
    pub fn for_line(index: i32) -> Self {
        if index.rem_euclid(2) == 0 {
            RoadClass::Main
        } else {
            RoadClass::Secondary
        }
    }

    /// Main roads are painted with lane markings
    pub fn has_lane_markings(&self) -> bool {
        matches!(self, RoadClass::Main)
    }
}

/// Which world axis a road runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadAxis {
    /// Constant z, runs along x
    AlongX,
    /// Constant x, runs along z
    AlongZ,
}

/// A straight road along one grid line
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSegment {
    pub start: Point2,
    pub end: Point2,
    pub class: RoadClass,
    pub axis: RoadAxis,
    /// Grid line index this road sits on
    pub line: i32,
}

impl RoadSegment {
    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }
}

/// A building footprint inside a block
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub id: BuildingId,
    /// Footprint centre
    pub position: Point2,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub color_tag: &'static str,
}

impl Building {
    pub fn min(&self) -> Point2 {
        Point2::new(
            self.position.x - self.width / 2.0,
            self.position.z - self.depth / 2.0,
        )
    }

    pub fn max(&self) -> Point2 {
        Point2::new(
            self.position.x + self.width / 2.0,
            self.position.z + self.depth / 2.0,
        )
    }

    pub fn overlaps(&self, other: &Building) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.z < b_max.z && a_max.z > b_min.z
    }
}

/// One grid cell of the city
#[derive(Debug, Clone)]
pub struct WorldBlock {
    pub i: i32,
    pub j: i32,
    pub min: Point2,
    pub max: Point2,
    pub buildings: Vec<Building>,
}

impl WorldBlock {
    pub fn center(&self) -> Point2 {
        self.min.lerp(&self.max, 0.5)
    }

    pub fn is_plaza(&self) -> bool {
        self.buildings.is_empty()
    }
}

/// What a named location is used for in orders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// Restaurants and shops on street corners; order pickups
    Business,
    /// Mid-block addresses; order deliveries
    Residence,
}

/// A labelled point that orders can reference
#[derive(Debug, Clone, PartialEq)]
pub struct NamedLocation {
    pub position: Point2,
    pub label: String,
}

impl NamedLocation {
    /// Build a location, rejecting anything outside the map
    pub fn within(bounds: &MapBounds, position: Point2, label: impl Into<String>) -> Option<Self> {
        if bounds.contains(&position) {
            Some(Self {
                position,
                label: label.into(),
            })
        } else {
            None
        }
    }
}

/// A named location tagged with its role
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    pub location: NamedLocation,
    pub kind: LocationKind,
}

/// Everything the generator produces
#[derive(Debug, Clone)]
pub struct CityMap {
    pub grid_size: u32,
    pub block_size: f32,
    pub road_width: f32,
    pub bounds: MapBounds,
    pub blocks: Vec<WorldBlock>,
    pub roads: Vec<RoadSegment>,
    pub landmarks: Vec<Landmark>,
}

impl CityMap {
    /// Every building in block order
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.blocks.iter().flat_map(|block| block.buildings.iter())
    }

    pub fn building_count(&self) -> usize {
        self.blocks.iter().map(|block| block.buildings.len()).sum()
    }

    /// Half the width of the road grid
    pub fn city_half_extent(&self) -> f32 {
        self.grid_size as f32 * self.block_size
    }

    /// World coordinate of a grid line
    pub fn line_coord(&self, line: i32) -> f32 {
        line as f32 * self.block_size
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn landmarks_of(&self, kind: LocationKind) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter().filter(move |landmark| landmark.kind == kind)
    }
}

/// Generate a city from a validated config
pub fn generate(config: &SimConfig, rng: &mut SimRng) -> CityMap {
    let g = config.grid_size as i32;
    let spacing = config.block_size;
    let half = config.city_half_extent();
    let mut next_building = 0usize;

    let mut blocks = Vec::with_capacity((2 * g * 2 * g) as usize);
    for i in -g..g {
        for j in -g..g {
            let min = Point2::new(i as f32 * spacing, j as f32 * spacing);
            let max = Point2::new(min.x + spacing, min.z + spacing);
            let mut block = WorldBlock {
                i,
                j,
                min,
                max,
                buildings: Vec::new(),
            };

            if !rng.chance(PLAZA_CHANCE) {
                let building = place_building(config, &block, BuildingId(SimId(next_building)), rng);
                next_building += 1;
                block.buildings.push(building);
            }
            blocks.push(block);
        }
    }

    let mut roads = Vec::with_capacity((2 * (2 * g + 1)) as usize);
    for line in -g..=g {
        let coord = line as f32 * spacing;
        let class = RoadClass::for_line(line);
        roads.push(RoadSegment {
            start: Point2::new(-half, coord),
            end: Point2::new(half, coord),
            class,
            axis: RoadAxis::AlongX,
            line,
        });
        roads.push(RoadSegment {
            start: Point2::new(coord, -half),
            end: Point2::new(coord, half),
            class,
            axis: RoadAxis::AlongZ,
            line,
        });
    }

    let bounds = MapBounds::centered(config.map_half_extent());
    let landmarks = build_landmarks(g, spacing, &bounds);

    let map = CityMap {
        grid_size: config.grid_size,
        block_size: spacing,
        road_width: config.road_width,
        bounds,
        blocks,
        roads,
        landmarks,
    };

    info!(
        "Generated city: {} blocks, {} buildings, {} roads, {} landmarks",
        map.blocks.len(),
        map.building_count(),
        map.road_count(),
        map.landmarks.len()
    );
    map
}

/// Place one building inside the block's inner span
fn place_building(config: &SimConfig, block: &WorldBlock, id: BuildingId, rng: &mut SimRng) -> Building {
    let usable = config.usable_block_span();
    let max_side = MAX_FOOTPRINT.min(usable);

    let width = rng.random_inclusive(MIN_FOOTPRINT, max_side);
    let depth = rng.random_inclusive(MIN_FOOTPRINT, max_side);
    let height = rng.random_inclusive(MIN_BUILDING_HEIGHT, MAX_BUILDING_HEIGHT);

    // Offsets are bounded by the slack left after the footprint, so the
    // building cannot reach into the road margin.
    let slack_x = ((usable - width) / 2.0).max(0.0);
    let slack_z = ((usable - depth) / 2.0).max(0.0);
    let center = block.center();
    let position = Point2::new(
        center.x + rng.random_inclusive(-slack_x, slack_x),
        center.z + rng.random_inclusive(-slack_z, slack_z),
    );

    let color_tag = COLOR_TAGS[rng.random_index(COLOR_TAGS.len())];

    debug!(
        "Block ({}, {}): building {:?} {:.1}x{:.1}x{:.1} at ({:.1}, {:.1})",
        block.i, block.j, id.0, width, depth, height, position.x, position.z
    );

    Building {
        id,
        position,
        width,
        depth,
        height,
        color_tag,
    }
}

/// Street name for the road with constant z on `line`
pub fn street_name(line: i32, grid_size: i32) -> String {
    let n = (line + grid_size + 1) as u32;
    let suffix = match (n % 10, n % 100) {
        (1, r) if r != 11 => "st",
        (2, r) if r != 12 => "nd",
        (3, r) if r != 13 => "rd",
        _ => "th",
    };
    format!("{}{} St", n, suffix)
}

/// Avenue name for the road with constant x on `line`
pub fn avenue_name(line: i32, grid_size: i32) -> String {
    let n = (line + grid_size) as usize;
    let base = AVENUE_NAMES[n % AVENUE_NAMES.len()];
    match n / AVENUE_NAMES.len() {
        0 => format!("{} Ave", base),
        round => format!("{} Ave {}", base, round + 1),
    }
}

/// Businesses on every intersection, residences at every mid-block point
/// along the streets
fn build_landmarks(g: i32, spacing: f32, bounds: &MapBounds) -> Vec<Landmark> {
    let mut landmarks = Vec::new();
    let mut business = 0usize;

    for x_line in -g..=g {
        for z_line in -g..=g {
            let position = Point2::new(x_line as f32 * spacing, z_line as f32 * spacing);
            let label = format!(
                "{} ({} & {})",
                BUSINESS_NAMES[business % BUSINESS_NAMES.len()],
                street_name(z_line, g),
                avenue_name(x_line, g)
            );
            business += 1;
            if let Some(location) = NamedLocation::within(bounds, position, label) {
                landmarks.push(Landmark {
                    location,
                    kind: LocationKind::Business,
                });
            }
        }
    }

    for z_line in -g..=g {
        for cell in -g..g {
            let x = (cell as f32 + 0.5) * spacing;
            let position = Point2::new(x, z_line as f32 * spacing);
            let house_number = ((cell + g) as u32 + 1) * 10 + 1;
            let label = format!("{} {}", house_number, street_name(z_line, g));
            if let Some(location) = NamedLocation::within(bounds, position, label) {
                landmarks.push(Landmark {
                    location,
                    kind: LocationKind::Residence,
                });
            }
        }
    }

    landmarks
}
