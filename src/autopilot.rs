//! Scripted courier for headless runs
//!
//! Accepts the nearest available order and walks the navigation route to
//! each target, so a headless session exercises the whole order protocol.

use log::warn;
use ordered_float::OrderedFloat;

use courier_sim::simulation::{EffectsPort, PlayerInput, Point2, SimWorld};

/// Waypoints closer than this are treated as reached
const WAYPOINT_REACHED: f32 = 0.5;

/// Only sprint when the next waypoint is at least this far away
const SPRINT_DISTANCE: f32 = 3.0;

#[derive(Debug, Default)]
pub struct Autopilot {
    pub orders_accepted: usize,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide this frame's input, accepting an order first if idle
    pub fn next_input<E: EffectsPort>(&mut self, world: &mut SimWorld<E>) -> PlayerInput {
        let position = world.player.position;

        if world.active_order().is_none() {
            let nearest = world
                .available_orders()
                .min_by_key(|order| OrderedFloat(order.pickup.position.distance(&position)))
                .map(|order| order.id);
            if let Some(id) = nearest {
                match world.accept_order(id) {
                    Ok(()) => self.orders_accepted += 1,
                    Err(err) => warn!("Autopilot could not accept order {}: {}", id, err),
                }
            }
        }

        let Some(target) = world.active_order().and_then(|order| order.target_position()) else {
            return PlayerInput::at(position);
        };

        // The route ends on the intersection nearest the target; once we are
        // at least that close, walk straight down the street to it
        let route = world.route_to(target);
        let route_end = route.last().copied().unwrap_or(target);
        let next = if position.distance(&target) <= route_end.distance(&target) + WAYPOINT_REACHED {
            target
        } else {
            next_waypoint(&route, position).unwrap_or(target)
        };

        let intent = Point2::new(next.x - position.x, next.z - position.z);
        PlayerInput::moving(position, intent, intent.length() > SPRINT_DISTANCE)
    }
}

/// The route starts on the intersection nearest the player, which may be
/// behind us; skip it once we are at it or already heading down the first leg
fn next_waypoint(route: &[Point2], position: Point2) -> Option<Point2> {
    let first = *route.first()?;
    let Some(&second) = route.get(1) else {
        return Some(first);
    };
    let on_first_leg = position.distance(&second) <= first.distance(&second) + WAYPOINT_REACHED;
    if position.distance(&first) <= WAYPOINT_REACHED || on_first_leg {
        Some(second)
    } else {
        Some(first)
    }
}
