//! Path planning and agent movement tests

use approx::assert_relative_eq;
use courier_sim::simulation::{
    generate, AgentId, AgentKind, AgentUpdateResult, CardinalDirection, CityMap, NoEffects,
    PathPlanner, Point2, Position, SimAgent, SimConfig, SimId, SimRng, TURN_TRANSITION_LENGTH,
};

const EPSILON: f32 = 1e-3;

fn city() -> CityMap {
    generate(&SimConfig::default(), &mut SimRng::seeded(21))
}

fn on_city_edge(point: &Position, edge: f32) -> bool {
    (point.x.abs() - edge).abs() < EPSILON || (point.z.abs() - edge).abs() < EPSILON
}

#[test]
fn test_route_staircases_to_snapped_target() {
    let city = city();
    let planner = PathPlanner::new(&city, 0.0);
    let spacing = planner.spacing();

    let route = planner.route(Point2::new(-61.0, 5.0), Point2::new(40.0, -38.0));

    assert_eq!(route.first(), Some(&Point2::new(-60.0, 0.0)));
    assert_eq!(route.last(), Some(&Point2::new(30.0, -30.0)));
    assert_eq!(route.len(), 5);
    for pair in route.windows(2) {
        let step = (pair[1].x - pair[0].x).abs() + (pair[1].z - pair[0].z).abs();
        assert_relative_eq!(step, spacing);
    }
}

#[test]
fn test_route_terminates_for_any_endpoints() {
    let city = city();
    let planner = PathPlanner::new(&city, 0.0);

    assert_eq!(planner.route(Point2::ZERO, Point2::ZERO), vec![Point2::ZERO]);

    // Off-map and non-finite inputs snap to the nearest in-bounds intersection
    let route = planner.route(Point2::new(-1.0e6, 1.0e6), Point2::new(f32::NAN, 1.0e6));
    let last = route.last().unwrap();
    assert!(city.bounds.contains(last));
    assert!(route.len() as u32 <= 4 * (city.grid_size + 2));

    let mut rng = SimRng::seeded(4);
    for _ in 0..200 {
        let from = Point2::new(rng.random_range(-200.0..200.0), rng.random_range(-200.0..200.0));
        let to = Point2::new(rng.random_range(-200.0..200.0), rng.random_range(-200.0..200.0));
        let route = planner.route(from, to);
        assert_eq!(route.last(), Some(&planner.snap(to)));
    }
}

#[test]
fn test_straight_path_without_turns() {
    let city = city();
    let planner = PathPlanner::new(&city, 0.0);
    let edge = city.city_half_extent();
    let mut rng = SimRng::seeded(1);

    let path = planner.create_path(0, CardinalDirection::East, 2.0, &mut rng);

    assert_eq!(path.turn_at, None);
    assert_eq!(path.waypoints.len(), 2 * city.grid_size as usize + 1);
    assert_relative_eq!(path.waypoints[0].x, -edge);
    assert_relative_eq!(path.waypoints.last().unwrap().x, edge);
    // Eastbound traffic keeps to its lane side of the centreline
    assert!(path.waypoints.iter().all(|w| (w.z - 2.0).abs() < EPSILON));
    assert!(path.waypoints.windows(2).all(|p| p[1].x > p[0].x));
}

#[test]
fn test_certain_turn_fires_at_first_crossing() {
    let city = city();
    let planner = PathPlanner::new(&city, 1.0);
    let edge = city.city_half_extent();
    let mut rng = SimRng::seeded(2);

    let path = planner.create_path(1, CardinalDirection::North, 0.0, &mut rng);

    assert_eq!(path.turn_at, Some(1));
    let first_crossing = -(city.grid_size as f32 - 1.0) * city.block_size;
    // Short of the corner in the old lane, then past it in the new one
    assert_relative_eq!(path.waypoints[1].x, 30.0);
    assert_relative_eq!(path.waypoints[1].z, first_crossing - TURN_TRANSITION_LENGTH);
    assert_relative_eq!((path.waypoints[2].x - 30.0).abs(), TURN_TRANSITION_LENGTH);
    assert_relative_eq!(path.waypoints[2].z, first_crossing);
    let last = path.waypoints.last().unwrap();
    assert_relative_eq!(last.x.abs(), edge);
    assert_relative_eq!(last.z, first_crossing);
}

#[test]
fn test_turn_on_edge_road_heads_inwards() {
    let city = city();
    let planner = PathPlanner::new(&city, 1.0);
    let edge = city.city_half_extent();
    let g = city.grid_size as i32;

    for seed in 0..10 {
        let mut rng = SimRng::seeded(seed);
        let east_edge = planner.create_path(g, CardinalDirection::North, 0.0, &mut rng);
        assert_relative_eq!(east_edge.waypoints.last().unwrap().x, -edge);

        let west_edge = planner.create_path(-g, CardinalDirection::South, 0.0, &mut rng);
        assert_relative_eq!(west_edge.waypoints.last().unwrap().x, edge);
    }
}

#[test]
fn test_random_paths_run_edge_to_edge() {
    let city = city();
    let planner = PathPlanner::new(&city, 0.3);
    let edge = city.city_half_extent();
    let mut rng = SimRng::seeded(17);
    let mut buf = Vec::new();

    for _ in 0..500 {
        let turn_at = planner.fill_random_path(&mut buf, 2.0, &mut rng);
        assert!(buf.len() >= 2);
        assert!(on_city_edge(&buf[0], edge), "start {:?}", buf[0]);
        assert!(on_city_edge(buf.last().unwrap(), edge), "end {:?}", buf.last());
        assert!(buf.iter().all(|w| city.bounds.contains(&w.ground())));
        if let Some(index) = turn_at {
            assert!(index + 1 < buf.len());
        }
    }
}

#[test]
fn test_turn_waypoints_lie_ahead_on_both_roads() {
    let city = city();
    let planner = PathPlanner::new(&city, 1.0);

    for seed in 0..50 {
        for direction in CardinalDirection::ALL {
            for lane_offset in [2.0, 4.5] {
                let mut rng = SimRng::seeded(seed);
                let road = rng.random_index(2 * city.grid_size as usize + 1) as i32
                    - city.grid_size as i32;
                let path = planner.create_path(road, direction, lane_offset, &mut rng);
                let turn = path.turn_at.unwrap();
                let (before, first, second, after) = (
                    path.waypoints[turn - 1],
                    path.waypoints[turn],
                    path.waypoints[turn + 1],
                    path.waypoints[turn + 2],
                );

                // Each leg of the turn keeps moving forward along its road
                let old = direction.vector();
                let into_corner = (first.x - before.x) * old.x + (first.z - before.z) * old.z;
                assert!(into_corner > 0.0, "{:?} {:?}", direction, path.waypoints);

                let out_x = after.x - second.x;
                let out_z = after.z - second.z;
                let across = (second.x - first.x) * out_x + (second.z - first.z) * out_z;
                assert!(across > 0.0, "{:?} {:?}", direction, path.waypoints);
                // Past the corner the path runs straight along the new lane
                assert!(out_x.abs() < EPSILON || out_z.abs() < EPSILON);
            }
        }
    }
}

#[test]
fn test_agent_skips_waypoint_inside_turning_circle() {
    let city = city();
    let planner = PathPlanner::new(&city, 0.0);
    let mut rng = SimRng::seeded(3);
    let far = Point2::new(100.0, 100.0);

    // Heading west with the next waypoint a metre behind: unreachable at
    // this speed, so it counts as passed
    let mut agent = SimAgent::new(AgentId(SimId(0)), AgentKind::Vehicle, 10.0, 2.0);
    agent.path = vec![
        Position::new(0.0, 0.0, 0.0),
        Position::new(1.0, 0.0, 0.0),
        Position::new(1.0, 0.0, -20.0),
    ];
    agent.path_index = 1;
    agent.heading = -std::f32::consts::FRAC_PI_2;

    let result = agent.update(1.0 / 60.0, &far, 4.0, &planner, &mut rng, &mut NoEffects);
    assert_eq!(result, AgentUpdateResult::Arrived);
    assert_eq!(agent.path_index, 2);

    // The same waypoint far enough away is steered towards instead
    let mut agent = SimAgent::new(AgentId(SimId(1)), AgentKind::Vehicle, 10.0, 2.0);
    agent.path = vec![Position::new(0.0, 0.0, 0.0), Position::new(5.0, 0.0, 0.0)];
    agent.path_index = 1;
    agent.heading = -std::f32::consts::FRAC_PI_2;
    let result = agent.update(1.0 / 60.0, &far, 4.0, &planner, &mut rng, &mut NoEffects);
    assert_eq!(result, AgentUpdateResult::Moving);
    assert_eq!(agent.path_index, 1);
}

#[test]
fn test_agent_moves_towards_waypoint() {
    let city = city();
    let planner = PathPlanner::new(&city, 0.0);
    let mut rng = SimRng::seeded(3);
    let far = Point2::new(100.0, 100.0);

    let mut agent = SimAgent::new(AgentId(SimId(0)), AgentKind::Vehicle, 5.0, 2.0);
    agent.path = vec![Position::new(0.0, 0.0, 0.0), Position::new(10.0, 0.0, 0.0)];
    agent.place_on_path(0);
    assert_eq!(agent.path_index, 1);
    assert_relative_eq!(agent.heading, std::f32::consts::FRAC_PI_2);

    let result = agent.update(0.1, &far, 4.0, &planner, &mut rng, &mut NoEffects);
    assert_eq!(result, AgentUpdateResult::Moving);
    assert_relative_eq!(agent.position.x, 0.5, epsilon = 1e-4);
    assert_relative_eq!(agent.position.z, 0.0, epsilon = 1e-4);
}

#[test]
fn test_agent_never_overshoots_and_repaths_at_end() {
    let city = city();
    let planner = PathPlanner::new(&city, 0.0);
    let mut rng = SimRng::seeded(3);
    let far = Point2::new(100.0, 100.0);

    let mut agent = SimAgent::new(AgentId(SimId(0)), AgentKind::Vehicle, 100.0, 2.0);
    agent.path = vec![Position::new(0.0, 0.0, 0.0), Position::new(10.0, 0.0, 0.0)];
    agent.place_on_path(0);

    agent.update(1.0, &far, 4.0, &planner, &mut rng, &mut NoEffects);
    assert_relative_eq!(agent.position.x, 10.0, epsilon = 1e-3);

    let result = agent.update(1.0, &far, 4.0, &planner, &mut rng, &mut NoEffects);
    assert_eq!(result, AgentUpdateResult::Repathed);
    assert!(agent.path.len() >= 2);
    assert_eq!(agent.path_index, 1);
    assert_eq!(agent.position, agent.path[0]);
}

#[test]
fn test_agent_yields_to_nearby_player() {
    let city = city();
    let planner = PathPlanner::new(&city, 0.0);
    let mut rng = SimRng::seeded(3);

    let mut agent = SimAgent::new(AgentId(SimId(0)), AgentKind::Pedestrian, 1.5, 4.5);
    agent.path = vec![Position::new(0.0, 0.0, 0.0), Position::new(10.0, 0.0, 0.0)];
    agent.place_on_path(0);

    let player = Point2::new(3.0, 0.0);
    for _ in 0..10 {
        let result = agent.update(0.1, &player, 4.0, &planner, &mut rng, &mut NoEffects);
        assert_eq!(result, AgentUpdateResult::Yielded);
        assert!(agent.stopped);
    }
    assert_eq!(agent.position, Position::new(0.0, 0.0, 0.0));

    // Resumes as soon as the player steps away
    let result = agent.update(0.1, &Point2::new(50.0, 0.0), 4.0, &planner, &mut rng, &mut NoEffects);
    assert_eq!(result, AgentUpdateResult::Moving);
    assert!(!agent.stopped);
}
