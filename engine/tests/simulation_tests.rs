//! Simulation Tests - Collapse, Traffic and Hazards End to End
//!
//! Drives full simulations through the public request API and checks the
//! behaviour that spans several systems: conservation of voxels, debris
//! lifetime, car following bounds, falls, crashes, the tornado and what
//! ends up in the render sink.

use bridge_sim_engine::game::events::EventQueue;
use bridge_sim_engine::game::scenarios::{GoldenBridgeScenario, Scenario};
use bridge_sim_engine::game::systems::traffic::CRASH_TINT;
use bridge_sim_engine::game::systems::{TrafficContext, TrafficSimulator};
use bridge_sim_engine::game::{
    HazardKind, InteractionRequest, LaneSpec, ScenarioKind, SimConfig, Simulation, TrafficLayout,
};
use bridge_sim_engine::render::{RecordingSink, RenderChannel};
use bridge_sim_engine::world::{GridConfig, VoxelGrid};
use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const DT: f32 = 1.0 / 60.0;
const DECK_Y: f32 = 67.0;

fn bridge_sim(seed: u64) -> Simulation {
    Simulation::new(SimConfig {
        seed,
        ..SimConfig::default()
    })
    .expect("bridge scenario loads")
}

/// Three blasts side by side cut the deck clean across at `x`.
fn cut_deck(sim: &mut Simulation, x: f32) {
    for z in [-30.0, 0.0, 30.0] {
        sim.request(InteractionRequest::Explode {
            point: Vec3::new(x, DECK_Y, z),
        });
    }
}

fn car_channels() -> impl Iterator<Item = RenderChannel> {
    (0..5).map(RenderChannel::CarBody)
}

// ============================================================================
// Determinism Tests
// ============================================================================

#[test]
fn test_same_seed_replays_identically() {
    let run = |seed: u64| {
        let mut sim = bridge_sim(seed);
        cut_deck(&mut sim, 200.0);
        sim.request(InteractionRequest::Trigger(HazardKind::MeteorShower));
        for _ in 0..240 {
            sim.tick(DT);
        }
        let cars: Vec<Vec3> = sim.traffic().cars().iter().map(|c| c.position).collect();
        (sim.grid().len(), sim.destruction().debris().count(), cars)
    };

    assert_eq!(run(7), run(7));
    assert_ne!(run(7).2, run(8).2);
}

// ============================================================================
// Collapse Tests
// ============================================================================

#[test]
fn test_voxels_are_conserved_through_collapse() {
    let mut sim = bridge_sim(1);
    let initial = sim.grid().len();
    cut_deck(&mut sim, 0.0);
    cut_deck(&mut sim, 100.0);
    sim.request(InteractionRequest::Explode {
        point: Vec3::new(-900.0, DECK_Y, 0.0),
    });
    for _ in 0..30 {
        sim.tick(DT);
        let d = sim.destruction();
        assert_eq!(
            initial as u64,
            sim.grid().len() as u64 + d.total_removed() + d.total_detached()
        );
    }
    assert!(sim.destruction().total_detached() > 0);
}

#[test]
fn test_span_between_two_cuts_falls_and_sinks() {
    let mut sim = bridge_sim(2);
    cut_deck(&mut sim, 0.0);
    cut_deck(&mut sim, 100.0);
    sim.tick(DT);

    let detached = sim.destruction().total_detached();
    assert!(detached > 0);
    assert!(!sim.grid().has_ground_at(50.0, 0.0));
    // Anchored deck on the far side of each cut stays up
    assert!(sim.grid().has_ground_at(-100.0, 0.0));
    assert!(sim.grid().has_ground_at(200.0, 0.0));

    let mut sink = RecordingSink::new();
    let mut ticks = 0;
    while sim.destruction().debris().count() > 0 {
        sim.tick(0.1);
        sim.emit_render(&mut sink);
        ticks += 1;
        assert!(ticks < 600, "debris never reached the water");
    }
    assert_eq!(sink.visible_count(RenderChannel::Debris), 0);
    assert_eq!(
        sink.released as u64,
        sim.destruction().debris().total_spawned()
    );
}

// ============================================================================
// Traffic Tests
// ============================================================================

#[test]
fn test_driving_speed_stays_within_bounds() {
    let mut sim = bridge_sim(3);
    sim.set_traffic_density(1.0);
    sim.set_speed_multiplier(1.5);
    sim.set_fog_density(60.0);
    for _ in 0..600 {
        sim.tick(DT);
        let mult = sim.traffic().speed_multiplier();
        let half = sim.traffic().layout().half_length();
        for car in sim.traffic().cars().iter().filter(|c| c.active && c.is_driving()) {
            assert!(car.speed >= 0.0);
            assert!(car.speed <= 1.5 * car.effective_max_speed(mult) + 1e-3);
            assert!(car.position.x.abs() <= half);
        }
    }
}

#[test]
fn test_car_falls_through_missing_deck() {
    let scenario = GoldenBridgeScenario::default();
    let mut grid = VoxelGrid::new(GridConfig::default());
    scenario.build(&mut grid).expect("bridge builds");
    let mut rng = SmallRng::seed_from_u64(4);
    let mut traffic = TrafficSimulator::new(scenario.traffic_layout(), 1.0, &grid, &mut rng);
    let mut events = EventQueue::new();

    let start = traffic.cars()[0].position;
    grid.remove_at(start.x, start.z).expect("deck under the car");

    let mut step = |traffic: &mut TrafficSimulator, rng: &mut SmallRng| {
        let mut ctx = TrafficContext {
            dt: DT,
            grid: &grid,
            zone: None,
            tornado: None,
            events: &mut events,
            rng,
        };
        traffic.update(&mut ctx);
    };

    step(&mut traffic, &mut rng);
    assert!(traffic.cars()[0].is_falling());
    assert!(traffic.stats().falls >= 1);

    // Height drops every tick until the car is put back on the road
    let respawns = traffic.stats().respawns;
    let mut last_y = traffic.cars()[0].position.y;
    let mut ticks = 0;
    while traffic.cars()[0].is_falling() {
        step(&mut traffic, &mut rng);
        ticks += 1;
        assert!(ticks < 600, "car never reached its respawn floor");
        let car = &traffic.cars()[0];
        if car.is_falling() {
            assert!(car.position.y < last_y, "tick {ticks}: {} !< {last_y}", car.position.y);
            last_y = car.position.y;
        }
    }
    let car = &traffic.cars()[0];
    assert!(car.is_driving());
    assert_eq!(car.position.y, scenario.traffic_layout().road_y);
    assert!(traffic.stats().respawns > respawns);
}

#[test]
fn test_crashed_car_holds_still_for_the_cooldown() {
    let layout = TrafficLayout {
        car_count: 2,
        track_length: 1000.0,
        road_y: 10.0,
        ground_check: false,
        lanes: vec![LaneSpec::new(0.0, 1)],
    };
    let mut sim = Simulation::new(SimConfig {
        scenario: ScenarioKind::CityBlock,
        traffic_density: 1.0,
        traffic_override: Some(layout),
        ..SimConfig::default()
    })
    .expect("city block loads");

    let traffic = sim.traffic_mut();
    let len0 = traffic.cars()[0].class.length();
    let len1 = traffic.cars()[1].class.length();
    if let Some(car) = traffic.car_mut(0) {
        car.position.x = 0.0;
        car.speed = 10.0;
    }
    if let Some(car) = traffic.car_mut(1) {
        car.position.x = (len0 + len1) * 0.5 + 0.2;
        car.speed = 0.0;
    }

    sim.tick(DT);
    assert_eq!(sim.traffic().stats().crashes, 1);
    let parked = sim.traffic().cars()[0].position;

    let channel = RenderChannel::CarBody(sim.traffic().cars()[0].class.geometry_id());
    let mut sink = RecordingSink::new();
    // Four and a half seconds into the five second cooldown
    for _ in 0..270 {
        sim.tick(DT);
        let car = &sim.traffic().cars()[0];
        assert_eq!(car.speed, 0.0);
        assert_eq!(car.position, parked);
    }
    sim.emit_render(&mut sink);
    assert_eq!(sink.tint(channel, 0), Some(CRASH_TINT));

    for _ in 0..120 {
        sim.tick(DT);
    }
    let car = &sim.traffic().cars()[0];
    assert!(!car.crashed);
    assert!(car.position.x > parked.x);
}

#[test]
fn test_blast_only_throws_cars_inside_its_radius() {
    let mut sim = bridge_sim(5);
    let center = sim
        .traffic()
        .cars()
        .iter()
        .find(|c| c.active && c.is_driving() && c.position.x.abs() < 1000.0)
        .map(|c| c.position)
        .expect("a driving car");
    let before: Vec<(bool, Vec3)> = sim
        .traffic()
        .cars()
        .iter()
        .map(|c| (c.active && c.is_driving(), c.position))
        .collect();

    sim.request(InteractionRequest::Explode { point: center });
    sim.tick(DT);

    // User blasts push with strength 200 out to a 100 unit radius
    let mut thrown = 0;
    for (car, (was_driving, pos)) in sim.traffic().cars().iter().zip(before) {
        if !was_driving {
            continue;
        }
        let dist = pos.distance(center);
        if dist < 99.0 {
            assert!(car.is_airborne());
            thrown += 1;
            let away = Vec3::new(pos.x - center.x, 0.0, pos.z - center.z);
            if away.length() > 1.0 {
                let expected = away.normalize() * (1.0 - dist / 100.0) * 200.0;
                let horizontal = Vec3::new(car.velocity.x, 0.0, car.velocity.z);
                assert!(
                    (horizontal - expected).length() < 1e-2,
                    "car at {pos}: {horizontal} vs {expected}"
                );
            }
        } else if dist > 101.0 {
            assert!(!car.is_airborne());
        }
    }
    assert!(thrown >= 1);
}

#[test]
fn test_blast_push_points_away_and_fades_with_distance() {
    let layout = TrafficLayout {
        car_count: 3,
        track_length: 1000.0,
        road_y: 10.0,
        ground_check: false,
        lanes: vec![LaneSpec::new(0.0, 1)],
    };
    let grid = VoxelGrid::new(GridConfig::default());
    let mut rng = SmallRng::seed_from_u64(9);
    let mut traffic = TrafficSimulator::new(layout, 1.0, &grid, &mut rng);

    // Off-axis cars at distance 50 and 80, plus one just outside the radius
    let spots = [
        Vec3::new(30.0, 10.0, 40.0),
        Vec3::new(-48.0, 10.0, -64.0),
        Vec3::new(90.0, 10.0, 90.0),
    ];
    for (i, spot) in spots.into_iter().enumerate() {
        if let Some(car) = traffic.car_mut(i) {
            car.position = spot;
        }
    }
    let center = Vec3::new(0.0, 10.0, 0.0);
    assert_eq!(traffic.apply_explosion(center, 100.0, 200.0, &mut rng), 2);

    let near = &traffic.cars()[0];
    assert!(near.is_airborne());
    assert!((near.velocity - Vec3::new(60.0, 50.0, 80.0)).length() < 1e-3);

    let far = &traffic.cars()[1];
    assert!(far.is_airborne());
    assert!((far.velocity - Vec3::new(-24.0, 20.0, -32.0)).length() < 1e-3);
    assert!(far.velocity.length() < near.velocity.length());

    let outside = &traffic.cars()[2];
    assert!(outside.is_driving());
    assert_eq!(outside.velocity, Vec3::ZERO);
}

// ============================================================================
// Hazard Tests
// ============================================================================

#[test]
fn test_tornado_captures_then_lets_everyone_go() {
    let mut sim = bridge_sim(6);
    sim.set_traffic_density(1.0);
    assert!(sim.request(InteractionRequest::Trigger(HazardKind::Tornado)));

    let mut most_captured = 0;
    let mut ticks = 0;
    while sim.hazard_active(HazardKind::Tornado) {
        sim.tick(0.1);
        most_captured = most_captured.max(sim.traffic().captured_count());
        ticks += 1;
        assert!(ticks <= 310, "tornado outlived its lifetime");
    }
    assert!(most_captured > 0);
    assert!(sim.tornado().total_captures() > 0);
    assert_eq!(sim.traffic().captured_count(), 0);

    sim.tick(0.1);
    assert_eq!(sim.traffic().captured_count(), 0);
}

#[test]
fn test_volcano_rises_then_erupts() {
    let mut sim = bridge_sim(7);
    assert!(sim.request(InteractionRequest::Trigger(HazardKind::Volcano)));
    let start = sim.volcano().position().y;
    let mut ticks = 0;
    while !sim.volcano().is_erupting() {
        sim.tick(0.1);
        ticks += 1;
        assert!(ticks < 400);
    }
    assert!(sim.volcano().position().y > start);
    for _ in 0..10 {
        sim.tick(0.1);
    }
    assert!(sim.volcano().lava_count() > 0);
}

// ============================================================================
// Render Tests
// ============================================================================

#[test]
fn test_render_sink_sees_every_pooled_instance() {
    let mut sim = bridge_sim(8);
    sim.set_traffic_density(0.25);
    sim.tick(DT);

    let mut sink = RecordingSink::new();
    sim.emit_render(&mut sink);

    let visible: usize = car_channels().map(|c| sink.visible_count(c)).sum();
    assert_eq!(visible, sim.traffic().active_count());
    assert_eq!(visible, 100);
    let pooled: usize = car_channels()
        .map(|c| sink.transforms.keys().filter(|(ch, _)| *ch == c).count())
        .sum();
    assert_eq!(pooled, 400);

    assert_eq!(sink.visible_count(RenderChannel::Ship), 5);
    assert_eq!(sink.visible_count(RenderChannel::Bird), 100);
    assert!(
        sink.transform(RenderChannel::Tornado, 0)
            .is_some_and(|t| t.is_hidden())
    );

    sim.request(InteractionRequest::Trigger(HazardKind::Tornado));
    sim.tick(DT);
    sim.emit_render(&mut sink);
    assert!(
        sink.transform(RenderChannel::Tornado, 0)
            .is_some_and(|t| !t.is_hidden())
    );
}
