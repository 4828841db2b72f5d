//! Traffic Simulator
//!
//! Lane-based car following over a pooled set of cars. Each tick every
//! active car runs one step of its state machine, in priority order:
//! tornado capture, falling, exploding, then normal driving.
//!
//! Driving uses an IDM-style acceleration: a free-road term that fades out
//! near top speed, minus a braking term once the gap to the car ahead
//! drops below the speed-dependent desired gap. A distracted driver skips
//! the braking term and floors it instead.

pub mod car;
pub mod lanes;
pub mod vehicle;

pub use car::{CRASH_COOLDOWN, CRASH_TINT, Car, CarMode};
pub use lanes::{LaneIndex, Leader, OPEN_ROAD_GAP};
pub use vehicle::{DriverTraits, RECKLESS_THRESHOLD, VehicleClass};

use glam::Vec3;
use rand::Rng;
use rand::rngs::SmallRng;

use super::hazard::HazardZone;
use crate::game::config::{SPEED_MULTIPLIER_RANGE, TrafficLayout};
use crate::game::events::EventQueue;
use crate::physics::{horizontal_direction, radial_falloff};
use crate::render::{RenderChannel, RenderSink};
use crate::world::VoxelGrid;

// ============================================================================
// CAR-FOLLOWING CONSTANTS
// ============================================================================

/// Seconds of headway a driver tries to keep.
pub const TIME_HEADWAY: f32 = 1.5;
/// Standstill gap (m).
pub const MIN_GAP: f32 = 4.0;
/// Gap at or below which two cars have collided.
pub const COLLISION_GAP: f32 = 0.5;
/// Crashes above this speed multiplier explode.
pub const EXPLODE_SPEED_MULTIPLIER: f32 = 2.0;

pub const FALL_RESPAWN_Y: f32 = -20.0;
pub const EXPLODE_RESPAWN_Y: f32 = -50.0;
/// Random spawn positions tried before giving up on finding ground.
pub const SPAWN_ATTEMPTS: usize = 20;
/// Distance at which a lava blob sets a car alight.
pub const LAVA_HIT_RADIUS: f32 = 5.0;

// ============================================================================
// TORNADO SPIRAL
// ============================================================================

pub const SPIRAL_ANGULAR_SPEED: f32 = 2.5;
pub const SPIRAL_RADIUS_GROWTH: f32 = 6.0;
pub const SPIRAL_CLIMB: f32 = 18.0;
/// Height above the road at which a captured car is thrown clear.
pub const SPIRAL_RELEASE_HEIGHT: f32 = 150.0;
pub const FLING_SPEED: f32 = 35.0;
pub const FLING_LIFT: f32 = 5.0;
const MIN_CAPTURE_RADIUS: f32 = 5.0;

/// Held objects close this fraction of the distance per second.
pub const DRAG_RATE: f32 = 10.0;

/// Per-tick inputs the traffic simulator reads but does not own.
pub struct TrafficContext<'a> {
    pub dt: f32,
    pub grid: &'a VoxelGrid,
    /// Solid hazard body cars can drive into (the volcano)
    pub zone: Option<&'a dyn HazardZone>,
    /// Center of an active tornado
    pub tornado: Option<Vec3>,
    pub events: &'a mut EventQueue,
    pub rng: &'a mut SmallRng,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrafficStats {
    pub crashes: u64,
    pub explosions: u64,
    pub falls: u64,
    pub captures: u64,
    pub respawns: u64,
    /// Respawns that found no ground and used an arbitrary position
    pub fallback_spawns: u64,
}

/// Owns the car pool and everything that moves it.
#[derive(Debug)]
pub struct TrafficSimulator {
    layout: TrafficLayout,
    cars: Vec<Car>,
    lanes: LaneIndex,
    density: f32,
    speed_multiplier: f32,
    fog_density: f32,
    time: f32,
    stats: TrafficStats,
}

impl TrafficSimulator {
    /// Build the pool and park every car on valid ground in its lane.
    pub fn new(
        layout: TrafficLayout,
        density: f32,
        grid: &VoxelGrid,
        rng: &mut SmallRng,
    ) -> Self {
        let car_count = if layout.lanes.is_empty() { 0 } else { layout.car_count };
        let mut stats = TrafficStats::default();
        let density = density.clamp(0.0, 1.0);
        let active = active_target(density, car_count);

        let mut cars = Vec::with_capacity(car_count);
        for i in 0..car_count {
            let lane = i % layout.lanes.len();
            let mut car = Car::random(lane, rng);
            let x = spawn_x(&layout, lane, grid, rng, &mut stats);
            car.place_on_road(x, layout.road_y, &layout.lanes[lane], rng);
            car.active = i < active;
            cars.push(car);
        }

        Self {
            lanes: LaneIndex::new(layout.lanes.len()),
            layout,
            cars,
            density,
            speed_multiplier: 1.0,
            fog_density: 0.0,
            time: 0.0,
            stats,
        }
    }

    // ========================================================================
    // TICK
    // ========================================================================

    pub fn update(&mut self, ctx: &mut TrafficContext<'_>) {
        let dt = ctx.dt;
        self.time += dt;
        self.sync_density(ctx.grid, ctx.rng);

        self.lanes.rebuild(&self.cars);
        let mut leaders: Vec<Option<Leader>> = vec![None; self.cars.len()];
        for (lane, spec) in self.layout.lanes.iter().enumerate() {
            let members = self.lanes.lane(lane);
            for slot in 0..members.len() {
                let leader = self
                    .lanes
                    .leader(&self.cars, spec, lane, slot, self.layout.track_length);
                leaders[members[slot]] = Some(leader);
            }
        }

        for i in 0..self.cars.len() {
            if !self.cars[i].active {
                continue;
            }
            match self.cars[i].mode {
                CarMode::Captured { .. } => self.spiral(i, ctx),
                CarMode::Falling | CarMode::Exploding => {
                    if self.cars[i].fly(dt, FALL_RESPAWN_Y, EXPLODE_RESPAWN_Y) {
                        self.respawn(i, ctx.grid, ctx.rng);
                    }
                }
                CarMode::Grabbed => {}
                CarMode::Driving => {
                    if let Some(leader) = leaders[i] {
                        self.drive(i, leader, ctx);
                    }
                }
            }
        }
    }

    /// Activate or park cars so the first `density * pool` are active.
    fn sync_density(&mut self, grid: &VoxelGrid, rng: &mut SmallRng) {
        let target = active_target(self.density, self.cars.len());
        for i in 0..self.cars.len() {
            let want = i < target;
            if self.cars[i].active != want {
                // Parked cars are reset too so they reappear on the road
                self.respawn(i, grid, rng);
                self.cars[i].active = want;
            }
        }
    }

    fn respawn(&mut self, i: usize, grid: &VoxelGrid, rng: &mut SmallRng) {
        let lane = self.cars[i].lane;
        let x = spawn_x(&self.layout, lane, grid, rng, &mut self.stats);
        self.cars[i].place_on_road(x, self.layout.road_y, &self.layout.lanes[lane], rng);
        self.stats.respawns += 1;
    }

    fn drive(&mut self, i: usize, leader: Leader, ctx: &mut TrafficContext<'_>) {
        let dt = ctx.dt;
        let spec = self.layout.lanes[self.cars[i].lane];
        let half = self.layout.half_length();
        let length = self.layout.track_length;
        let mult = self.speed_multiplier;
        let fog = self.fog_density;
        let car = &mut self.cars[i];

        if self.layout.ground_check && !ctx.grid.has_ground_at(car.position.x, car.position.z) {
            let carried = Vec3::new(spec.sign() * car.speed * 0.8, 0.0, 0.0);
            car.fall(carried);
            car.spin.rate = Vec3::new(ctx.rng.random_range(-1.0..1.0), 0.0, spec.sign() * 0.8);
            self.stats.falls += 1;
            return;
        }

        if let Some(zone) = ctx.zone {
            if zone.collides(car.position) || zone.lava_hits(car.position, LAVA_HIT_RADIUS) {
                car.explode(ctx.rng.random_range(20.0..40.0), ctx.rng);
                ctx.events.burst(car.position, 1.5);
                self.stats.explosions += 1;
                return;
            }
        }

        if car.crashed {
            if car.crash_timer > 0.0 {
                car.crash_timer -= dt;
                car.speed = 0.0;
                return;
            }
            car.crashed = false;
            car.crash_timer = 0.0;
        }

        if leader.gap <= COLLISION_GAP {
            car.crash();
            self.stats.crashes += 1;
            if mult > EXPLODE_SPEED_MULTIPLIER {
                let launch = 10.0 * mult + ctx.rng.random::<f32>() * 10.0;
                car.explode(launch, ctx.rng);
                ctx.events.burst(car.position, 1.0);
                self.stats.explosions += 1;
            }
            return;
        }

        let v = car.speed;
        let v_max = car.effective_max_speed(mult);
        let desired_gap = MIN_GAP + v * TIME_HEADWAY;
        let crash_mult = 1.0 + fog / 100.0 * 10.0;

        let mut free_road = car.traits.throttle * mult * (1.0 - (v / v_max).powi(4));
        let mut braking = 0.0;
        if leader.gap < desired_gap {
            if car.distraction_timer <= 0.0 {
                let roll: f32 = ctx.rng.random();
                let distracted = if car.traits.is_reckless() {
                    roll < 0.05 * crash_mult
                } else {
                    fog > 0.5 && roll < 0.005 * crash_mult
                };
                if distracted {
                    car.distraction_timer = ctx.rng.random_range(1.0..2.0);
                }
            }
            braking = car.traits.braking * (desired_gap / leader.gap.max(0.1)).powi(2);
            if leader.speed > v {
                braking *= 0.5;
            }
        }
        if car.distraction_timer > 0.0 {
            car.distraction_timer -= dt;
            braking = 0.0;
            free_road = car.traits.throttle * mult * 3.0;
        }

        let mut accel = free_road - braking;
        if v < 0.5 && leader.gap > MIN_GAP + 5.0 {
            // Pull away from a standstill
            accel = accel.max(5.0 * mult);
        }

        car.speed = (v + accel * dt).clamp(0.0, 1.5 * v_max);
        car.position.x += spec.sign() * car.speed * dt;
        if car.position.x > half {
            car.position.x -= length;
        } else if car.position.x < -half {
            car.position.x += length;
        }
    }

    fn spiral(&mut self, i: usize, ctx: &mut TrafficContext<'_>) {
        let release_y = self.layout.road_y + SPIRAL_RELEASE_HEIGHT;
        let dt = ctx.dt;
        let car = &mut self.cars[i];
        let CarMode::Captured { angle, radius, .. } = car.mode else {
            return;
        };
        let Some(center) = ctx.tornado else {
            // The tornado is gone; nobody stays captured
            fling(car);
            return;
        };

        let angle = angle + SPIRAL_ANGULAR_SPEED * dt;
        let radius = radius + SPIRAL_RADIUS_GROWTH * dt;
        car.position = Vec3::new(
            center.x + angle.cos() * radius,
            car.position.y + SPIRAL_CLIMB * dt,
            center.z + angle.sin() * radius,
        );
        car.spin.integrate(dt);
        car.mode = CarMode::Captured {
            center,
            angle,
            radius,
        };
        if car.position.y >= release_y {
            fling(car);
        }
    }

    // ========================================================================
    // EXTERNAL FORCES
    // ========================================================================

    /// Throw every active car within `radius` of `center` away from it.
    ///
    /// Cars on the road lose their driving speed first; airborne cars keep
    /// their velocity and get the push on top. Returns how many were hit.
    pub fn apply_explosion(
        &mut self,
        center: Vec3,
        radius: f32,
        strength: f32,
        rng: &mut SmallRng,
    ) -> usize {
        let mut hit = 0;
        for car in self.cars.iter_mut().filter(|c| c.active && !c.is_grabbed()) {
            let Some(falloff) = radial_falloff(center, car.position, radius) else {
                continue;
            };
            if !car.is_airborne() {
                car.velocity = Vec3::ZERO;
            }
            let push = falloff * strength;
            let away = horizontal_direction(center, car.position);
            let velocity = car.velocity + away * push + Vec3::Y * 0.5 * push;
            car.fall(velocity);
            car.spin.rate = car::random_tumble(rng, 3.0);
            hit += 1;
        }
        self.stats.falls += hit as u64;
        hit
    }

    /// Pull a driving car into a tornado centred at `center`.
    pub fn capture(&mut self, i: usize, center: Vec3, rng: &mut SmallRng) -> bool {
        let Some(car) = self.cars.get_mut(i) else {
            return false;
        };
        if !car.active || !car.is_driving() {
            return false;
        }
        let offset = car.position - center;
        car.mode = CarMode::Captured {
            center,
            angle: offset.z.atan2(offset.x),
            radius: offset.x.hypot(offset.z).max(MIN_CAPTURE_RADIUS),
        };
        car.crashed = true;
        car.speed = 0.0;
        car.spin.rate = car::random_tumble(rng, 2.0);
        self.stats.captures += 1;
        true
    }

    /// Throw every captured car clear. Returns how many were released.
    pub fn release_captured(&mut self) -> usize {
        let mut released = 0;
        for car in self.cars.iter_mut().filter(|c| c.is_captured()) {
            fling(car);
            released += 1;
        }
        released
    }

    pub fn captured_count(&self) -> usize {
        self.cars.iter().filter(|c| c.is_captured()).count()
    }

    // ========================================================================
    // GRAB
    // ========================================================================

    pub fn grab(&mut self, i: usize) -> bool {
        match self.cars.get_mut(i) {
            Some(car) if car.active => {
                car.mode = CarMode::Grabbed;
                car.crashed = true;
                car.speed = 0.0;
                car.velocity = Vec3::ZERO;
                true
            }
            _ => false,
        }
    }

    pub fn drag(&mut self, i: usize, point: Vec3, dt: f32) {
        if let Some(car) = self.cars.get_mut(i).filter(|c| c.is_grabbed()) {
            car.position = car.position.lerp(point, (DRAG_RATE * dt).min(1.0));
        }
    }

    /// Drop a held car; it falls from where it was dragged.
    pub fn release(&mut self, i: usize) {
        if let Some(car) = self.cars.get_mut(i).filter(|c| c.is_grabbed()) {
            car.fall(Vec3::ZERO);
        }
    }

    // ========================================================================
    // RENDER
    // ========================================================================

    /// Push a transform and tint for every pooled car.
    pub fn emit(&self, sink: &mut impl RenderSink) {
        for (i, car) in self.cars.iter().enumerate() {
            let channel = RenderChannel::CarBody(car.class.geometry_id());
            sink.set_transform(channel, i as u32, car.transform(i, self.time));
            if car.active {
                sink.set_tint(channel, i as u32, car.tint());
            }
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn layout(&self) -> &TrafficLayout {
        &self.layout
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn car(&self, i: usize) -> Option<&Car> {
        self.cars.get(i)
    }

    pub fn car_mut(&mut self, i: usize) -> Option<&mut Car> {
        self.cars.get_mut(i)
    }

    pub fn lanes(&self) -> &LaneIndex {
        &self.lanes
    }

    pub fn active_count(&self) -> usize {
        self.cars.iter().filter(|c| c.active).count()
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Takes effect on the next update.
    pub fn set_density(&mut self, density: f32) {
        self.density = density.clamp(0.0, 1.0);
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier =
            multiplier.clamp(*SPEED_MULTIPLIER_RANGE.start(), *SPEED_MULTIPLIER_RANGE.end());
    }

    pub fn fog_density(&self) -> f32 {
        self.fog_density
    }

    pub fn set_fog_density(&mut self, fog: f32) {
        self.fog_density = fog.clamp(0.0, 100.0);
    }

    pub fn stats(&self) -> TrafficStats {
        self.stats
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

fn active_target(density: f32, pool: usize) -> usize {
    ((density * pool as f32) as usize).min(pool)
}

/// Random x in `lane` with ground under it, retrying a bounded number of
/// times before accepting any position.
fn spawn_x(
    layout: &TrafficLayout,
    lane: usize,
    grid: &VoxelGrid,
    rng: &mut SmallRng,
    stats: &mut TrafficStats,
) -> f32 {
    let half = layout.half_length();
    if half <= 0.0 {
        return 0.0;
    }
    let z = layout.lanes[lane].z;
    for _ in 0..SPAWN_ATTEMPTS {
        let x = rng.random_range(-half..half);
        if !layout.ground_check || grid.has_ground_at(x, z) {
            return x;
        }
    }
    stats.fallback_spawns += 1;
    let x = rng.random_range(-half..half);
    tracing::warn!(lane, x, "no ground found for car spawn, using arbitrary position");
    x
}

/// Throw a captured car outward from its tornado.
fn fling(car: &mut Car) {
    let center = match car.mode {
        CarMode::Captured { center, .. } => center,
        _ => car.position,
    };
    let outward = horizontal_direction(center, car.position);
    car.fall(outward * FLING_SPEED + Vec3::Y * FLING_LIFT);
}
